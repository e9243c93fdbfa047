pub mod local_git;
pub mod memory;
pub mod traits;
