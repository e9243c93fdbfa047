pub mod file_change;
pub mod parser;
pub mod session;

pub use file_change::{is_null_id, DiffSet, FileChange, Side, NULL_ID};
pub use parser::{parse_diff, parse_diff_bytes, DiffParser};
pub use session::Diff;
