//! git-diffset binary - usable as `git diffset` once on PATH
//!
//! Git automatically finds binaries named `git-*` in PATH and makes them
//! available as subcommands.

use clap::Parser;
use diffset::cli::{run, Cli};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
