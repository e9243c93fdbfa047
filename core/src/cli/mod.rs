use crate::diff::{Diff, Side};
use crate::sources::local_git::{LocalGitConfig, LocalGitSource};
use crate::sources::traits::DiffRequest;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "git-diffset")]
#[command(author, version, about = "Inspect a git diff file by file", long_about = None)]
pub struct Cli {
    /// Repository path (defaults to current directory)
    #[arg(short, long, global = true)]
    pub repo: Option<String>,

    /// JSON file with git settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Base revision (defaults to the index)
    #[arg(long, global = true)]
    pub from: Option<String>,

    /// Target revision (defaults to the working tree)
    #[arg(long, global = true)]
    pub to: Option<String>,

    /// Only diff this path
    #[arg(long, global = true)]
    pub path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the full patch
    Patch,

    /// Show file, line, insertion and deletion totals
    Stats,

    /// List changed files in diff order
    Files,

    /// Print one file's patch and metadata
    Show {
        /// Path as it appears in the diff header
        path: String,
    },

    /// Write a file's content on one side of the diff to stdout
    Blob {
        path: String,

        /// Use the source side instead of the destination
        #[arg(long)]
        src: bool,
    },

    /// Show the status letter of each changed path
    NameStatus,
}

impl Cli {
    fn repo_path(&self) -> Result<PathBuf, String> {
        match &self.repo {
            Some(repo) => Ok(PathBuf::from(repo)),
            None => std::env::current_dir().map_err(|e| e.to_string()),
        }
    }

    fn request(&self) -> DiffRequest {
        DiffRequest {
            from: self.from.clone(),
            to: self.to.clone(),
            path: self.path.clone(),
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

pub fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => LocalGitConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => LocalGitConfig::default(),
    };
    let source = LocalGitSource::with_config(cli.repo_path()?, config).map_err(|e| e.to_string())?;
    let diff = Diff::from_request(&source, cli.request());
    let json = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Patch => {
            let patch = diff.patch().map_err(|e| e.to_string())?;
            if json {
                print_json(&serde_json::json!({ "patch": patch }))?;
            } else {
                print!("{patch}");
            }
        }
        Commands::Stats => {
            let stats = diff.stats().map_err(|e| e.to_string())?;
            if json {
                print_json(stats)?;
            } else {
                for (path, file) in &stats.files {
                    println!("{:>5} {:>5}  {path}", file.insertions, file.deletions);
                }
                println!(
                    "{} file(s) changed, {} insertion(s), {} deletion(s)",
                    stats.total.files, stats.total.insertions, stats.total.deletions
                );
            }
        }
        Commands::Files => {
            let files = diff.files().map_err(|e| e.to_string())?;
            if json {
                print_json(files)?;
            } else if files.is_empty() {
                println!("No changes");
            } else {
                for file in files {
                    let binary = if file.is_binary() { " (binary)" } else { "" };
                    println!("{:<9} {:<6} {}{binary}", file.change_type, file.mode, file.path);
                }
            }
        }
        Commands::Show { path } => {
            let file = diff.get(&path).map_err(|e| e.to_string())?;
            if json {
                print_json(file)?;
            } else {
                println!("{}", file.patch);
            }
        }
        Commands::Blob { path, src } => {
            let side = if src { Side::Src } else { Side::Dst };
            match diff.blob(&path, side).map_err(|e| e.to_string())? {
                Some(content) => std::io::stdout()
                    .write_all(&content)
                    .map_err(|e| e.to_string())?,
                None => eprintln!("{path} does not exist on that side of the diff"),
            }
        }
        Commands::NameStatus => {
            let entries = diff.name_status().map_err(|e| e.to_string())?;
            if json {
                print_json(entries)?;
            } else {
                for (path, status) in entries {
                    println!("{status}\t{path}");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_args_after_subcommand() {
        let cli = Cli::parse_from([
            "git-diffset",
            "files",
            "--from",
            "main",
            "--path",
            "src",
            "--format",
            "json",
        ]);
        assert!(matches!(cli.command, Commands::Files));
        assert_eq!(cli.format, OutputFormat::Json);
        let request = cli.request();
        assert_eq!(request.from.as_deref(), Some("main"));
        assert_eq!(request.to, None);
        assert_eq!(request.path.as_deref(), Some("src"));
    }

    #[test]
    fn test_parse_blob_src() {
        let cli = Cli::parse_from(["git-diffset", "blob", "a.txt", "--src"]);
        match cli.command {
            Commands::Blob { path, src } => {
                assert_eq!(path, "a.txt");
                assert!(src);
            }
            _ => panic!("Wrong command"),
        }
    }
}
