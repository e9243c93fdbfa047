use super::traits::{DiffRequest, DiffSource, DiffStats, FileStats, NameStatus};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalGitError {
    #[error("Git error: {0}")]
    Git(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a git repository")]
    NotARepo,
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Invalid revision: {0}")]
    InvalidRevision(String),
}

/// Settings for running the git executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalGitConfig {
    /// Program to run, looked up on PATH unless absolute
    pub git_binary: String,
    /// Extra flags appended to every `git diff` call (e.g. `-M`)
    pub extra_diff_args: Vec<String>,
}

impl Default for LocalGitConfig {
    fn default() -> Self {
        Self {
            git_binary: "git".to_owned(),
            extra_diff_args: Vec::new(),
        }
    }
}

impl LocalGitConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LocalGitError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LocalGitError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// [`DiffSource`] backed by the git executable in a local checkout
#[derive(Debug)]
pub struct LocalGitSource {
    repo_path: PathBuf,
    config: LocalGitConfig,
}

impl LocalGitSource {
    pub fn new(repo_path: PathBuf) -> Result<Self, LocalGitError> {
        Self::with_config(repo_path, LocalGitConfig::default())
    }

    pub fn with_config(repo_path: PathBuf, config: LocalGitConfig) -> Result<Self, LocalGitError> {
        if !repo_path.join(".git").exists() {
            return Err(LocalGitError::NotARepo);
        }
        Ok(Self { repo_path, config })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn output(&self, args: &[&str]) -> Result<Output, LocalGitError> {
        log::debug!("running {} {}", self.config.git_binary, args.join(" "));
        // Unquoted paths, or non-ASCII names never match the header pattern
        Ok(Command::new(&self.config.git_binary)
            .args(["-c", "core.quotePath=false"])
            .args(args)
            .current_dir(&self.repo_path)
            .output()?)
    }

    fn run_git_bytes(&self, args: &[&str]) -> Result<Vec<u8>, LocalGitError> {
        let output = self.output(args)?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(LocalGitError::Git(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }

    /// `git diff <format flags> [extra] [from] [to] [-- path]`
    fn run_diff(&self, format: &[&str], request: &DiffRequest) -> Result<Vec<u8>, LocalGitError> {
        let revisions = request.revisions();
        if let Some(rev) = revisions.iter().find(|rev| rev.starts_with('-')) {
            return Err(LocalGitError::InvalidRevision((*rev).to_owned()));
        }

        let mut args = vec!["diff", "--no-color", "--no-ext-diff"];
        args.extend_from_slice(format);
        args.extend(self.config.extra_diff_args.iter().map(String::as_str));
        args.extend(revisions);
        if let Some(path) = request.path.as_deref() {
            args.push("--");
            args.push(path);
        }
        self.run_git_bytes(&args)
    }
}

impl DiffSource for LocalGitSource {
    type Error = LocalGitError;

    fn diff_full(&self, request: &DiffRequest) -> Result<Vec<u8>, Self::Error> {
        // Fixed prefixes so diff.noprefix / diff.mnemonicPrefix can't change headers
        self.run_diff(&["-p", "--src-prefix=a/", "--dst-prefix=b/"], request)
    }

    fn diff_stats(&self, request: &DiffRequest) -> Result<DiffStats, Self::Error> {
        let output = self.run_diff(&["--numstat"], request)?;
        parse_numstat(&String::from_utf8_lossy(&output))
    }

    fn diff_name_status(&self, request: &DiffRequest) -> Result<NameStatus, Self::Error> {
        let output = self.run_diff(&["--name-status"], request)?;
        Ok(parse_name_status(&String::from_utf8_lossy(&output)))
    }

    fn object(&self, id: &str) -> Result<Vec<u8>, Self::Error> {
        if self.output(&["cat-file", "-e", id])?.status.success() {
            self.run_git_bytes(&["cat-file", "blob", id])
        } else {
            Err(LocalGitError::ObjectNotFound(id.to_owned()))
        }
    }
}

/// Parse `git diff --numstat` output.
///
/// Binary files report `-` for both counts and contribute zero lines.
pub fn parse_numstat(output: &str) -> Result<DiffStats, LocalGitError> {
    let mut stats = DiffStats::default();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, '\t');
        let (Some(insertions), Some(deletions), Some(path)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(LocalGitError::Parse(format!(
                "Unexpected numstat line: {line}"
            )));
        };
        let file = FileStats {
            insertions: parse_count(insertions, line)?,
            deletions: parse_count(deletions, line)?,
        };

        stats.total.files += 1;
        stats.total.insertions += file.insertions;
        stats.total.deletions += file.deletions;
        stats.total.lines += file.insertions + file.deletions;
        stats.files.insert(path.to_owned(), file);
    }

    Ok(stats)
}

fn parse_count(field: &str, line: &str) -> Result<u64, LocalGitError> {
    if field == "-" {
        return Ok(0);
    }
    field.parse().map_err(|_| {
        LocalGitError::Parse(format!("Invalid count {field:?} in numstat line: {line}"))
    })
}

/// Parse `git diff --name-status` output into path => status.
///
/// Renames and copies are keyed by their source path.
pub fn parse_name_status(output: &str) -> NameStatus {
    let mut entries = NameStatus::new();

    for line in output.lines() {
        let mut parts = line.split('\t');
        if let (Some(status), Some(path)) = (parts.next(), parts.next()) {
            entries.insert(path.to_owned(), status.to_owned());
        }
    }

    entries
}
