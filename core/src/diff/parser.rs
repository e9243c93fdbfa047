//! Line-oriented parser turning unified `git diff` text into a [`DiffSet`].
//!
//! Every line is run through a fixed sequence of matchers:
//!
//! 1. file header (`diff --git a/<path> b/<path>`) starts a new file;
//! 2. index line (`index <src>..<dst>[ <mode>]`);
//! 3. mode-change header (`<verb> file mode <mode>`);
//! 4. binary marker (`Binary files ...`);
//! 5. the line is appended to the current file's patch text.
//!
//! Matchers 2-5 all run for every non-header line, in that order, so a later
//! match overrides what an earlier one set. The parser never fails: lines it
//! cannot attribute to a file are skipped.

use super::file_change::{DiffSet, FileChange};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static FILE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^diff --git a/(.*?) b/(.*?)").unwrap());

static INDEX_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^index ([^.\s]{7,})\.\.([^.\s]{7,})( \S+)?").unwrap());

static MODE_CHANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([[:alpha:]]*?) file mode (\d{6})").unwrap());

const BINARY_MARKER: &str = "Binary files ";

/// Content ids (and optional mode) read from an `index` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLine<'a> {
    pub src: &'a str,
    pub dst: &'a str,
    pub mode: Option<&'a str>,
}

/// Verb and mode read from a `<verb> file mode <mode>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChange<'a> {
    pub change_type: &'a str,
    pub mode: &'a str,
}

/// Path of a `diff --git` header line, from its `a/` side
pub fn match_file_header(line: &str) -> Option<&str> {
    FILE_HEADER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn match_index_line(line: &str) -> Option<IndexLine<'_>> {
    let caps = INDEX_LINE.captures(line)?;
    Some(IndexLine {
        src: caps.get(1)?.as_str(),
        dst: caps.get(2)?.as_str(),
        mode: caps.get(3).map(|m| m.as_str().trim()),
    })
}

pub fn match_mode_change(line: &str) -> Option<ModeChange<'_>> {
    let caps = MODE_CHANGE.captures(line)?;
    Some(ModeChange {
        change_type: caps.get(1)?.as_str(),
        mode: caps.get(2)?.as_str(),
    })
}

pub fn is_binary_marker(line: &str) -> bool {
    line.starts_with(BINARY_MARKER)
}

/// Decode raw diff output as UTF-8.
///
/// Valid input is borrowed unchanged; invalid byte sequences are replaced with
/// U+FFFD rather than failing.
pub fn normalize_encoding(raw: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(raw);
    if let Cow::Owned(_) = text {
        log::debug!("diff output is not valid UTF-8; invalid bytes were replaced");
    }
    text
}

/// Split text into lines on `\n`, keeping `\r` and dropping the empty
/// segment after a final newline.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let empty = text.is_empty();
    body.split('\n').filter(move |_| !empty)
}

/// Streaming parser state: the files built so far plus the current-file cursor.
#[derive(Debug, Default)]
pub struct DiffParser {
    files: DiffSet,
    current: Option<String>,
}

impl DiffParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its trailing newline)
    pub fn feed_line(&mut self, line: &str) {
        if let Some(path) = match_file_header(line) {
            self.start_file(path, line);
            return;
        }

        let Some(file) = self.current.as_deref().and_then(|p| self.files.get_mut(p)) else {
            log::trace!("skipping line outside any file section: {line:?}");
            return;
        };

        if let Some(index) = match_index_line(line) {
            index.src.clone_into(&mut file.src);
            index.dst.clone_into(&mut file.dst);
            if let Some(mode) = index.mode {
                mode.clone_into(&mut file.mode);
            }
        }
        if let Some(change) = match_mode_change(line) {
            change.change_type.clone_into(&mut file.change_type);
            change.mode.clone_into(&mut file.mode);
        }
        if is_binary_marker(line) {
            file.binary = true;
        }

        file.patch.push('\n');
        file.patch.push_str(line);
    }

    fn start_file(&mut self, path: &str, header: &str) {
        if self.files.insert(FileChange::new(path, header)).is_some() {
            log::warn!("duplicate diff header for {path}; earlier section replaced");
        }
        self.current = Some(path.to_owned());
    }

    pub fn finish(self) -> DiffSet {
        log::debug!("parsed diff with {} file(s)", self.files.len());
        self.files
    }
}

/// Parse unified diff text into an ordered [`DiffSet`]
///
/// ```
/// use diffset::diff::parse_diff;
///
/// let files = parse_diff("diff --git a/a.txt b/a.txt\nindex 1234567..89abcde 100644\n");
/// let file = files.get("a.txt").unwrap();
/// assert_eq!(file.src, "1234567");
/// assert_eq!(file.mode, "100644");
/// ```
pub fn parse_diff(text: &str) -> DiffSet {
    let mut parser = DiffParser::new();
    for line in split_lines(text) {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Normalize raw diff bytes to UTF-8, then parse them
pub fn parse_diff_bytes(raw: &[u8]) -> DiffSet {
    parse_diff(&normalize_encoding(raw))
}
