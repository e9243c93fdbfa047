use super::file_change::{DiffSet, FileChange, Iter, Side};
use super::parser::{normalize_encoding, parse_diff};
use crate::error::DiffError;
use crate::sources::traits::{DiffRequest, DiffSource, DiffStats, NameStatus};
use std::cell::OnceCell;
use std::fmt;

/// Fill a cell from a fallible fetch, unless it already holds a value.
fn get_or_try_fill<T, E>(
    cell: &OnceCell<T>,
    fetch: impl FnOnce() -> Result<T, E>,
) -> Result<&T, E> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = fetch()?;
    Ok(cell.get_or_init(|| value))
}

/// A diff between two revisions, fetched lazily from a [`DiffSource`].
///
/// Each backend call (full text, stats, name-status) is made at most once per
/// `Diff` and cached for its lifetime; the full text is parsed into a
/// [`DiffSet`] on first structured access. A `Diff` is not `Sync`: callers
/// sharing one across threads must wrap it in a lock.
pub struct Diff<'a, S: DiffSource> {
    source: &'a S,
    request: DiffRequest,
    full_diff: OnceCell<String>,
    files: OnceCell<DiffSet>,
    stats: OnceCell<DiffStats>,
    name_status: OnceCell<NameStatus>,
}

impl<'a, S: DiffSource> Diff<'a, S> {
    pub fn new(source: &'a S, from: Option<&str>, to: Option<&str>) -> Self {
        Self::from_request(source, DiffRequest::new(from, to))
    }

    pub fn from_request(source: &'a S, request: DiffRequest) -> Self {
        Self {
            source,
            request,
            full_diff: OnceCell::new(),
            files: OnceCell::new(),
            stats: OnceCell::new(),
            name_status: OnceCell::new(),
        }
    }

    /// Limit future fetches to `path`.
    ///
    /// Results already cached by this `Diff` are kept as they are.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.request.path = Some(path.into());
        self
    }

    pub fn from(&self) -> Option<&str> {
        self.request.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.request.to.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.request.path.as_deref()
    }

    pub fn request(&self) -> &DiffRequest {
        &self.request
    }

    pub fn stats(&self) -> Result<&DiffStats, S::Error> {
        get_or_try_fill(&self.stats, || {
            log::debug!("fetching diff stats for {:?}", self.request);
            self.source.diff_stats(&self.request)
        })
    }

    /// Number of files changed, per the stats summary
    pub fn size(&self) -> Result<u64, S::Error> {
        Ok(self.stats()?.total.files)
    }

    pub fn lines(&self) -> Result<u64, S::Error> {
        Ok(self.stats()?.total.lines)
    }

    pub fn insertions(&self) -> Result<u64, S::Error> {
        Ok(self.stats()?.total.insertions)
    }

    pub fn deletions(&self) -> Result<u64, S::Error> {
        Ok(self.stats()?.total.deletions)
    }

    pub fn name_status(&self) -> Result<&NameStatus, S::Error> {
        get_or_try_fill(&self.name_status, || {
            log::debug!("fetching name-status for {:?}", self.request);
            self.source.diff_name_status(&self.request)
        })
    }

    /// The full, unparsed patch text
    pub fn patch(&self) -> Result<&str, S::Error> {
        get_or_try_fill(&self.full_diff, || {
            log::debug!("fetching full diff for {:?}", self.request);
            let raw = self.source.diff_full(&self.request)?;
            Ok(normalize_encoding(&raw).into_owned())
        })
        .map(String::as_str)
    }

    /// The parsed file set, fetching and parsing on first use
    pub fn files(&self) -> Result<&DiffSet, S::Error> {
        if let Some(files) = self.files.get() {
            return Ok(files);
        }
        let parsed = parse_diff(self.patch()?);
        Ok(self.files.get_or_init(|| parsed))
    }

    /// Look up one file by its path
    pub fn get(&self, path: &str) -> Result<&FileChange, DiffError<S::Error>> {
        self.files()
            .map_err(DiffError::Source)?
            .get(path)
            .ok_or_else(|| DiffError::not_found(path))
    }

    /// Iterate over the changed files in diff order.
    ///
    /// Calling this again walks the cached set without another fetch.
    pub fn iter(&self) -> Result<Iter<'_>, S::Error> {
        Ok(self.files()?.iter())
    }

    /// Content of `path` on one side of the diff, `None` if it does not exist there
    pub fn blob(&self, path: &str, side: Side) -> Result<Option<Vec<u8>>, DiffError<S::Error>> {
        self.get(path)?
            .blob(self.source, side)
            .map_err(DiffError::Source)
    }
}

impl<S: DiffSource> fmt::Debug for Diff<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diff")
            .field("request", &self.request)
            .field("full_diff_cached", &self.full_diff.get().is_some())
            .field("files_parsed", &self.files.get().is_some())
            .field("stats_cached", &self.stats.get().is_some())
            .field("name_status_cached", &self.name_status.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Writes the full patch text. A backend failure renders as empty text and is
/// logged, since `Display` cannot carry the backend error.
impl<S: DiffSource> fmt::Display for Diff<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch() {
            Ok(text) => f.write_str(text),
            Err(err) => {
                log::warn!("could not fetch diff for display: {err}");
                Ok(())
            }
        }
    }
}
