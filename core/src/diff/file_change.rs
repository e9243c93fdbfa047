use crate::sources::traits::DiffSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Content id git prints for a side of the diff where the file does not exist
pub const NULL_ID: &str = "0000000";

/// Check whether a content id means "no content on this side".
///
/// Longer abbreviations of the zero id are treated like [`NULL_ID`].
pub fn is_null_id(id: &str) -> bool {
    id.len() >= NULL_ID.len() && id.bytes().all(|b| b == b'0')
}

/// Which side of the diff a content id belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Src,
    #[default]
    Dst,
}

/// One file touched by a diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Repo-relative path, taken from the `a/` side of the header
    pub path: String,
    /// The file's diff block, header line first, newline-joined
    pub patch: String,
    /// Permission bits when known, else empty
    pub mode: String,
    pub src: String,
    pub dst: String,
    /// `modified` unless a mode-change header names another verb (`new`, `deleted`, ...)
    #[serde(rename = "type")]
    pub change_type: String,
    pub binary: bool,
}

impl FileChange {
    pub const DEFAULT_TYPE: &'static str = "modified";

    /// Start a record from its `diff --git` header line
    pub fn new(path: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            patch: header.into(),
            mode: String::new(),
            src: String::new(),
            dst: String::new(),
            change_type: Self::DEFAULT_TYPE.to_owned(),
            binary: false,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Content id for one side of the change
    pub fn content_id(&self, side: Side) -> &str {
        match side {
            Side::Src => &self.src,
            Side::Dst => &self.dst,
        }
    }

    /// Fetch the file's content on one side of the diff.
    ///
    /// Returns `Ok(None)` without asking the backend when that side holds the
    /// null id, i.e. the file was added or deleted.
    pub fn blob<S: DiffSource>(&self, source: &S, side: Side) -> Result<Option<Vec<u8>>, S::Error> {
        let id = self.content_id(side);
        if is_null_id(id) {
            return Ok(None);
        }
        source.object(id).map(Some)
    }
}

/// Parsed files of one diff, keyed by path, in the order they first appear
#[derive(Debug, Clone, Default)]
pub struct DiffSet {
    files: IndexMap<String, FileChange>,
}

/// Order is part of the value: equal sets hold the same files in the same order
impl PartialEq for DiffSet {
    fn eq(&self, other: &Self) -> bool {
        self.files.iter().eq(other.files.iter())
    }
}

impl Eq for DiffSet {}

impl DiffSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. An existing path is replaced in place and keeps its
    /// original position; the replaced record is returned.
    pub(crate) fn insert(&mut self, file: FileChange) -> Option<FileChange> {
        self.files.insert(file.path.clone(), file)
    }

    pub(crate) fn get_mut(&mut self, path: &str) -> Option<&mut FileChange> {
        self.files.get_mut(path)
    }

    pub fn get(&self, path: &str) -> Option<&FileChange> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.files.values(),
        }
    }
}

/// Iterator over the files of a [`DiffSet`], in diff order
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: indexmap::map::Values<'a, String, FileChange>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a FileChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a DiffSet {
    type Item = &'a FileChange;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for DiffSet {
    type Item = FileChange;
    type IntoIter = indexmap::map::IntoValues<String, FileChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_values()
    }
}

impl Serialize for DiffSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
