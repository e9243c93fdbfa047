//! In-memory [`DiffSource`] returning canned data.
//!
//! Counts every backend call so callers can check how often a
//! [`Diff`](crate::diff::Diff) actually reached the backend.

use super::traits::{DiffRequest, DiffSource, DiffStats, NameStatus};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemorySourceError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    #[error("Backend unavailable")]
    Unavailable,
}

/// Number of calls made to each backend operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchCounts {
    pub full_diff: usize,
    pub stats: usize,
    pub name_status: usize,
    pub objects: usize,
}

#[derive(Debug, Default)]
pub struct MemorySource {
    full_diff: Vec<u8>,
    stats: DiffStats,
    name_status: NameStatus,
    objects: HashMap<String, Vec<u8>>,
    failing: bool,
    counts: Cell<FetchCounts>,
    requests: RefCell<Vec<DiffRequest>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_full_diff(mut self, raw: impl Into<Vec<u8>>) -> Self {
        self.full_diff = raw.into();
        self
    }

    #[must_use]
    pub fn with_stats(mut self, stats: DiffStats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn with_name_status(mut self, name_status: NameStatus) -> Self {
        self.name_status = name_status;
        self
    }

    #[must_use]
    pub fn with_object(mut self, id: impl Into<String>, content: Vec<u8>) -> Self {
        self.objects.insert(id.into(), content);
        self
    }

    /// Make every diff fetch fail with [`MemorySourceError::Unavailable`]
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn counts(&self) -> FetchCounts {
        self.counts.get()
    }

    /// Requests received by the diff operations, in call order
    pub fn requests(&self) -> Vec<DiffRequest> {
        self.requests.borrow().clone()
    }

    fn record(
        &self,
        request: &DiffRequest,
        bump: impl FnOnce(&mut FetchCounts),
    ) -> Result<(), MemorySourceError> {
        let mut counts = self.counts.get();
        bump(&mut counts);
        self.counts.set(counts);
        self.requests.borrow_mut().push(request.clone());
        if self.failing {
            return Err(MemorySourceError::Unavailable);
        }
        Ok(())
    }
}

impl DiffSource for MemorySource {
    type Error = MemorySourceError;

    fn diff_full(&self, request: &DiffRequest) -> Result<Vec<u8>, Self::Error> {
        self.record(request, |c| c.full_diff += 1)?;
        Ok(self.full_diff.clone())
    }

    fn diff_stats(&self, request: &DiffRequest) -> Result<DiffStats, Self::Error> {
        self.record(request, |c| c.stats += 1)?;
        Ok(self.stats.clone())
    }

    fn diff_name_status(&self, request: &DiffRequest) -> Result<NameStatus, Self::Error> {
        self.record(request, |c| c.name_status += 1)?;
        Ok(self.name_status.clone())
    }

    fn object(&self, id: &str) -> Result<Vec<u8>, Self::Error> {
        let mut counts = self.counts.get();
        counts.objects += 1;
        self.counts.set(counts);
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| MemorySourceError::ObjectNotFound(id.to_owned()))
    }
}
