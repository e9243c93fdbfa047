use thiserror::Error;

/// Error returned by the [`Diff`](crate::diff::Diff) accessors that combine a
/// backend fetch with a lookup in the parsed file set.
///
/// Backend failures are carried unchanged in [`DiffError::Source`]; their
/// `Display` and `source()` are forwarded as-is.
#[derive(Error, Debug)]
pub enum DiffError<E>
where
    E: std::error::Error + 'static,
{
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Source(E),
}

impl<E> DiffError<E>
where
    E: std::error::Error + 'static,
{
    /// Create a Not Found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if this error reports a missing path
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Unwrap the backend error, if this is one
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Source(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Error, Debug)]
    #[error("backend exploded")]
    struct BackendError(#[source] std::io::Error);

    #[test]
    fn test_not_found_message() {
        let err: DiffError<BackendError> = DiffError::not_found("src/main.rs");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: src/main.rs");
    }

    #[test]
    fn test_source_is_transparent() {
        let err = DiffError::Source(BackendError(std::io::Error::other("disk")));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "backend exploded");
        // transparent forwards source() to the inner error's source
        assert_eq!(err.source().map(ToString::to_string), Some("disk".to_owned()));
        assert!(err.into_source().is_some());
    }
}
