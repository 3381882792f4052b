/// Error types for path resolution and deletion.
///
/// Per-node failures never surface here directly. They are retried once,
/// collected into a [`FailureSet`](crate::model::FailureSet), and reported
/// as a single [`DeleteError::UnableToDelete`] per call.
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a root specification into an absolute path.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The specification was an empty string.
    #[error("cannot resolve an empty path")]
    Empty,

    /// The specification was a URI with a scheme other than `file`.
    #[error("cannot convert URI '{spec}' to a file: unsupported scheme '{scheme}'")]
    UnsupportedScheme { spec: String, scheme: String },

    /// A `file:` specification that is not a well-formed URL.
    #[error("cannot parse file URI '{spec}': {source}")]
    InvalidUri {
        spec: String,
        #[source]
        source: url::ParseError,
    },

    /// A `file:` URI naming a remote host. Only local files can be deleted.
    #[error("cannot convert URI '{spec}' to a file: host '{host}' is not local")]
    NonLocalFileUri { spec: String, host: String },

    /// A local `file:` URI whose path has no filesystem form on this
    /// platform, such as a Windows URI without a drive letter.
    #[error("cannot convert URI '{spec}' to a file path")]
    NotAFilePath { spec: String },

    /// The process working directory could not be determined.
    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Failure of a whole deletion call.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// A root could not be resolved. Nothing was deleted.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A root's subtree still had entries after the single retry.
    ///
    /// `message` is the full diagnostic text, listing every path that
    /// could not be removed and any that appeared during deletion.
    #[error("{message}")]
    UnableToDelete { path: PathBuf, message: String },

    /// The retry wait was cancelled while deleting `path`.
    #[error("deletion cancelled while retrying '{}'", path.display())]
    Cancelled { path: PathBuf },
}

impl DeleteError {
    /// Root path the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Resolve(_) => None,
            Self::UnableToDelete { path, .. } | Self::Cancelled { path } => Some(path),
        }
    }

    /// `true` for [`DeleteError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unable_to_delete_displays_message_only() {
        let err = DeleteError::UnableToDelete {
            path: PathBuf::from("/tmp/x"),
            message: "Unable to delete file '/tmp/x'".into(),
        };
        assert_eq!(err.to_string(), "Unable to delete file '/tmp/x'");
        assert_eq!(err.path(), Some(std::path::Path::new("/tmp/x")));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_is_distinct() {
        let err = DeleteError::Cancelled {
            path: PathBuf::from("/tmp/y"),
        };
        assert!(err.is_cancelled());
        assert!(!matches!(err, DeleteError::UnableToDelete { .. }));
    }

    #[test]
    fn test_resolve_error_is_transparent() {
        let err: DeleteError = ResolveError::Empty.into();
        assert_eq!(err.to_string(), "cannot resolve an empty path");
        assert!(err.path().is_none());
    }

    #[test]
    fn test_non_local_uri_names_host() {
        let err = ResolveError::NonLocalFileUri {
            spec: "file://server/share".into(),
            host: "server".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot convert URI 'file://server/share' to a file: host 'server' is not local"
        );
    }
}
