/// Deletion requests: the roots to remove and how to treat symlinks.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// An unresolved root specification.
///
/// Opaque to the engine: a [`PathResolver`](crate::resolve::PathResolver)
/// turns it into an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec(OsString);

impl PathSpec {
    pub fn as_os_str(&self) -> &std::ffi::OsStr {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for PathSpec {
    fn from(s: &str) -> Self {
        Self(OsString::from(s))
    }
}

impl From<String> for PathSpec {
    fn from(s: String) -> Self {
        Self(OsString::from(s))
    }
}

impl From<&Path> for PathSpec {
    fn from(p: &Path) -> Self {
        Self(p.as_os_str().to_owned())
    }
}

impl From<PathBuf> for PathSpec {
    fn from(p: PathBuf) -> Self {
        Self(p.into_os_string())
    }
}

impl From<&PathBuf> for PathSpec {
    fn from(p: &PathBuf) -> Self {
        Self(p.as_os_str().to_owned())
    }
}

/// A set of roots to delete plus the symlink policy.
///
/// Roots are processed in the order they were added. Duplicates are kept;
/// a root removed earlier in the same call is simply skipped later as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    paths: Vec<PathSpec>,
    follow_symlinks: bool,
}

impl DeleteRequest {
    /// An empty request with `follow_symlinks = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append roots. May be called repeatedly.
    pub fn delete<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathSpec>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// When `true`, symbolic links to directories are descended into and
    /// their target's contents are deleted too. The link itself is always
    /// removed.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn paths(&self) -> &[PathSpec] {
        &self.paths
    }

    pub fn is_follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_does_not_follow_symlinks() {
        let req = DeleteRequest::new();
        assert!(!req.is_follow_symlinks());
        assert!(req.paths().is_empty());
    }

    #[test]
    fn test_delete_appends_in_order() {
        let req = DeleteRequest::new()
            .delete(["a", "b"])
            .delete(vec![PathBuf::from("c")])
            .follow_symlinks(true);
        let names: Vec<_> = req
            .paths()
            .iter()
            .map(|p| p.as_path().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
        );
        assert!(req.is_follow_symlinks());
    }

    #[test]
    fn test_empty_spec() {
        assert!(PathSpec::from("").is_empty());
        assert!(!PathSpec::from("x").is_empty());
    }
}
