/// Per-root accumulator of paths that survived the retry.
///
/// Insertion order is preserved so the diagnostic lists failures in the
/// order the traversal met them (children before parents). Duplicates are
/// rejected.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FailureSet {
    order: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl FailureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed path. Returns `false` if it was already present.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if self.seen.contains(&path) {
            return false;
        }
        self.seen.insert(path.clone());
        self.order.push(path);
        true
    }

    /// Remove a path. Returns `true` if it was present.
    pub fn remove(&mut self, path: &Path) -> bool {
        if !self.seen.remove(path) {
            return false;
        }
        self.order.retain(|p| p != path);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Paths in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.order.iter().map(PathBuf::as_path)
    }

    /// A working copy with `path` removed.
    pub fn without(&self, path: &Path) -> Self {
        let mut copy = self.clone();
        copy.remove(path);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = FailureSet::new();
        assert!(set.insert(PathBuf::from("/a/b")));
        assert!(!set.insert(PathBuf::from("/a/b")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_iter_preserves_insertion_order() {
        let mut set = FailureSet::new();
        set.insert(PathBuf::from("/z"));
        set.insert(PathBuf::from("/a"));
        set.insert(PathBuf::from("/m"));
        let got: Vec<_> = set.iter().collect();
        assert_eq!(got, vec![Path::new("/z"), Path::new("/a"), Path::new("/m")]);
    }

    #[test]
    fn test_without_leaves_original_intact() {
        let mut set = FailureSet::new();
        set.insert(PathBuf::from("/root/child"));
        set.insert(PathBuf::from("/root"));
        let children = set.without(Path::new("/root"));
        assert_eq!(children.len(), 1);
        assert!(!children.contains(Path::new("/root")));
        assert!(set.contains(Path::new("/root")));
    }

    #[test]
    fn test_remove_then_reinsert() {
        let mut set = FailureSet::new();
        set.insert(PathBuf::from("/x"));
        assert!(set.remove(Path::new("/x")));
        assert!(!set.remove(Path::new("/x")));
        assert!(set.is_empty());
        assert!(set.insert(PathBuf::from("/x")));
    }
}
