/// Filesystem seam: every disk access the engine makes goes through
/// [`Filesystem`].
///
/// [`StdFilesystem`] is the real implementation. Tests wrap it to simulate
/// locked files and concurrent writers without touching OS permissions.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait Filesystem: Send + Sync {
    /// Whether an entry exists at `path`. A final symlink is not followed,
    /// so a dangling link still exists.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` exists with a final symlink followed, so a dangling
    /// link does not. Decides whether a root is there to delete.
    fn target_exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of `dir`, as full paths.
    fn list_children(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Remove one file, symbolic link, or empty directory. Never recursive.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Every entry below `dir` (not `dir` itself). Unreadable entries are
    /// skipped.
    fn walk(&self, dir: &Path, follow_symlinks: bool) -> Vec<PathBuf>;

    /// Canonical form of `path` with every symlink resolved.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// [`Filesystem`] backed by `std::fs`, with `jwalk` for subtree listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn target_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_children(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        children.sort();
        Ok(children)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir(path)
        } else {
            remove_non_dir(path, &meta)
        }
    }

    fn walk(&self, dir: &Path, follow_symlinks: bool) -> Vec<PathBuf> {
        // Serial: deletion is single-threaded and this is a diagnostic pass.
        jwalk::WalkDir::new(dir)
            .skip_hidden(false)
            .follow_links(follow_symlinks)
            .sort(true)
            .min_depth(1)
            .parallelism(jwalk::Parallelism::Serial)
            .into_iter()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

#[cfg(not(windows))]
fn remove_non_dir(path: &Path, _meta: &fs::Metadata) -> io::Result<()> {
    fs::remove_file(path)
}

/// Directory symlinks and junctions are removed with `RemoveDirectoryW`
/// on Windows.
#[cfg(windows)]
fn remove_non_dir(path: &Path, meta: &fs::Metadata) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;
    if meta.file_type().is_symlink_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_file_and_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.txt");
        let dir = tmp.path().join("d");
        fs::write(&file, b"x").unwrap();
        fs::create_dir(&dir).unwrap();

        StdFilesystem.remove(&file).unwrap();
        StdFilesystem.remove(&dir).unwrap();
        assert!(!StdFilesystem.exists(&file));
        assert!(!StdFilesystem.exists(&dir));
    }

    #[test]
    fn test_remove_is_not_recursive() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("inner"), b"x").unwrap();

        assert!(StdFilesystem.remove(&dir).is_err());
        assert!(StdFilesystem.exists(&dir.join("inner")));
    }

    #[test]
    fn test_list_children_sorted_and_missing_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b"), b"").unwrap();
        fs::write(tmp.path().join("a"), b"").unwrap();

        let children = StdFilesystem.list_children(tmp.path()).unwrap();
        assert_eq!(children, vec![tmp.path().join("a"), tmp.path().join("b")]);

        let err = StdFilesystem
            .list_children(&tmp.path().join("gone"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_walk_excludes_root() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("x"), b"").unwrap();

        let mut all = StdFilesystem.walk(tmp.path(), false);
        all.sort();
        assert_eq!(all, vec![sub.clone(), sub.join("x")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_exists_and_is_removed() {
        let tmp = TempDir::new().unwrap();
        let link = tmp.path().join("dangling");
        std::os::unix::fs::symlink(tmp.path().join("missing"), &link).unwrap();

        assert!(StdFilesystem.exists(&link));
        assert!(!StdFilesystem.target_exists(&link));
        assert!(!StdFilesystem.is_dir(&link));
        StdFilesystem.remove(&link).unwrap();
        assert!(!StdFilesystem.exists(&link));
    }

    #[cfg(unix)]
    #[test]
    fn test_canonicalize_resolves_links() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(
            StdFilesystem.canonicalize(&link).unwrap(),
            StdFilesystem.canonicalize(&target).unwrap()
        );
        assert!(StdFilesystem.target_exists(&link));
    }
}
