/// Diagnostic message for a root that could not be fully deleted.
///
/// Two independent passes are reported:
///
/// 1. **Child failures**: paths below the root that were tried twice and
///    still refused. Usually another process holds them open.
/// 2. **Late arrivals**: a fresh listing of the root's subtree, minus
///    everything already reported. These entries were never seen failing,
///    so something created them after their directory had been emptied:
///    a concurrent writer.
///
/// Neither pass changes the outcome; the call has already failed.
use super::absolute;
use crate::fs::Filesystem;
use crate::model::FailureSet;
use crate::platform::SymlinkOracle;
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub const CHILD_FAILURES_HEADER: &str =
    "Child paths failed to delete! Is something holding files in the target directory?";

pub const LATE_ARRIVALS_HEADER: &str =
    "More files were found after failure! Is something concurrently writing into the target directory?";

/// Build the message carried by
/// [`DeleteError::UnableToDelete`](crate::error::DeleteError::UnableToDelete).
///
/// Only meaningful when `failures` is non-empty.
pub fn build_help_message(
    fs: &dyn Filesystem,
    symlinks: &dyn SymlinkOracle,
    root: &Path,
    follow_symlinks: bool,
    failures: &FailureSet,
) -> String {
    let is_symlink = symlinks.is_symlink(root);
    let is_dir = fs.is_dir(root);

    let mut help = String::from("Unable to delete ");
    if is_symlink {
        help.push_str("symlink to ");
    }
    help.push_str(if is_dir { "directory " } else { "file " });
    let _ = write!(help, "'{}'", root.display());

    if !is_dir || (is_symlink && !follow_symlinks) {
        return help;
    }

    let root_abs = absolute(root);
    let child_failures = failures.without(&root_abs);
    if !child_failures.is_empty() {
        push_section(&mut help, CHILD_FAILURES_HEADER, child_failures.iter());
    }

    let remaining: Vec<PathBuf> = fs
        .walk(root, follow_symlinks)
        .iter()
        .map(|p| absolute(p))
        .filter(|p| *p != root_abs && !child_failures.contains(p))
        .collect();
    if !remaining.is_empty() {
        push_section(
            &mut help,
            LATE_ARRIVALS_HEADER,
            remaining.iter().map(PathBuf::as_path),
        );
    }

    help
}

fn push_section<'a>(help: &mut String, header: &str, paths: impl Iterator<Item = &'a Path>) {
    let _ = write!(help, "\n  {header}");
    for path in paths {
        let _ = write!(help, "\n  - {}", path.display());
    }
}
