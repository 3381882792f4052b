/// Platform capabilities: symlink detection and the pre-retry reclaim
/// workaround.
///
/// Both are traits so the engine stays portable and tests can substitute
/// them. The native implementations key Windows-specific behaviour on
/// `cfg(windows)`.
pub mod reclaim;
#[cfg(windows)]
mod win32;

pub use reclaim::ReclaimHooks;

use std::path::Path;

/// Capability that reports whether a path is a symbolic link.
pub trait SymlinkOracle: Send + Sync {
    fn is_symlink(&self, path: &Path) -> bool;
}

/// Capability that describes the running platform's deletion quirks.
pub trait PlatformInfo: Send + Sync {
    /// Whether a reclaim pass should run before retrying a failed delete.
    fn requires_reclaim_workaround(&self) -> bool;

    /// Release whatever stale handles the process is still holding.
    fn reclaim(&self);
}

/// Native symlink detection.
///
/// On Windows every reparse point counts, so directory junctions are
/// treated like symlinks and never descended into.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSymlinkOracle;

impl SymlinkOracle for NativeSymlinkOracle {
    #[cfg(not(windows))]
    fn is_symlink(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[cfg(windows)]
    fn is_symlink(&self, path: &Path) -> bool {
        win32::is_reparse_point(path)
    }
}

/// The running OS.
///
/// Windows can refuse to delete a file whose handles are still pending
/// release inside the process, so it asks for a reclaim pass before the
/// retry. The pass runs the registered [`ReclaimHooks`].
#[derive(Default)]
pub struct NativePlatform {
    hooks: ReclaimHooks,
}

impl NativePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing hook registry.
    pub fn with_hooks(hooks: ReclaimHooks) -> Self {
        Self { hooks }
    }

    pub fn hooks(&self) -> &ReclaimHooks {
        &self.hooks
    }
}

impl PlatformInfo for NativePlatform {
    fn requires_reclaim_workaround(&self) -> bool {
        cfg!(windows)
    }

    fn reclaim(&self) {
        self.hooks.run_all();
    }
}
