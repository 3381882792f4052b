/// Deletion engine: removes each root and everything beneath it.
///
/// Traversal is depth-first with children removed before their parent, since
/// a directory can only be removed once empty. Each entry that refuses to go
/// is retried exactly once after a short pause (and, on platforms that need
/// it, a reclaim pass). Entries that still refuse are collected into a
/// per-root [`FailureSet`] instead of aborting the walk, so the error for a
/// root lists everything that survived.
///
/// The first root that ends with a non-empty failure set fails the call;
/// later roots are not attempted.
///
/// Per entry: `Unvisited → Descending (dirs) → Deleting → Deleted`, or
/// `Deleting → RetryPending → Deleted | Failed`.
pub mod diagnostics;
pub mod progress;

use crate::cancel::CancelToken;
use crate::error::DeleteError;
use crate::fs::{Filesystem, StdFilesystem};
use crate::model::{DeleteRequest, FailureSet, PathSpec, WorkResult};
use crate::platform::{NativePlatform, NativeSymlinkOracle, PlatformInfo, SymlinkOracle};
use crate::resolve::PathResolver;
use crossbeam_channel::Sender;
use progress::DeleteProgress;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Pause before the single retry of a failed delete.
pub const DELETE_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Tunables for a [`Deleter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleterConfig {
    /// Pause before retrying a failed delete.
    pub retry_delay: Duration,
}

impl Default for DeleterConfig {
    fn default() -> Self {
        Self {
            retry_delay: DELETE_RETRY_DELAY,
        }
    }
}

/// The recursive deletion engine.
///
/// Holds no per-call state, so one `Deleter` can serve concurrent calls on
/// disjoint roots. Overlapping roots are not locked against each other; a
/// tree that changes underneath a call shows up in the diagnostic instead.
#[derive(Clone)]
pub struct Deleter {
    resolver: Arc<dyn PathResolver>,
    fs: Arc<dyn Filesystem>,
    symlinks: Arc<dyn SymlinkOracle>,
    platform: Arc<dyn PlatformInfo>,
    config: DeleterConfig,
    cancel: CancelToken,
    progress_tx: Option<Sender<DeleteProgress>>,
}

/// Accumulator threaded through one root's traversal.
#[derive(Default)]
struct Traversal {
    failures: FailureSet,
    removed: u64,
    retried: u64,
    /// Canonical directories currently being descended through, used to
    /// stop symlink cycles when following links.
    active: Vec<PathBuf>,
}

impl Deleter {
    /// A deleter on the native filesystem and platform.
    pub fn new(resolver: impl PathResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
            fs: Arc::new(StdFilesystem),
            symlinks: Arc::new(NativeSymlinkOracle),
            platform: Arc::new(NativePlatform::new()),
            config: DeleterConfig::default(),
            cancel: CancelToken::new(),
            progress_tx: None,
        }
    }

    pub fn with_filesystem(mut self, fs: impl Filesystem + 'static) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    pub fn with_symlink_oracle(mut self, oracle: impl SymlinkOracle + 'static) -> Self {
        self.symlinks = Arc::new(oracle);
        self
    }

    pub fn with_platform(mut self, platform: impl PlatformInfo + 'static) -> Self {
        self.platform = Arc::new(platform);
        self
    }

    pub fn with_config(mut self, config: DeleterConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `token` to cancel the retry wait from another thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Emit [`DeleteProgress`] events on `tx`.
    ///
    /// Sends block when a bounded channel is full, so the receiver must be
    /// drained while the call runs.
    pub fn with_progress(mut self, tx: Sender<DeleteProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn config(&self) -> &DeleterConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Delete `paths` without following symlinks. Returns whether any root
    /// existed.
    pub fn delete_paths<I, P>(&self, paths: I) -> Result<bool, DeleteError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathSpec>,
    {
        let request = DeleteRequest::new().delete(paths).follow_symlinks(false);
        Ok(self.delete(&request)?.did_work)
    }

    /// Absolute roots of `request`, in order, exactly as [`Deleter::delete`]
    /// will visit them. Fails on the first spec that cannot be resolved.
    pub fn resolve_roots(&self, request: &DeleteRequest) -> Result<Vec<PathBuf>, DeleteError> {
        request
            .paths()
            .iter()
            .map(|spec| self.resolver.resolve(spec).map_err(DeleteError::from))
            .collect()
    }

    /// Delete every root in `request`, in order.
    ///
    /// All roots are resolved first; a resolution error aborts before
    /// anything is removed. Absent roots are skipped. The first root whose
    /// subtree keeps entries after the retry fails the call with
    /// [`DeleteError::UnableToDelete`].
    pub fn delete(&self, request: &DeleteRequest) -> Result<WorkResult, DeleteError> {
        let start = Instant::now();
        let roots = self.resolve_roots(request)?;
        let follow_symlinks = request.is_follow_symlinks();

        let mut result = WorkResult::default();
        for root in roots {
            if !self.fs.target_exists(&root) {
                debug!("Skipping {}: does not exist", root.display());
                self.emit(DeleteProgress::RootSkipped { path: root });
                continue;
            }

            debug!("Deleting {}", root.display());
            result.did_work = true;
            self.emit(DeleteProgress::RootStarted { path: root.clone() });

            if let Err(err) = self.delete_root(&root, follow_symlinks, &mut result) {
                self.emit(DeleteProgress::Aborted {
                    root,
                    message: err.to_string(),
                });
                return Err(err);
            }
        }

        let duration = start.elapsed();
        info!(
            "Deleted {} entries ({} retried) in {duration:?}",
            result.removed, result.retried
        );
        self.emit(DeleteProgress::Complete {
            did_work: result.did_work,
            removed: result.removed,
            duration,
        });
        Ok(result)
    }

    /// Traverse one root with a fresh failure set and fold its counters
    /// into `result`.
    fn delete_root(
        &self,
        root: &Path,
        follow_symlinks: bool,
        result: &mut WorkResult,
    ) -> Result<(), DeleteError> {
        let mut traversal = Traversal::default();
        let walk = self.delete_recursively(root, follow_symlinks, &mut traversal);
        result.removed += traversal.removed;
        result.retried += traversal.retried;
        walk?;

        if traversal.failures.is_empty() {
            return Ok(());
        }

        warn!(
            "{} path(s) under {} could not be deleted",
            traversal.failures.len(),
            root.display()
        );
        let message = diagnostics::build_help_message(
            self.fs.as_ref(),
            self.symlinks.as_ref(),
            root,
            follow_symlinks,
            &traversal.failures,
        );
        Err(DeleteError::UnableToDelete {
            path: root.to_path_buf(),
            message,
        })
    }

    fn delete_recursively(
        &self,
        node: &Path,
        follow_symlinks: bool,
        traversal: &mut Traversal,
    ) -> Result<(), DeleteError> {
        if self.fs.is_dir(node) && (follow_symlinks || !self.symlinks.is_symlink(node)) {
            let entered = follow_symlinks && self.enter(node, traversal);
            if !follow_symlinks || entered {
                let listed = self.delete_children(node, follow_symlinks, traversal);
                if entered {
                    traversal.active.pop();
                }
                // Something else removed it between the check and the listing.
                if !listed? {
                    return Ok(());
                }
            }
        }

        if self.delete_file(node) {
            traversal.removed += 1;
            return Ok(());
        }
        self.handle_failed_delete(node, traversal)
    }

    /// Recurse into each child of `dir`. Returns `Ok(false)` if `dir`
    /// vanished before it could be listed.
    fn delete_children(
        &self,
        dir: &Path,
        follow_symlinks: bool,
        traversal: &mut Traversal,
    ) -> Result<bool, DeleteError> {
        let children = match self.fs.list_children(dir) {
            Ok(children) => children,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} vanished before listing", dir.display());
                return Ok(false);
            }
            Err(err) => {
                // Still try the directory itself; if it is not empty that
                // failure is recorded.
                warn!("Cannot list {}: {err}", dir.display());
                return Ok(true);
            }
        };
        for child in &children {
            self.delete_recursively(child, follow_symlinks, traversal)?;
        }
        Ok(true)
    }

    /// Push `dir` onto the active descent stack. Returns `false` when it is
    /// already there, i.e. a followed symlink leads back into an ancestor.
    fn enter(&self, dir: &Path, traversal: &mut Traversal) -> bool {
        let canonical = match self.fs.canonicalize(dir) {
            Ok(c) => c,
            Err(_) => absolute(dir),
        };
        if traversal.active.contains(&canonical) {
            debug!("Not descending into {}: symlink cycle", dir.display());
            return false;
        }
        traversal.active.push(canonical);
        true
    }

    /// One removal attempt, confirmed by an existence check so a removal
    /// that reports success but leaves the entry behind counts as failed.
    fn delete_file(&self, path: &Path) -> bool {
        match self.fs.remove(path) {
            Ok(()) => !self.fs.exists(path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => true,
            Err(err) => {
                debug!("Failed to delete {}: {err}", path.display());
                false
            }
        }
    }

    /// The single retry. Records `path` in the failure set if it still
    /// refuses.
    fn handle_failed_delete(
        &self,
        path: &Path,
        traversal: &mut Traversal,
    ) -> Result<(), DeleteError> {
        traversal.retried += 1;
        self.emit(DeleteProgress::Retrying {
            path: path.to_path_buf(),
        });

        if self.platform.requires_reclaim_workaround() {
            self.platform.reclaim();
        }
        self.cancel
            .sleep(self.config.retry_delay)
            .map_err(|_| DeleteError::Cancelled {
                path: path.to_path_buf(),
            })?;

        if self.delete_file(path) {
            traversal.removed += 1;
        } else {
            warn!("Unable to delete {}", path.display());
            let failed = absolute(path);
            self.emit(DeleteProgress::Failed {
                path: failed.clone(),
            });
            traversal.failures.insert(failed);
        }
        Ok(())
    }

    fn emit(&self, event: DeleteProgress) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(event);
        }
    }
}

/// Absolute form of `path` without touching the filesystem.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
