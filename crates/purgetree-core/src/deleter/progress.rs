/// Deletion progress reporting and background execution.
///
/// The engine is synchronous. [`start_delete`] runs one call on a named
/// background thread so a frontend can show progress and cancel the retry
/// wait while the call runs.
use super::Deleter;
use crate::cancel::CancelToken;
use crate::error::DeleteError;
use crate::model::{DeleteRequest, WorkResult};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Maximum number of progress messages that may queue up in the channel
/// before the deleting thread blocks.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Events sent from the deleting thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteProgress {
    /// A root exists and its traversal is starting.
    RootStarted { path: PathBuf },
    /// A root did not exist and was skipped.
    RootSkipped { path: PathBuf },
    /// A removal failed and is about to be retried.
    Retrying { path: PathBuf },
    /// A removal failed again and was recorded.
    Failed { path: PathBuf },
    /// Every root was removed.
    Complete {
        did_work: bool,
        removed: u64,
        duration: Duration,
    },
    /// The call failed on `root`; no later roots are attempted.
    Aborted { root: PathBuf, message: String },
}

/// Handle to a running or finished background deletion.
pub struct DeleteHandle {
    /// Receiver for progress events. Disconnects when the call finishes.
    pub progress_rx: Receiver<DeleteProgress>,
    cancel: CancelToken,
    thread: thread::JoinHandle<Result<WorkResult, DeleteError>>,
}

impl DeleteHandle {
    /// Cut the current (or next) retry wait short. The call then fails
    /// with [`DeleteError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the background thread has finished.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Drain remaining progress, join the thread, and return its result
    /// together with the drained events.
    pub fn wait(self) -> (Vec<DeleteProgress>, Result<WorkResult, DeleteError>) {
        let events: Vec<DeleteProgress> = self.progress_rx.iter().collect();
        match self.thread.join() {
            Ok(result) => (events, result),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Run `deleter` on `request` on a background thread.
///
/// The deleter's progress sender is replaced with the handle's channel and
/// its cancel token is shared with the handle.
pub fn start_delete(deleter: Deleter, request: DeleteRequest) -> std::io::Result<DeleteHandle> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<DeleteProgress>(PROGRESS_CHANNEL_CAPACITY);
    let deleter = deleter.with_progress(progress_tx);
    let cancel = deleter.cancel_token().clone();

    let thread = thread::Builder::new()
        .name("purgetree-deleter".into())
        .spawn(move || {
            info!("Starting deletion of {} root(s)", request.paths().len());
            deleter.delete(&request)
        })?;

    Ok(DeleteHandle {
        progress_rx,
        cancel,
        thread,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::BaseDirResolver;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_background_delete_reports_progress() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("gone");
        let missing = tmp.path().join("never-existed");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("f"), b"x").unwrap();

        let deleter = Deleter::new(BaseDirResolver::new(tmp.path()));
        let request = DeleteRequest::new().delete([&missing, &root]);
        let (events, result) = start_delete(deleter, request).unwrap().wait();

        assert!(result.unwrap().did_work);
        assert!(!root.exists());
        assert_eq!(events[0], DeleteProgress::RootSkipped { path: missing });
        assert_eq!(events[1], DeleteProgress::RootStarted { path: root });
        assert!(matches!(
            events.last(),
            Some(DeleteProgress::Complete {
                did_work: true,
                removed: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_channel_disconnects_after_completion() {
        let tmp = TempDir::new().unwrap();
        let deleter = Deleter::new(BaseDirResolver::new(tmp.path()));
        let handle = start_delete(deleter, DeleteRequest::new()).unwrap();
        let events: Vec<_> = handle.progress_rx.iter().collect();
        assert_eq!(events.len(), 1);
        let (_, result) = handle.wait();
        assert!(!result.unwrap().did_work);
    }
}
