/// PurgeTree Core: recursive deletion engine, capabilities, and data model.
///
/// This crate contains all deletion logic with zero CLI dependencies.
/// It is designed to be embedded by any tool that needs to remove build
/// output, caches, or scratch trees without losing track of what could
/// not be removed.
///
/// # Modules
///
/// - [`model`]: Deletion requests, failure sets, and work results.
/// - [`resolve`]: Turning root specifications into absolute paths.
/// - [`platform`]: Symlink detection and the pre-retry reclaim workaround.
/// - [`fs`]: The filesystem seam the engine deletes through.
/// - [`cancel`]: Cooperative cancellation of the retry wait.
/// - [`deleter`]: The depth-first deletion engine and its diagnostics.
pub mod cancel;
pub mod deleter;
pub mod error;
pub mod fs;
pub mod model;
pub mod platform;
pub mod resolve;

pub use cancel::{CancelToken, Cancelled};
pub use deleter::{Deleter, DeleterConfig, DELETE_RETRY_DELAY};
pub use error::{DeleteError, ResolveError};
pub use model::{DeleteReport, DeleteRequest, FailureSet, PathSpec, WorkResult};
