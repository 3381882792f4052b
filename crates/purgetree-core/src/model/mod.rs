/// Data model for deletion calls.
///
/// Re-exports the request builder, the per-root failure accumulator, and
/// the result types.
pub mod failure_set;
pub mod outcome;
pub mod request;

pub use failure_set::FailureSet;
pub use outcome::{DeleteReport, WorkResult};
pub use request::{DeleteRequest, PathSpec};
