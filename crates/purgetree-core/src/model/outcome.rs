/// Results of a deletion call.
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a successful call.
///
/// `did_work` is `true` iff at least one root existed when its turn came.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkResult {
    pub did_work: bool,
    /// Entries removed, roots included.
    pub removed: u64,
    /// Entries whose first removal attempt failed and needed the retry.
    pub retried: u64,
}

impl WorkResult {
    pub fn did_work(&self) -> bool {
        self.did_work
    }
}

/// Serialisable summary of one call, for machine-readable output.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    pub roots: Vec<PathBuf>,
    pub did_work: bool,
    pub removed: u64,
    pub retried: u64,
    pub finished_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteReport {
    /// Summarise a finished call.
    pub fn new<E: std::fmt::Display>(roots: Vec<PathBuf>, result: &Result<WorkResult, E>) -> Self {
        let (work, error) = match result {
            Ok(work) => (*work, None),
            Err(err) => (WorkResult::default(), Some(err.to_string())),
        };
        Self {
            roots,
            did_work: work.did_work,
            removed: work.removed,
            retried: work.retried,
            finished_at: Local::now(),
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
