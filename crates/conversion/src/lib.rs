//! Conversion of operator-selected alerts into tasks of the
//! task-management database.
//!
//! Each converted alert becomes a [`TaskEventBundle`] of four related
//! records which share a freshly generated event and process id.
//! A batch of alerts is converted through a single [`TaskSession`]
//! which writes each bundle atomically. Failures of a single bundle are
//! reported against its row without aborting the batch, while loss of the
//! task database stops the batch at the failing row.

mod bundle;
mod convert;
mod request;
mod settings;
pub mod store;

pub use bundle::{BundleIds, TaskEventBundle};
pub use convert::{ConversionResult, ConvertedRow, Converter, FailedRow};
pub use request::ConversionRequest;
pub use settings::TaskSettings;
pub use store::{TaskSession, TaskStore};

/// ValidationError is a malformed selection of alerts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no alerts were selected")]
    EmptyBatch,
    #[error("alert row {0} does not exist")]
    UnknownRow(usize),
    #[error("alert row {0} was selected more than once")]
    DuplicateRow(usize),
}

/// StoreError is a failure of the task database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database couldn't be reached, or the connection was lost.
    #[error("task database is unreachable: {0:#}")]
    Connection(anyhow::Error),
    /// A write was refused, for example by a constraint violation.
    /// Writes of the failed bundle were rolled back.
    #[error("{0:#}")]
    Write(anyhow::Error),
}

/// ConvertError is a failure of an entire conversion batch.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("task database is unreachable: {0:#}")]
    Connection(anyhow::Error),
}
