use crate::{StoreError, TaskEventBundle};
use alerts::ConvertedTasks;
use chrono::{DateTime, NaiveTime, Utc};

mod memory;
mod postgres;

pub use memory::{Fault, FaultKind, MemoryTaskStore, Table, Tables};
pub use postgres::PgTaskStore;

/// TaskStore is a task database into which converted alerts are written.
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    /// Open a session which is used for the entirety of one conversion batch.
    /// An error means the database is unreachable.
    async fn open(&self) -> Result<Box<dyn TaskSession>, StoreError>;

    /// Count tasks of process `task_name` created in total, and since the
    /// start of the UTC day of `now`.
    async fn converted_tasks(
        &self,
        task_name: &str,
        now: DateTime<Utc>,
    ) -> Result<ConvertedTasks, StoreError>;
}

#[async_trait::async_trait]
impl<T: TaskStore + ?Sized> TaskStore for std::sync::Arc<T> {
    async fn open(&self) -> Result<Box<dyn TaskSession>, StoreError> {
        (**self).open().await
    }

    async fn converted_tasks(
        &self,
        task_name: &str,
        now: DateTime<Utc>,
    ) -> Result<ConvertedTasks, StoreError> {
        (**self).converted_tasks(task_name, now).await
    }
}

/// TaskSession is a single connection to a task database.
/// It's owned by one conversion batch and is never shared across batches.
#[async_trait::async_trait]
pub trait TaskSession: Send {
    /// Returns whether a process already uses the human-readable `request_id`.
    async fn request_id_exists(&mut self, request_id: &str) -> Result<bool, StoreError>;

    /// Write all records of `bundle` in a single transaction.
    /// On error, none of the bundle's records remain written.
    async fn write_bundle(&mut self, bundle: &TaskEventBundle) -> Result<(), StoreError>;

    /// Release the session.
    async fn close(self: Box<Self>);
}

/// Midnight UTC of the day of `now`.
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
