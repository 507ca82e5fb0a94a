use super::{start_of_day, TaskSession, TaskStore};
use crate::{StoreError, TaskEventBundle};
use alerts::ConvertedTasks;
use chrono::{DateTime, Utc};
use sqlx::Connection;

/// PgTaskStore writes tasks into a Postgres task database.
/// Each session checks out its own connection from the pool.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: sqlx::PgPool,
}

impl PgTaskStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl TaskStore for PgTaskStore {
    async fn open(&self) -> Result<Box<dyn TaskSession>, StoreError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|err| classify(err, "acquiring a task database connection"))?;

        tracing::debug!("opened task database session");
        Ok(Box::new(PgSession { conn }))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn converted_tasks(
        &self,
        task_name: &str,
        now: DateTime<Utc>,
    ) -> Result<ConvertedTasks, StoreError> {
        let total = tasks_sql::count_tasks(task_name, None, &self.pool)
            .await
            .map_err(|err| classify(err, "counting converted tasks"))?;
        let today = tasks_sql::count_tasks(task_name, Some(start_of_day(now)), &self.pool)
            .await
            .map_err(|err| classify(err, "counting tasks converted today"))?;

        Ok(ConvertedTasks { total, today })
    }
}

struct PgSession {
    conn: sqlx::pool::PoolConnection<sqlx::Postgres>,
}

#[async_trait::async_trait]
impl TaskSession for PgSession {
    async fn request_id_exists(&mut self, request_id: &str) -> Result<bool, StoreError> {
        tasks_sql::process_events::request_id_exists(request_id, &mut *self.conn)
            .await
            .map_err(|err| classify(err, "checking for an existing request id"))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(event_id = %bundle.event_id()))]
    async fn write_bundle(&mut self, bundle: &TaskEventBundle) -> Result<(), StoreError> {
        let mut txn = self
            .conn
            .begin()
            .await
            .map_err(|err| classify(err, "beginning a transaction"))?;

        match insert_bundle(bundle, &mut txn).await {
            Ok(()) => txn
                .commit()
                .await
                .map_err(|err| classify(err, "committing task bundle")),
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(?rollback_err, "failed to roll back task bundle");
                }
                Err(err)
            }
        }
    }

    async fn close(self: Box<Self>) {
        // Dropping the connection returns it to the pool.
        tracing::debug!("closed task database session");
    }
}

async fn insert_bundle(
    bundle: &TaskEventBundle,
    txn: &mut sqlx::PgConnection,
) -> Result<(), StoreError> {
    tasks_sql::task_owners::insert(&bundle.owner, txn)
        .await
        .map_err(|err| classify(err, "inserting into task_owners"))?;
    tasks_sql::task_events::insert(&bundle.event, txn)
        .await
        .map_err(|err| classify(err, "inserting into task_events"))?;
    tasks_sql::process_events::insert(&bundle.process, txn)
        .await
        .map_err(|err| classify(err, "inserting into process_events"))?;
    tasks_sql::custom_attr_values::insert(&bundle.attribute, txn)
        .await
        .map_err(|err| classify(err, "inserting into custom_attr_values"))?;
    Ok(())
}

/// Map a sqlx error into a StoreError, distinguishing a lost or unavailable
/// database from a write which the database refused.
fn classify(err: sqlx::Error, context: &'static str) -> StoreError {
    let connection_lost = matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    );
    let err = anyhow::Error::new(err).context(context);

    if connection_lost {
        StoreError::Connection(err)
    } else {
        StoreError::Write(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(matches!(
            classify(sqlx::Error::Io(io), "inserting into task_events"),
            StoreError::Connection(_)
        ));
        assert!(matches!(
            classify(sqlx::Error::PoolTimedOut, "acquiring"),
            StoreError::Connection(_)
        ));

        let err = classify(sqlx::Error::RowNotFound, "inserting into task_owners");
        assert!(matches!(err, StoreError::Write(_)));
        assert_eq!(
            err.to_string(),
            "inserting into task_owners: no rows returned by a query that expected to return at least one row"
        );
    }
}
