//! SQL client of the task-management database into which alerts are
//! converted. Each module maps one table of that (externally owned) schema.
//! Identifiers are stored in their hyphenated text form, which is how the
//! task-management application itself writes them.

pub mod custom_attr_values;
pub mod process_events;
pub mod task_events;
pub mod task_owners;

use chrono::{DateTime, Utc};

/// Count the tasks of process `proc_name`, optionally only those created at or after `since`.
#[tracing::instrument(err, level = "debug", skip(db))]
pub async fn count_tasks(
    proc_name: &str,
    since: Option<DateTime<Utc>>,
    db: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        select count(*) from task_events
        where proc_name = $1 and ($2::timestamptz is null or created_at >= $2);
        "#,
    )
    .bind(proc_name)
    .bind(since)
    .fetch_one(db)
    .await
}
