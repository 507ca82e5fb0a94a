use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// ProcessEvent is the process instance which a task event advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessEvent {
    pub process_id: Uuid,
    pub completed_at: Option<DateTime<Utc>>,
    pub name: String,
    /// Human-readable request number, like "MA00417".
    pub request_id: String,
    pub started_at: DateTime<Utc>,
    pub started_by: String,
    pub started_by_disp: String,
    pub status: String,
    pub subject: String,
}

pub async fn insert(row: &ProcessEvent, txn: &mut sqlx::PgConnection) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        insert into process_events (
            process_id,
            completed_at,
            name,
            request_id,
            started_at,
            started_by,
            started_by_disp,
            status,
            subject
        ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9);
        "#,
    )
    .bind(row.process_id.to_string())
    .bind(row.completed_at)
    .bind(&row.name)
    .bind(&row.request_id)
    .bind(row.started_at)
    .bind(&row.started_by)
    .bind(&row.started_by_disp)
    .bind(&row.status)
    .bind(&row.subject)
    .execute(txn)
    .await?;

    Ok(())
}

/// Returns whether a process having `request_id` already exists.
pub async fn request_id_exists(
    request_id: &str,
    db: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "select exists(select 1 from process_events where request_id = $1);",
    )
    .bind(request_id)
    .fetch_one(db)
    .await
}
