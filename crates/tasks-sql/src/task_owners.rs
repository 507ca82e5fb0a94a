use serde::Serialize;
use uuid::Uuid;

/// TaskOwner assigns a task event to the user who must act on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOwner {
    pub event_id: Uuid,
    pub task_owner: String,
    pub en_route: i32,
    pub group_id: Option<String>,
    pub group_owner: Option<String>,
    pub is_processed: i32,
    pub is_reviewer: Option<i32>,
    pub is_substituted: Option<i32>,
    pub task_owner_email: String,
    pub task_owner_disp: String,
}

pub async fn insert(row: &TaskOwner, txn: &mut sqlx::PgConnection) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        insert into task_owners (
            event_id,
            task_owner,
            en_route,
            group_id,
            group_owner,
            is_processed,
            is_reviewer,
            is_substituted,
            task_owner_email,
            task_owner_disp
        ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);
        "#,
    )
    .bind(row.event_id.to_string())
    .bind(&row.task_owner)
    .bind(row.en_route)
    .bind(&row.group_id)
    .bind(&row.group_owner)
    .bind(row.is_processed)
    .bind(row.is_reviewer)
    .bind(row.is_substituted)
    .bind(&row.task_owner_email)
    .bind(&row.task_owner_disp)
    .execute(txn)
    .await?;

    Ok(())
}
