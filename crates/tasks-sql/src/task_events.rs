use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// TaskEvent is the task itself: its status, deadlines, subject,
/// and the process instance it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEvent {
    pub event_id: Uuid,
    pub business_status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub comp_deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub cur_proc: String,
    pub cur_proc_disp: String,
    pub description: String,
    pub forwarded_at: Option<DateTime<Utc>>,
    pub forwarded_by: Option<String>,
    pub name: String,
    pub origin: String,
    pub priority: String,
    pub process_id: Uuid,
    pub proc_name: String,
    pub critical_deadline: DateTime<Utc>,
    pub status: String,
    pub status_flag: i32,
    pub subject: String,
    pub task_mode: Option<String>,
    pub task_type: String,
    pub updated_at: DateTime<Utc>,
    pub url: Option<String>,
    pub form_id: Option<String>,
}

pub async fn insert(row: &TaskEvent, txn: &mut sqlx::PgConnection) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        insert into task_events (
            event_id,
            business_status,
            completed_at,
            comp_deadline,
            created_at,
            created_by,
            cur_proc,
            cur_proc_disp,
            description,
            forwarded_at,
            forwarded_by,
            name,
            origin,
            priority,
            process_id,
            proc_name,
            critical_deadline,
            status,
            status_flag,
            subject,
            task_mode,
            task_type,
            updated_at,
            url,
            form_id
        ) values (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
            $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
        );
        "#,
    )
    .bind(row.event_id.to_string())
    .bind(&row.business_status)
    .bind(row.completed_at)
    .bind(row.comp_deadline)
    .bind(row.created_at)
    .bind(&row.created_by)
    .bind(&row.cur_proc)
    .bind(&row.cur_proc_disp)
    .bind(&row.description)
    .bind(row.forwarded_at)
    .bind(&row.forwarded_by)
    .bind(&row.name)
    .bind(&row.origin)
    .bind(&row.priority)
    .bind(row.process_id.to_string())
    .bind(&row.proc_name)
    .bind(row.critical_deadline)
    .bind(&row.status)
    .bind(row.status_flag)
    .bind(&row.subject)
    .bind(&row.task_mode)
    .bind(&row.task_type)
    .bind(row.updated_at)
    .bind(&row.url)
    .bind(&row.form_id)
    .execute(txn)
    .await?;

    Ok(())
}
