use serde::Serialize;
use uuid::Uuid;

/// CustomAttrValue is a process-specific attribute attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomAttrValue {
    pub task_id: Uuid,
    pub process_name: String,
    pub attr_key: String,
    pub attr_value: Option<String>,
}

pub async fn insert(row: &CustomAttrValue, txn: &mut sqlx::PgConnection) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        insert into custom_attr_values (task_id, process_name, attr_key, attr_value)
        values ($1, $2, $3, $4);
        "#,
    )
    .bind(row.task_id.to_string())
    .bind(&row.process_name)
    .bind(&row.attr_key)
    .bind(&row.attr_value)
    .execute(txn)
    .await?;

    Ok(())
}
