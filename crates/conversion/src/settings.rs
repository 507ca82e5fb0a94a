/// TaskSettings are the fixed metadata of tasks created from alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSettings {
    /// User id of the requester, who also owns the created tasks.
    pub user_id: String,
    /// Display name of the requester.
    pub user_name: String,
    /// Email address of the requester.
    pub user_email: String,
    /// Name of the task process.
    pub task_name: String,
    /// Process name under which custom attributes are recorded.
    pub process_name: String,
    pub attr_key: String,
    pub task_type: String,
    pub origin: String,
    pub priority: String,
    pub business_status: String,
    pub status: String,
    /// Prefix of task subjects, which are suffixed with the alert's well and stage.
    pub subject_prefix: String,
    /// Days from creation until the task's completion deadline.
    pub deadline_days: i64,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            user_id: "P000006".to_string(),
            user_name: "Murphy Operations".to_string(),
            user_email: "murphy-operations@example.com".to_string(),
            task_name: "Murphy - Screenout Alert".to_string(),
            process_name: "Murphy Account".to_string(),
            attr_key: "MURPHY001".to_string(),
            task_type: "Approve/Reject".to_string(),
            origin: "SCP".to_string(),
            priority: "High".to_string(),
            business_status: "Reserved".to_string(),
            status: "READY".to_string(),
            subject_prefix: "Murphy Screenout Alert".to_string(),
            deadline_days: 10,
        }
    }
}
