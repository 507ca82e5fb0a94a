use crate::TaskSettings;
use alerts::AlertRecord;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tasks_sql::{
    custom_attr_values::CustomAttrValue, process_events::ProcessEvent, task_events::TaskEvent,
    task_owners::TaskOwner,
};
use uuid::Uuid;

/// Identifiers which are freshly generated for each converted alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleIds {
    pub event_id: Uuid,
    pub process_id: Uuid,
    pub request_id: String,
}

impl BundleIds {
    /// Generate random event and process ids to accompany `request_id`.
    pub fn generate(request_id: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            process_id: Uuid::new_v4(),
            request_id,
        }
    }
}

/// Draw a candidate human-readable request id, like "MA00417263".
/// Candidates are not unique, and must be checked against existing processes.
pub(crate) fn draw_request_id() -> String {
    let n: u32 = rand::thread_rng().gen_range(1..=999_999_999);
    format!("MA00{n}")
}

/// TaskEventBundle is the set of records written for one converted alert.
/// All four records share one event id and one process id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEventBundle {
    pub owner: TaskOwner,
    pub event: TaskEvent,
    pub process: ProcessEvent,
    pub attribute: CustomAttrValue,
}

impl TaskEventBundle {
    pub fn build(
        record: &AlertRecord,
        ids: BundleIds,
        settings: &TaskSettings,
        now: DateTime<Utc>,
    ) -> Self {
        let BundleIds {
            event_id,
            process_id,
            request_id,
        } = ids;
        let subject = format!("{} - {}", settings.subject_prefix, record.well_stage);

        let owner = TaskOwner {
            event_id,
            task_owner: settings.user_id.clone(),
            en_route: 1,
            group_id: None,
            group_owner: None,
            is_processed: 0,
            is_reviewer: None,
            is_substituted: None,
            task_owner_email: settings.user_email.clone(),
            task_owner_disp: settings.user_name.clone(),
        };
        let event = TaskEvent {
            event_id,
            business_status: settings.business_status.clone(),
            completed_at: None,
            comp_deadline: now + Duration::days(settings.deadline_days),
            created_at: now,
            created_by: settings.user_id.clone(),
            cur_proc: settings.user_id.clone(),
            cur_proc_disp: settings.user_name.clone(),
            description: record.well_stage.clone(),
            forwarded_at: None,
            forwarded_by: None,
            name: settings.task_name.clone(),
            origin: settings.origin.clone(),
            priority: settings.priority.clone(),
            process_id,
            proc_name: settings.task_name.clone(),
            critical_deadline: now,
            status: settings.status.clone(),
            status_flag: 0,
            subject,
            task_mode: None,
            task_type: settings.task_type.clone(),
            updated_at: now,
            url: None,
            form_id: None,
        };
        let process = ProcessEvent {
            process_id,
            completed_at: None,
            name: settings.task_name.clone(),
            request_id,
            started_at: now,
            started_by: settings.user_id.clone(),
            started_by_disp: settings.user_name.clone(),
            status: settings.status.clone(),
            subject: record.well_stage.clone(),
        };
        let attribute = CustomAttrValue {
            task_id: event_id,
            process_name: settings.process_name.clone(),
            attr_key: settings.attr_key.clone(),
            attr_value: None,
        };

        Self {
            owner,
            event,
            process,
            attribute,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event.event_id
    }

    pub fn process_id(&self) -> Uuid {
        self.process.process_id
    }

    pub fn subject(&self) -> &str {
        &self.event.subject
    }
}
