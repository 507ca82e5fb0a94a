use super::{start_of_day, TaskSession, TaskStore};
use crate::{StoreError, TaskEventBundle};
use alerts::ConvertedTasks;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tasks_sql::{
    custom_attr_values::CustomAttrValue, process_events::ProcessEvent, task_events::TaskEvent,
    task_owners::TaskOwner,
};

/// Tables of the task database, in the order a bundle is written to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    TaskOwners,
    TaskEvents,
    ProcessEvents,
    CustomAttrValues,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::TaskOwners,
        Table::TaskEvents,
        Table::ProcessEvents,
        Table::CustomAttrValues,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::TaskOwners => "task_owners",
            Table::TaskEvents => "task_events",
            Table::ProcessEvents => "process_events",
            Table::CustomAttrValues => "custom_attr_values",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The insert is refused, as by a constraint violation.
    Write,
    /// The connection is lost, and the session is unusable thereafter.
    Connection,
}

/// Fault fails the insert into `table` of the `bundle`'th bundle written
/// to the store (counting from zero, across all sessions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub bundle: usize,
    pub table: Table,
    pub kind: FaultKind,
}

/// Committed contents of a MemoryTaskStore.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tables {
    pub task_owners: Vec<TaskOwner>,
    pub task_events: Vec<TaskEvent>,
    pub process_events: Vec<ProcessEvent>,
    pub custom_attr_values: Vec<CustomAttrValue>,
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    request_ids: HashSet<String>,
    faults: Vec<Fault>,
    unreachable: bool,
    bundles_written: usize,
    sessions_opened: usize,
    sessions_closed: usize,
}

/// MemoryTaskStore is an in-process TaskStore. It previews conversions
/// without touching the task database, and can inject faults into writes.
/// Bundles are applied only once all of their records are written,
/// matching the transactional behavior of a real database.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    state: Arc<Mutex<State>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a fault into a future write.
    pub fn with_fault(self, fault: Fault) -> Self {
        self.lock().faults.push(fault);
        self
    }

    /// Make the store refuse to open sessions.
    pub fn unreachable(self) -> Self {
        self.lock().unreachable = true;
        self
    }

    /// Snapshot of committed records.
    pub fn tables(&self) -> Tables {
        self.lock().tables.clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panic while holding the lock can only come from a failed test assertion.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl TaskStore for MemoryTaskStore {
    async fn open(&self) -> Result<Box<dyn TaskSession>, StoreError> {
        let mut state = self.lock();
        if state.unreachable {
            return Err(StoreError::Connection(anyhow::anyhow!(
                "connection refused"
            )));
        }
        state.sessions_opened += 1;

        Ok(Box::new(MemorySession {
            store: self.clone(),
            lost: false,
        }))
    }

    async fn converted_tasks(
        &self,
        task_name: &str,
        now: DateTime<Utc>,
    ) -> Result<ConvertedTasks, StoreError> {
        let state = self.lock();
        if state.unreachable {
            return Err(StoreError::Connection(anyhow::anyhow!(
                "connection refused"
            )));
        }
        let midnight = start_of_day(now);

        let events = state
            .tables
            .task_events
            .iter()
            .filter(|event| event.proc_name == task_name);
        let (mut total, mut today) = (0, 0);
        for event in events {
            total += 1;
            if event.created_at >= midnight {
                today += 1;
            }
        }
        Ok(ConvertedTasks { total, today })
    }
}

struct MemorySession {
    store: MemoryTaskStore,
    lost: bool,
}

impl MemorySession {
    fn check_connection(&self) -> Result<(), StoreError> {
        if self.lost {
            Err(StoreError::Connection(anyhow::anyhow!("connection was lost")))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl TaskSession for MemorySession {
    async fn request_id_exists(&mut self, request_id: &str) -> Result<bool, StoreError> {
        self.check_connection()?;
        Ok(self.store.lock().request_ids.contains(request_id))
    }

    async fn write_bundle(&mut self, bundle: &TaskEventBundle) -> Result<(), StoreError> {
        self.check_connection()?;

        let mut state = self.store.lock();
        let ordinal = state.bundles_written;
        state.bundles_written += 1;

        for table in Table::ALL {
            let fault = state
                .faults
                .iter()
                .find(|f| f.bundle == ordinal && f.table == table)
                .copied();

            let context = format!("inserting into {}", table.name());
            match fault.map(|f| f.kind) {
                Some(FaultKind::Write) => {
                    return Err(StoreError::Write(
                        anyhow::anyhow!("injected write fault").context(context),
                    ));
                }
                Some(FaultKind::Connection) => {
                    self.lost = true;
                    return Err(StoreError::Connection(
                        anyhow::anyhow!("injected connection fault").context(context),
                    ));
                }
                None => (),
            }

            if table == Table::ProcessEvents
                && state.request_ids.contains(&bundle.process.request_id)
            {
                return Err(StoreError::Write(
                    anyhow::anyhow!(
                        "duplicate request_id {:?} violates unique constraint",
                        bundle.process.request_id
                    )
                    .context(context),
                ));
            }
        }

        // Every insert succeeded: commit the bundle.
        state.request_ids.insert(bundle.process.request_id.clone());
        let tables = &mut state.tables;
        tables.task_owners.push(bundle.owner.clone());
        tables.task_events.push(bundle.event.clone());
        tables.process_events.push(bundle.process.clone());
        tables.custom_attr_values.push(bundle.attribute.clone());

        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.store.lock().sessions_closed += 1;
    }
}
