use crate::bundle::draw_request_id;
use crate::{
    BundleIds, ConvertError, StoreError, TaskEventBundle, TaskSession, TaskSettings, TaskStore,
    ValidationError,
};
use alerts::AlertRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Number of candidate request ids drawn before giving up on a row.
const REQUEST_ID_ATTEMPTS: usize = 8;

/// ConvertedRow is an alert which was successfully converted into a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedRow {
    pub row: usize,
    pub well_stage: String,
    pub subject: String,
    pub event_id: Uuid,
    pub process_id: Uuid,
    pub request_id: String,
}

/// FailedRow is an alert whose conversion failed, and which left no records behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRow {
    pub row: usize,
    pub well_stage: String,
    pub reason: String,
}

/// ConversionResult accounts for every row of a conversion batch:
/// each is either converted, failed, or not attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub converted: Vec<ConvertedRow>,
    pub failed: Vec<FailedRow>,
    /// Rows which were not attempted because the batch was aborted.
    pub not_attempted: Vec<usize>,
    /// Reason the batch was aborted, if it was.
    pub aborted: Option<String>,
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.not_attempted.is_empty() && self.aborted.is_none()
    }

    /// Operator-facing account of the batch.
    pub fn message(&self) -> String {
        let mut lines = Vec::new();

        if !self.converted.is_empty() {
            let keys: Vec<_> = self.converted.iter().map(|c| c.well_stage.as_str()).collect();
            lines.push(format!(
                "Created {} task(s) for: {}",
                self.converted.len(),
                keys.join(", ")
            ));
        }
        for failed in &self.failed {
            lines.push(format!(
                "Failed to create a task for row {} ({}): {}",
                failed.row, failed.well_stage, failed.reason
            ));
        }
        if let Some(aborted) = &self.aborted {
            lines.push(format!(
                "Stopped after a database failure ({aborted}); rows not attempted: {:?}",
                self.not_attempted
            ));
        }
        lines.join("\n")
    }
}

/// Converter turns selected alerts into tasks of a TaskStore.
pub struct Converter<S> {
    store: S,
    settings: TaskSettings,
    clock: fn() -> DateTime<Utc>,
}

impl<S: TaskStore> Converter<S> {
    pub fn new(store: S, settings: TaskSettings) -> Self {
        Self {
            store,
            settings,
            clock: Utc::now,
        }
    }

    /// Use `clock` as the source of task creation times.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    /// Convert `rows` into tasks, in order. Each row is written as one atomic
    /// bundle through a session which is held for the duration of the call.
    ///
    /// Converting a row which was converted before creates another task:
    /// conversions are not idempotent.
    #[tracing::instrument(skip_all, fields(rows = rows.len()))]
    pub async fn convert(&self, rows: &[&AlertRecord]) -> Result<ConversionResult, ConvertError> {
        if rows.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }

        let mut session = self.store.open().await.map_err(|err| match err {
            StoreError::Connection(err) | StoreError::Write(err) => ConvertError::Connection(err),
        })?;

        let mut result = ConversionResult::default();
        let mut remaining = rows.iter();

        while let Some(record) = remaining.next() {
            match self.convert_row(session.as_mut(), record).await {
                Ok(converted) => {
                    tracing::info!(
                        row = record.row,
                        well_stage = %record.well_stage,
                        event_id = %converted.event_id,
                        request_id = %converted.request_id,
                        "created task"
                    );
                    result.converted.push(converted);
                }
                Err(StoreError::Write(err)) => {
                    tracing::warn!(row = record.row, error = ?err, "failed to create task");
                    result.failed.push(FailedRow {
                        row: record.row,
                        well_stage: record.well_stage.clone(),
                        reason: format!("{err:#}"),
                    });
                }
                Err(StoreError::Connection(err)) => {
                    let reason = format!("task database is unreachable: {err:#}");
                    tracing::error!(row = record.row, error = ?err, "aborting conversion batch");

                    result.failed.push(FailedRow {
                        row: record.row,
                        well_stage: record.well_stage.clone(),
                        reason: reason.clone(),
                    });
                    result.not_attempted = remaining.map(|r| r.row).collect();
                    result.aborted = Some(reason);
                    break;
                }
            }
        }
        session.close().await;

        tracing::info!(
            converted = result.converted.len(),
            failed = result.failed.len(),
            not_attempted = result.not_attempted.len(),
            "finished conversion batch"
        );
        Ok(result)
    }

    async fn convert_row(
        &self,
        session: &mut dyn TaskSession,
        record: &AlertRecord,
    ) -> Result<ConvertedRow, StoreError> {
        let request_id = unused_request_id(session).await?;
        let bundle = TaskEventBundle::build(
            record,
            BundleIds::generate(request_id),
            &self.settings,
            (self.clock)(),
        );
        session.write_bundle(&bundle).await?;

        Ok(ConvertedRow {
            row: record.row,
            well_stage: record.well_stage.clone(),
            subject: bundle.subject().to_string(),
            event_id: bundle.event_id(),
            process_id: bundle.process_id(),
            request_id: bundle.process.request_id,
        })
    }
}

async fn unused_request_id(session: &mut dyn TaskSession) -> Result<String, StoreError> {
    for _ in 0..REQUEST_ID_ATTEMPTS {
        let candidate = draw_request_id();
        if !session.request_id_exists(&candidate).await? {
            return Ok(candidate);
        }
        tracing::debug!(%candidate, "request id is taken, drawing another");
    }
    Err(StoreError::Write(anyhow::anyhow!(
        "no unused request id was found after {REQUEST_ID_ATTEMPTS} attempts"
    )))
}
