use alerts::{AlertRecord, AlertStore, TableRow};
use anyhow::Context;
use chrono::Utc;
use conversion::{ConversionRequest, ConversionResult, ConvertError, Converter, TaskSettings, TaskStore};
use futures::FutureExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod api;
mod config;
mod output;
mod query;
mod summary;

pub use config::Config;
pub use output::{Output, OutputType};
pub use query::{FilterQuery, TableQuery};
pub use summary::Summary;

/// Error is a failure of a dashboard action which is reported to the operator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("filtering by stage is disabled, but stage {0:?} was selected")]
    StageFilterDisabled(String),
    #[error(transparent)]
    Validation(#[from] conversion::ValidationError),
    #[error("task database is not configured")]
    TasksNotConfigured,
    #[error("task database is unreachable: {0:#}")]
    TasksUnreachable(anyhow::Error),
    #[error(transparent)]
    Export(#[from] alerts::Error),
}

/// App is the alerts dashboard: a loaded table of alerts, and the task
/// database into which they're converted.
pub struct App {
    pub alerts: AlertStore,
    /// Task database, or None if alerts can't be converted.
    pub tasks: Option<Arc<dyn TaskStore>>,
    pub settings: TaskSettings,
    pub export_dir: PathBuf,
    pub stage_filter: bool,
}

impl App {
    /// Rows of the alerts table selected by `query`, in display order.
    pub fn table(&self, query: &TableQuery) -> Result<Vec<&AlertRecord>, Error> {
        query.select(&self.alerts, self.stage_filter)
    }

    /// Summarize the alerts selected by `query`. Converted-task figures are
    /// omitted if the task database isn't available.
    pub async fn summary(&self, query: &FilterQuery) -> Result<Summary, Error> {
        let filter = query.to_filter(self.stage_filter)?;
        let rows = alerts::filter(self.alerts.records(), &filter);

        let converted = match &self.tasks {
            None => None,
            Some(tasks) => match tasks
                .converted_tasks(&self.settings.task_name, Utc::now())
                .await
            {
                Ok(converted) => Some(converted),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to count converted tasks");
                    None
                }
            },
        };

        Ok(Summary::compute(
            &self.alerts,
            &rows,
            converted,
            self.stage_filter,
        ))
    }

    /// Export the rows selected by `query` into `dir`, or the configured export directory.
    pub fn export(&self, query: &TableQuery, dir: Option<&Path>) -> Result<PathBuf, Error> {
        let rows = self.table(query)?;
        let dir = dir.unwrap_or(&self.export_dir);

        Ok(alerts::export_csv(&rows, dir)?)
    }

    /// Convert the selected alert rows into tasks.
    pub async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, Error> {
        let rows = request.resolve(&self.alerts)?;
        let Some(tasks) = &self.tasks else {
            return Err(Error::TasksNotConfigured);
        };

        Converter::new(tasks.clone(), self.settings.clone())
            .convert(&rows)
            .await
            .map_err(|err| match err {
                ConvertError::Validation(err) => Error::Validation(err),
                ConvertError::Connection(err) => Error::TasksUnreachable(err),
            })
    }
}

/// Dashboard of screenout alerts, which converts alerts into tasks of
/// a task-management database.
#[derive(Debug, clap::Parser)]
#[clap(author, about, version)]
pub struct Cli {
    #[clap(flatten)]
    config: Config,

    #[clap(subcommand)]
    cmd: Command,

    #[clap(flatten)]
    output: Output,
}

#[derive(Debug, clap::Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Print summary cards and alert counts.
    Summary(FilterQuery),
    /// Print the alerts table.
    Alerts(TableQuery),
    /// Export the alerts table as CSV.
    Export(Export),
    /// Convert selected alerts into tasks.
    ///
    /// Each selected row becomes one task. Rows are numbered from zero in
    /// the order of the alerts file, as shown by `alerts`. Converting a row
    /// a second time creates a second task.
    Convert(Convert),
    /// Serve the dashboard API.
    Serve(Serve),
}

#[derive(Debug, clap::Args)]
pub struct Export {
    #[clap(flatten)]
    query: TableQuery,
    /// Directory to export into, overriding the configured export directory.
    #[clap(long)]
    dir: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct Convert {
    /// Comma-separated rows to convert.
    #[clap(long, value_delimiter = ',', required = true)]
    rows: Vec<usize>,
    /// Preview the created tasks without writing them to the task database.
    #[clap(long)]
    dry_run: bool,
}

#[derive(Debug, clap::Args)]
pub struct Serve {
    /// The port to listen on for API requests.
    #[clap(long, default_value = "8050", env = "API_PORT")]
    port: u16,
}

impl Cli {
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::debug!(config = ?self.config, "loaded config");
        let dry_run = matches!(&self.cmd, Command::Convert(Convert { dry_run: true, .. }));
        let app = self.config.load_app(dry_run)?;

        match &self.cmd {
            Command::Summary(query) => {
                let summary = app.summary(query).await?;
                match self.output.output_type() {
                    OutputType::Json => output::print_json(&summary),
                    OutputType::Yaml => output::print_yaml(&summary),
                    OutputType::Table => {
                        output::print_table(summary.cards())?;
                        output::print_table(summary.alerts_by_well)
                    }
                }
            }
            Command::Alerts(query) => {
                let rows: Vec<_> = app.table(query)?.into_iter().map(TableRow::from).collect();
                match self.output.output_type() {
                    OutputType::Json => output::print_json(&rows),
                    OutputType::Yaml => output::print_yaml(&rows),
                    OutputType::Table => output::print_table(rows),
                }
            }
            Command::Export(Export { query, dir }) => {
                let path = app.export(query, dir.as_deref())?;
                println!("{}", path.display());
                Ok(())
            }
            Command::Convert(Convert { rows, dry_run }) => {
                let result = app.convert(&ConversionRequest::new(rows.clone())).await?;
                if *dry_run {
                    tracing::info!("dry run: no tasks were written to the task database");
                }
                let failed = !result.is_success();
                let message = result.message();

                match self.output.output_type() {
                    OutputType::Json => output::print_json(&result),
                    OutputType::Yaml => output::print_yaml(&result),
                    OutputType::Table => output::print_table(output::RowOutcome::from_result(result)),
                }?;
                if failed {
                    anyhow::bail!("{message}");
                }
                Ok(())
            }
            Command::Serve(Serve { port }) => serve(app, *port).await,
        }
    }
}

async fn serve(app: App, port: u16) -> anyhow::Result<()> {
    let api_listener = tokio::net::TcpListener::bind(format!("[::]:{port}"))
        .await
        .context("failed to bind server port")?;
    tracing::info!(port, "serving dashboard API");

    // Share-able future which completes when the server should exit.
    let shutdown = tokio::signal::ctrl_c().map(|_| ()).shared();

    axum::serve(api_listener, api::build_router(Arc::new(app)))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_convert_args() {
        let cli = Cli::parse_from(["screenout", "convert", "--rows", "0,3", "--dry-run", "-o", "json"]);

        let Command::Convert(Convert { rows, dry_run }) = &cli.cmd else {
            panic!("expected convert: {cli:?}");
        };
        assert_eq!(rows, &vec![0, 3]);
        assert!(*dry_run);
        assert_eq!(cli.output.output_type(), OutputType::Json);

        assert!(Cli::try_parse_from(["screenout", "convert"]).is_err());
    }

    #[test]
    fn test_alerts_args() {
        let cli = Cli::parse_from([
            "screenout",
            "alerts",
            "--well",
            "W1",
            "--sort",
            "sand",
            "--direction",
            "desc",
        ]);

        let Command::Alerts(query) = &cli.cmd else {
            panic!("expected alerts: {cli:?}");
        };
        assert_eq!(query.filter.well.as_deref(), Some("W1"));
        assert_eq!(query.sort, Some(alerts::TableColumn::Sand));
        assert_eq!(query.direction, Some(alerts::SortDirection::Descending));
        assert_eq!(cli.output.output_type(), OutputType::Table);

        assert!(Cli::try_parse_from(["screenout", "alerts", "--sort", "severity"]).is_err());
    }
}
