use crate::App;
use alerts::AlertStore;
use anyhow::Context;
use conversion::store::{MemoryTaskStore, PgTaskStore};
use conversion::{TaskSettings, TaskStore};
use derivative::Derivative;
use std::path::PathBuf;
use std::sync::Arc;

/// Config locates the alerts file and the task database, and sets
/// the metadata of tasks created from alerts.
#[derive(Derivative, Clone, clap::Args)]
#[derivative(Debug)]
pub struct Config {
    /// Path to the CSV export of screenout alerts.
    #[clap(
        long = "alerts",
        env = "ALERTS_CSV",
        default_value = "data/Screenout_Python_Data.csv",
        global = true
    )]
    pub alerts_csv: PathBuf,
    /// URL of the postgres task database.
    /// Alerts can't be converted into tasks without it.
    #[derivative(Debug = "ignore")]
    #[clap(long = "database", env = "DATABASE_URL", global = true)]
    pub database_url: Option<url::Url>,
    /// Path to CA certificate of the database.
    #[clap(long = "database-ca", env = "DATABASE_CA", global = true)]
    pub database_ca: Option<String>,
    /// Directory into which alert tables are exported.
    /// Defaults to the user's download directory.
    #[clap(long = "export-dir", env = "EXPORT_DIR", global = true)]
    pub export_dir: Option<PathBuf>,
    /// Allow alerts to be filtered by stage.
    #[clap(long = "stage-filter", env = "STAGE_FILTER", global = true)]
    pub stage_filter: bool,
    /// User id of the requester and owner of created tasks.
    #[clap(long = "task-user-id", env = "TASK_USER_ID", global = true)]
    pub task_user_id: Option<String>,
    /// Display name of the requester.
    #[clap(long = "task-user-name", env = "TASK_USER_NAME", global = true)]
    pub task_user_name: Option<String>,
    /// Email address of the requester.
    #[clap(long = "task-user-email", env = "TASK_USER_EMAIL", global = true)]
    pub task_user_email: Option<String>,
}

impl Config {
    pub fn task_settings(&self) -> TaskSettings {
        let mut settings = TaskSettings::default();

        if let Some(user_id) = &self.task_user_id {
            settings.user_id = user_id.clone();
        }
        if let Some(user_name) = &self.task_user_name {
            settings.user_name = user_name.clone();
        }
        if let Some(user_email) = &self.task_user_email {
            settings.user_email = user_email.clone();
        }
        settings
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Build a PgTaskStore for the configured database, if there is one.
    /// Connections are established on first use, so an unreachable database
    /// fails conversions rather than startup.
    pub fn task_store(&self) -> anyhow::Result<Option<PgTaskStore>> {
        let Some(database_url) = &self.database_url else {
            return Ok(None);
        };

        let mut pg_options = database_url
            .as_str()
            .parse::<sqlx::postgres::PgConnectOptions>()
            .context("parsing database URL")?
            .application_name("screenout");

        // If a database CA was provided, require that we use TLS with full cert verification.
        if let Some(ca) = &self.database_ca {
            pg_options = pg_options
                .ssl_mode(sqlx::postgres::PgSslMode::VerifyFull)
                .ssl_root_cert(ca);
        } else {
            // Otherwise, prefer TLS but don't require it.
            pg_options = pg_options.ssl_mode(sqlx::postgres::PgSslMode::Prefer);
        }

        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy_with(pg_options);

        Ok(Some(PgTaskStore::new(pool)))
    }

    /// Load the alerts file and assemble the App.
    /// A `dry_run` App converts alerts into an in-memory store.
    pub fn load_app(&self, dry_run: bool) -> anyhow::Result<App> {
        let alerts = AlertStore::load(&self.alerts_csv).context("loading alerts")?;

        let tasks: Option<Arc<dyn TaskStore>> = if dry_run {
            Some(Arc::new(MemoryTaskStore::new()))
        } else {
            match self.task_store()? {
                Some(store) => Some(Arc::new(store)),
                None => None,
            }
        };
        if tasks.is_none() {
            tracing::warn!("no task database is configured; alerts can't be converted");
        }

        Ok(App {
            alerts,
            tasks,
            settings: self.task_settings(),
            export_dir: self.export_dir(),
            stage_filter: self.stage_filter,
        })
    }
}
