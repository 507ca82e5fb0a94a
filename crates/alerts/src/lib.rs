//! The alerts crate holds the read-only table of screenout alerts which is
//! loaded once from a CSV export, along with every read view derived from it:
//! aggregates, summary cards, trend series, filtering, sorting, and export.

mod filter;
mod record;
mod store;
mod table;
mod views;

pub use filter::{filter, AlertFilter, Selection};
pub use record::{AlertRecord, ALERT_TIME_FORMAT};
pub use store::AlertStore;
pub use table::{export_csv, sort, SortDirection, TableColumn, TableRow, EXPORT_FILE_NAME};
pub use views::{
    counts_by_alert_type, counts_by_date, counts_by_well, distinct_stages, distinct_wells,
    trend, ConvertedTasks, DateCount, LabelCount, SummaryCards, TrendPoint,
};

/// Alert type of screenout alerts, which are the ones converted into tasks.
pub const SCREEN_OUT: &str = "Screen Out";
/// Alert type of offset-pressure alerts.
pub const OFFSET: &str = "Offset";
/// Alert type of cost communication alerts.
pub const COST_COMMUNICATION: &str = "Cost Communication";

/// Error is the failure to load or export an alerts table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open alerts file {path}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("alerts file is missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("malformed alert at data row {row}")]
    Malformed {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error(
        "alert at data row {row} has ALERT_TIME {value:?}, which doesn't match {:?}",
        ALERT_TIME_FORMAT
    )]
    AlertTime {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("failed to write export {path}")]
    Export {
        path: std::path::PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to create export directory {path}")]
    ExportDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
