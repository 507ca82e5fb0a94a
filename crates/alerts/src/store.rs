use crate::record::{RawAlert, REQUIRED_COLUMNS};
use crate::{AlertRecord, Error};
use chrono::NaiveDateTime;
use std::path::Path;

/// AlertStore is the immutable, in-memory table of alerts.
/// It's loaded once at startup and shared read-only thereafter.
#[derive(Debug, Default, Clone)]
pub struct AlertStore {
    records: Vec<AlertRecord>,
}

impl AlertStore {
    /// Load the alerts CSV export at `path`.
    #[tracing::instrument(err, level = "debug")]
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path).map_err(|source| Error::Open {
            path: path.to_owned(),
            source,
        })?;
        let store = Self::from_reader(std::io::BufReader::new(file))?;

        tracing::info!(?path, alerts = store.len(), "loaded alerts");
        Ok(store)
    }

    /// Read alerts from a CSV document having a header row.
    pub fn from_reader<R: std::io::Read>(r: R) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(r);

        let headers = reader
            .headers()
            .map_err(|source| Error::Malformed { row: 0, source })?;
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(Error::MissingColumn(column));
            }
        }

        let mut records = Vec::new();
        for (row, raw) in reader.deserialize::<RawAlert>().enumerate() {
            let raw = raw.map_err(|source| Error::Malformed {
                row: row + 1,
                source,
            })?;
            records.push(raw.into_record(row)?);
        }

        Ok(Self { records })
    }

    /// All records, in file order.
    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    /// Fetch the record of the given data row.
    pub fn get(&self, row: usize) -> Option<&AlertRecord> {
        self.records.get(row)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Alert time of the last record in file order, which the export
    /// appends to as new alerts fire.
    pub fn last_updated(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.alert_time)
    }
}
