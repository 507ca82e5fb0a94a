use crate::{record::serialize_alert_time, AlertRecord, Error};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// File name of exported alert tables.
pub const EXPORT_FILE_NAME: &str = "Notification_Table_Data.csv";

/// Header row of the alerts table, in column order of `TableRow`.
const TABLE_HEADERS: [&str; 13] = [
    "ACTIVE WELL - STAGE",
    "ALERT_TIME",
    "ELAPSED_TIME(Tn-T0) in Min",
    "FLUID_VOLUME",
    "SAND",
    "SAND_CONC",
    "SLURRY_RATE_THRESHOLD",
    "WH_PRESSURE_INCREASE_THRESHOLD",
    "TOTAL_SAND_THRESHOLD",
    "WH_SAND_CONC_THRESHOLD",
    "SLURRY_RATE_INCREASE_THRESHOLD",
    "DETECTED_SLURRY_RATE",
    "DETECTED_WH_PRESSURE",
];

/// TableRow is the operator-facing projection of an AlertRecord.
#[derive(Debug, Serialize)]
pub struct TableRow<'r> {
    pub row: usize,
    #[serde(rename = "ACTIVE WELL - STAGE")]
    pub well_stage: &'r str,
    #[serde(rename = "ALERT_TIME", serialize_with = "serialize_alert_time")]
    pub alert_time: NaiveDateTime,
    #[serde(rename = "ELAPSED_TIME(Tn-T0) in Min")]
    pub elapsed_minutes: Option<f64>,
    #[serde(rename = "FLUID_VOLUME")]
    pub fluid_volume: Option<f64>,
    #[serde(rename = "SAND")]
    pub sand: Option<f64>,
    #[serde(rename = "SAND_CONC")]
    pub sand_concentration: Option<f64>,
    #[serde(rename = "SLURRY_RATE_THRESHOLD")]
    pub slurry_rate_threshold: Option<f64>,
    #[serde(rename = "WH_PRESSURE_INCREASE_THRESHOLD")]
    pub wh_pressure_increase_threshold: Option<f64>,
    #[serde(rename = "TOTAL_SAND_THRESHOLD")]
    pub total_sand_threshold: Option<f64>,
    #[serde(rename = "WH_SAND_CONC_THRESHOLD")]
    pub wh_sand_conc_threshold: Option<f64>,
    #[serde(rename = "SLURRY_RATE_INCREASE_THRESHOLD")]
    pub slurry_rate_increase_threshold: Option<f64>,
    #[serde(rename = "DETECTED_SLURRY_RATE")]
    pub detected_slurry_rate: Option<f64>,
    #[serde(rename = "DETECTED_WH_PRESSURE")]
    pub detected_wh_pressure: Option<f64>,
}

impl<'r> From<&'r AlertRecord> for TableRow<'r> {
    fn from(r: &'r AlertRecord) -> Self {
        Self {
            row: r.row,
            well_stage: &r.well_stage,
            alert_time: r.alert_time,
            elapsed_minutes: r.elapsed_minutes,
            fluid_volume: r.fluid_volume,
            sand: r.sand,
            sand_concentration: r.sand_concentration,
            slurry_rate_threshold: r.slurry_rate_threshold,
            wh_pressure_increase_threshold: r.wh_pressure_increase_threshold,
            total_sand_threshold: r.total_sand_threshold,
            wh_sand_conc_threshold: r.wh_sand_conc_threshold,
            slurry_rate_increase_threshold: r.slurry_rate_increase_threshold,
            detected_slurry_rate: r.detected_slurry_rate,
            detected_wh_pressure: r.detected_wh_pressure,
        }
    }
}

/// Sortable columns of the alerts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableColumn {
    WellStage,
    AlertTime,
    ElapsedMinutes,
    FluidVolume,
    Sand,
    SandConcentration,
    DetectedSlurryRate,
    DetectedWhPressure,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl TableColumn {
    fn measurement(self, r: &AlertRecord) -> Option<f64> {
        match self {
            TableColumn::ElapsedMinutes => r.elapsed_minutes,
            TableColumn::FluidVolume => r.fluid_volume,
            TableColumn::Sand => r.sand,
            TableColumn::SandConcentration => r.sand_concentration,
            TableColumn::DetectedSlurryRate => r.detected_slurry_rate,
            TableColumn::DetectedWhPressure => r.detected_wh_pressure,
            TableColumn::WellStage | TableColumn::AlertTime => None,
        }
    }

    fn compare(self, l: &AlertRecord, r: &AlertRecord, direction: SortDirection) -> Ordering {
        let directed = |ord: Ordering| match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        match self {
            TableColumn::WellStage => directed(l.well_stage.cmp(&r.well_stage)),
            TableColumn::AlertTime => directed(l.alert_time.cmp(&r.alert_time)),
            // Empty cells sort last in either direction.
            _ => match (self.measurement(l), self.measurement(r)) {
                (Some(l), Some(r)) => directed(l.total_cmp(&r)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl std::str::FromStr for TableColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "well_stage" => TableColumn::WellStage,
            "alert_time" => TableColumn::AlertTime,
            "elapsed_minutes" => TableColumn::ElapsedMinutes,
            "fluid_volume" => TableColumn::FluidVolume,
            "sand" => TableColumn::Sand,
            "sand_concentration" => TableColumn::SandConcentration,
            "detected_slurry_rate" => TableColumn::DetectedSlurryRate,
            "detected_wh_pressure" => TableColumn::DetectedWhPressure,
            _ => return Err(format!("{s:?} is not a sortable column")),
        })
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(format!("{s:?} is not a sort direction (asc or desc)")),
        }
    }
}

/// Sort table `rows` by `column`. The sort is stable, so rows which compare
/// equal retain their relative order.
pub fn sort(rows: &mut [&AlertRecord], column: TableColumn, direction: SortDirection) {
    rows.sort_by(|l, r| column.compare(l, r, direction));
}

/// Export the displayed table `rows` as CSV into directory `dir`,
/// returning the path of the written file.
#[tracing::instrument(err, skip(rows), fields(rows = rows.len()))]
pub fn export_csv(rows: &[&AlertRecord], dir: &Path) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(dir).map_err(|source| Error::ExportDir {
        path: dir.to_owned(),
        source,
    })?;
    let path = dir.join(EXPORT_FILE_NAME);

    let export_err = |source: csv::Error| Error::Export {
        path: path.clone(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(export_err)?;

    writer.write_record(TABLE_HEADERS).map_err(export_err)?;
    for row in rows {
        let row = TableRow::from(*row);

        // The `row` index is an in-memory selection handle, and isn't exported.
        writer
            .serialize((
                row.well_stage,
                row.alert_time.format(crate::ALERT_TIME_FORMAT).to_string(),
                row.elapsed_minutes,
                row.fluid_volume,
                row.sand,
                row.sand_concentration,
                row.slurry_rate_threshold,
                row.wh_pressure_increase_threshold,
                row.total_sand_threshold,
                row.wh_sand_conc_threshold,
                row.slurry_rate_increase_threshold,
                row.detected_slurry_rate,
                row.detected_wh_pressure,
            ))
            .map_err(export_err)?;
    }
    writer.flush().map_err(|err| export_err(err.into()))?;

    tracing::info!(?path, "exported alerts table");
    Ok(path)
}
