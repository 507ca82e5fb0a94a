use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Fixed format of the ALERT_TIME column, as day-month-year hour:minute.
pub const ALERT_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

/// AlertRecord is a single sensor alert, as exported by the drilling
/// monitoring system. Records are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    /// Zero-based index of this record's data row within the loaded file.
    /// It's the identifier by which operators select alerts.
    pub row: usize,
    pub well: String,
    pub stage: String,
    /// Composite `{well} - {stage}` key, used as the human-readable task subject.
    pub well_stage: String,
    pub alert_type: String,
    #[serde(serialize_with = "serialize_alert_time")]
    pub alert_time: NaiveDateTime,
    pub elapsed_minutes: Option<f64>,
    pub fluid_volume: Option<f64>,
    pub sand: Option<f64>,
    pub sand_concentration: Option<f64>,
    pub slurry_rate_threshold: Option<f64>,
    pub wh_pressure_increase_threshold: Option<f64>,
    pub total_sand_threshold: Option<f64>,
    pub wh_sand_conc_threshold: Option<f64>,
    pub slurry_rate_increase_threshold: Option<f64>,
    pub detected_slurry_rate: Option<f64>,
    pub detected_wh_pressure: Option<f64>,
}

impl AlertRecord {
    /// Returns the composite key of a well and stage.
    pub fn well_stage_key(well: &str, stage: &str) -> String {
        format!("{well} - {stage}")
    }

    /// Calendar date on which the alert fired.
    pub fn date(&self) -> NaiveDate {
        self.alert_time.date()
    }

    /// Time of day at which the alert fired.
    pub fn time_of_day(&self) -> NaiveTime {
        self.alert_time.time()
    }

    pub fn is_type(&self, alert_type: &str) -> bool {
        self.alert_type == alert_type
    }
}

pub(crate) fn serialize_alert_time<S>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.collect_str(&t.format(ALERT_TIME_FORMAT))
}

/// RawAlert is the subset of CSV columns which we understand.
/// Other columns of the export are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct RawAlert {
    #[serde(rename = "ACTIVE_WELL")]
    pub well: String,
    #[serde(rename = "STAGE")]
    pub stage: String,
    #[serde(rename = "ALERT_TYPE")]
    pub alert_type: String,
    #[serde(rename = "ALERT_TIME")]
    pub alert_time: String,
    #[serde(rename = "ELAPSED_TIME(Tn-T0) in Min", default)]
    pub elapsed_minutes: Option<f64>,
    #[serde(rename = "FLUID_VOLUME", default)]
    pub fluid_volume: Option<f64>,
    #[serde(rename = "SAND", default)]
    pub sand: Option<f64>,
    #[serde(rename = "SAND_CONC", default)]
    pub sand_concentration: Option<f64>,
    #[serde(rename = "SLURRY_RATE_THRESHOLD", default)]
    pub slurry_rate_threshold: Option<f64>,
    #[serde(rename = "WH_PRESSURE_INCREASE_THRESHOLD", default)]
    pub wh_pressure_increase_threshold: Option<f64>,
    #[serde(rename = "TOTAL_SAND_THRESHOLD", default)]
    pub total_sand_threshold: Option<f64>,
    #[serde(rename = "WH_SAND_CONC_THRESHOLD", default)]
    pub wh_sand_conc_threshold: Option<f64>,
    #[serde(rename = "SLURRY_RATE_INCREASE_THRESHOLD", default)]
    pub slurry_rate_increase_threshold: Option<f64>,
    #[serde(rename = "DETECTED_SLURRY_RATE", default)]
    pub detected_slurry_rate: Option<f64>,
    #[serde(rename = "DETECTED_WH_PRESSURE", default)]
    pub detected_wh_pressure: Option<f64>,
}

/// Columns which every alerts export must carry.
pub(crate) const REQUIRED_COLUMNS: [&str; 4] = ["ACTIVE_WELL", "STAGE", "ALERT_TYPE", "ALERT_TIME"];

impl RawAlert {
    pub(crate) fn into_record(self, row: usize) -> Result<AlertRecord, crate::Error> {
        let alert_time = NaiveDateTime::parse_from_str(self.alert_time.trim(), ALERT_TIME_FORMAT)
            .map_err(|source| crate::Error::AlertTime {
                row: row + 1,
                value: self.alert_time.clone(),
                source,
            })?;

        Ok(AlertRecord {
            row,
            well_stage: AlertRecord::well_stage_key(&self.well, &self.stage),
            well: self.well,
            stage: self.stage,
            alert_type: self.alert_type,
            alert_time,
            elapsed_minutes: self.elapsed_minutes,
            fluid_volume: self.fluid_volume,
            sand: self.sand,
            sand_concentration: self.sand_concentration,
            slurry_rate_threshold: self.slurry_rate_threshold,
            wh_pressure_increase_threshold: self.wh_pressure_increase_threshold,
            total_sand_threshold: self.total_sand_threshold,
            wh_sand_conc_threshold: self.wh_sand_conc_threshold,
            slurry_rate_increase_threshold: self.slurry_rate_increase_threshold,
            detected_slurry_rate: self.detected_slurry_rate,
            detected_wh_pressure: self.detected_wh_pressure,
        })
    }
}
