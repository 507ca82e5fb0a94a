use crate::{record::serialize_alert_time, AlertRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Count of alerts sharing a label, such as a well or alert type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Count of alerts which fired on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: usize,
}

fn count_labels<'r, I, F>(records: I, label: F) -> Vec<LabelCount>
where
    I: IntoIterator<Item = &'r AlertRecord>,
    F: Fn(&'r AlertRecord) -> &'r str,
{
    let mut counts = BTreeMap::<&str, usize>::new();
    for record in records {
        *counts.entry(label(record)).or_default() += 1;
    }
    let mut counts: Vec<_> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();

    // Largest first. Ties retain the BTreeMap's ordering by label.
    counts.sort_by(|l, r| r.count.cmp(&l.count));
    counts
}

/// Alert counts of each well, largest first.
pub fn counts_by_well<'r>(records: impl IntoIterator<Item = &'r AlertRecord>) -> Vec<LabelCount> {
    count_labels(records, |r| r.well.as_str())
}

/// Alert counts of each alert type, largest first.
pub fn counts_by_alert_type<'r>(
    records: impl IntoIterator<Item = &'r AlertRecord>,
) -> Vec<LabelCount> {
    count_labels(records, |r| r.alert_type.as_str())
}

/// Alert counts of each calendar date, in ascending date order.
pub fn counts_by_date<'r>(records: impl IntoIterator<Item = &'r AlertRecord>) -> Vec<DateCount> {
    let mut counts = BTreeMap::<NaiveDate, usize>::new();
    for record in records {
        *counts.entry(record.date()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect()
}

fn distinct<'r, I, F>(records: I, value: F) -> Vec<String>
where
    I: IntoIterator<Item = &'r AlertRecord>,
    F: Fn(&'r AlertRecord) -> &'r str,
{
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .map(value)
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Distinct wells in first-seen order. These are the options of a well selector.
pub fn distinct_wells<'r>(records: impl IntoIterator<Item = &'r AlertRecord>) -> Vec<String> {
    distinct(records, |r| r.well.as_str())
}

/// Distinct stages in first-seen order. These are the options of a stage selector.
pub fn distinct_stages<'r>(records: impl IntoIterator<Item = &'r AlertRecord>) -> Vec<String> {
    distinct(records, |r| r.stage.as_str())
}

/// TrendPoint is one alert's measurements, scaled so that they share an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(serialize_with = "serialize_alert_time")]
    pub alert_time: NaiveDateTime,
    pub well_stage: String,
    /// Sand mass, in thousands.
    pub sand_thousands: Option<f64>,
    /// Detected wellhead pressure, in hundreds.
    pub wh_pressure_hundreds: Option<f64>,
    /// Fluid volume, in hundreds.
    pub fluid_volume_hundreds: Option<f64>,
    pub detected_slurry_rate: Option<f64>,
}

/// Measurement series of `records` in ascending alert time.
pub fn trend<'r>(records: impl IntoIterator<Item = &'r AlertRecord>) -> Vec<TrendPoint> {
    let mut points: Vec<_> = records
        .into_iter()
        .map(|r| TrendPoint {
            alert_time: r.alert_time,
            well_stage: r.well_stage.clone(),
            sand_thousands: r.sand.map(|v| v / 1000.0),
            wh_pressure_hundreds: r.detected_wh_pressure.map(|v| v / 100.0),
            fluid_volume_hundreds: r.fluid_volume.map(|v| v / 100.0),
            detected_slurry_rate: r.detected_slurry_rate,
        })
        .collect();

    points.sort_by_key(|p| p.alert_time);
    points
}

/// Counts of screenout tasks already present in the task database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConvertedTasks {
    pub total: i64,
    /// Tasks created since the start of the current day.
    pub today: i64,
}

/// SummaryCards are the headline figures of the alerts dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub screenout_alerts: usize,
    pub offset_alerts: usize,
    pub cost_communication_alerts: usize,
    /// Screenout alerts which haven't yet been converted into tasks.
    /// Converted tasks don't record their alert type, so every converted task
    /// is counted against screenouts, and the figure floors at zero.
    pub open_alerts: i64,
    /// Alerts of the most recent date, less those of the date before it.
    pub new_alerts: Option<i64>,
    /// Change of open alerts relative to the previous date's alerts, as a percentage.
    pub change_percentage: Option<f64>,
    /// Converted task counts, if the task database is available.
    pub converted: Option<ConvertedTasks>,
    /// Share of converted tasks which were created today, as a percentage.
    pub converted_today_percentage: Option<f64>,
}

impl SummaryCards {
    pub fn compute<'r>(
        records: impl IntoIterator<Item = &'r AlertRecord> + Clone,
        converted: Option<ConvertedTasks>,
    ) -> Self {
        let count_type = |alert_type: &str| {
            records
                .clone()
                .into_iter()
                .filter(|r| r.is_type(alert_type))
                .count()
        };
        let screenout_alerts = count_type(crate::SCREEN_OUT);
        let offset_alerts = count_type(crate::OFFSET);
        let cost_communication_alerts = count_type(crate::COST_COMMUNICATION);

        let open_alerts =
            (screenout_alerts as i64 - converted.map(|c| c.total).unwrap_or_default()).max(0);

        let by_date = counts_by_date(records);
        let (latest, previous) = match by_date.as_slice() {
            [.., previous, latest] => (Some(latest.count as i64), Some(previous.count as i64)),
            [latest] => (Some(latest.count as i64), None),
            [] => (None, None),
        };

        let new_alerts = latest.zip(previous).map(|(l, p)| l - p);
        let change_percentage = previous.and_then(|p| percentage(open_alerts - p, open_alerts));
        let converted_today_percentage =
            converted.and_then(|c| percentage(c.today, c.total));

        Self {
            screenout_alerts,
            offset_alerts,
            cost_communication_alerts,
            open_alerts,
            new_alerts,
            change_percentage,
            converted,
            converted_today_percentage,
        }
    }
}

/// Returns `numerator / denominator` as a percentage rounded to two places,
/// or None if `denominator` is zero.
fn percentage(numerator: i64, denominator: i64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    let pct = numerator as f64 / denominator as f64 * 100.0;
    Some((pct * 100.0).round() / 100.0)
}
