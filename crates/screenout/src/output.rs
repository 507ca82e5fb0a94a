use alerts::{LabelCount, TableRow};
use conversion::ConversionResult;
use serde::Serialize;
use std::io::{self, Write};

#[derive(clap::Args, Clone, Debug, Default)]
pub struct Output {
    /// How to format CLI output
    #[clap(global = true, short, long, value_enum)]
    pub output: Option<OutputType>,
}

impl Output {
    pub fn output_type(&self) -> OutputType {
        self.output.unwrap_or(OutputType::Table)
    }
}

#[derive(clap::ValueEnum, Debug, Copy, Clone, PartialEq)]
pub enum OutputType {
    /// Format output as compact JSON with items separated by newlines
    Json,
    /// Format output as YAML
    Yaml,
    /// Format the output as a pretty-printed table
    Table,
}

/// A thing that can be output from the CLI as a table row.
/// JSON and YAML output are handled by `Serialize`.
pub trait CliOutput {
    /// The type output from `into_table_row`.
    type CellValue: Into<comfy_table::Cell>;

    /// Returns the column headers of the table.
    fn table_headers() -> Vec<&'static str>;

    /// Converts this item into a tabular representation. The returned cells must be in the
    /// same order as the `table_headers`.
    fn into_table_row(self) -> Vec<Self::CellValue>;
}

pub fn print_yaml(value: &impl Serialize) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_yaml::to_writer(&mut stdout, value)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

pub fn print_table<T: CliOutput>(items: impl IntoIterator<Item = T>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    let table = build_table(items);

    for line in table.lines() {
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

fn build_table<T: CliOutput>(items: impl IntoIterator<Item = T>) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .apply_modifier(comfy_table::modifiers::UTF8_SOLID_INNER_BORDERS);
    table.set_header(T::table_headers());

    for item in items {
        table.add_row(item.into_table_row());
    }
    table
}

fn measurement(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CliOutput for TableRow<'_> {
    type CellValue = String;

    fn table_headers() -> Vec<&'static str> {
        vec![
            "Row",
            "Well - Stage",
            "Alert Time",
            "Elapsed (min)",
            "Fluid Volume",
            "Sand",
            "Sand Conc.",
            "Slurry Rate",
            "WH Pressure",
        ]
    }

    fn into_table_row(self) -> Vec<Self::CellValue> {
        vec![
            self.row.to_string(),
            self.well_stage.to_string(),
            self.alert_time.format(alerts::ALERT_TIME_FORMAT).to_string(),
            measurement(self.elapsed_minutes),
            measurement(self.fluid_volume),
            measurement(self.sand),
            measurement(self.sand_concentration),
            measurement(self.detected_slurry_rate),
            measurement(self.detected_wh_pressure),
        ]
    }
}

impl CliOutput for LabelCount {
    type CellValue = String;

    fn table_headers() -> Vec<&'static str> {
        vec!["Well", "Alerts"]
    }

    fn into_table_row(self) -> Vec<Self::CellValue> {
        vec![self.label, self.count.to_string()]
    }
}

/// A named figure of the alerts summary.
pub struct Card {
    pub name: &'static str,
    pub value: Option<String>,
}

impl CliOutput for Card {
    type CellValue = String;

    fn table_headers() -> Vec<&'static str> {
        vec!["", ""]
    }

    fn into_table_row(self) -> Vec<Self::CellValue> {
        vec![self.name.to_string(), self.value.unwrap_or_else(|| "-".to_string())]
    }
}

/// The outcome of converting one selected row.
pub struct RowOutcome {
    row: usize,
    well_stage: String,
    outcome: &'static str,
    detail: String,
}

impl RowOutcome {
    /// Flatten a ConversionResult into one outcome per selected row.
    pub fn from_result(result: ConversionResult) -> Vec<Self> {
        let ConversionResult {
            converted,
            failed,
            not_attempted,
            aborted: _,
        } = result;

        let converted = converted.into_iter().map(|c| RowOutcome {
            row: c.row,
            well_stage: c.well_stage,
            outcome: "created",
            detail: format!("{} ({})", c.subject, c.request_id),
        });
        let failed = failed.into_iter().map(|f| RowOutcome {
            row: f.row,
            well_stage: f.well_stage,
            outcome: "failed",
            detail: f.reason,
        });
        let not_attempted = not_attempted.into_iter().map(|row| RowOutcome {
            row,
            well_stage: String::new(),
            outcome: "not attempted",
            detail: String::new(),
        });

        let mut outcomes: Vec<_> = converted.chain(failed).chain(not_attempted).collect();
        outcomes.sort_by_key(|o| o.row);
        outcomes
    }
}

impl CliOutput for RowOutcome {
    type CellValue = String;

    fn table_headers() -> Vec<&'static str> {
        vec!["Row", "Well - Stage", "Outcome", "Detail"]
    }

    fn into_table_row(self) -> Vec<Self::CellValue> {
        vec![
            self.row.to_string(),
            self.well_stage,
            self.outcome.to_string(),
            self.detail,
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use conversion::{ConvertedRow, FailedRow};

    #[test]
    fn test_row_outcomes() {
        let result = ConversionResult {
            converted: vec![ConvertedRow {
                row: 4,
                well_stage: "W1 - S1".to_string(),
                subject: "Murphy Screenout Alert - W1 - S1".to_string(),
                event_id: Default::default(),
                process_id: Default::default(),
                request_id: "MA0042".to_string(),
            }],
            failed: vec![FailedRow {
                row: 0,
                well_stage: "W2 - S2".to_string(),
                reason: "inserting into task_events: refused".to_string(),
            }],
            not_attempted: vec![7],
            aborted: Some("task database is unreachable".to_string()),
        };

        let table = build_table(RowOutcome::from_result(result));
        let lines: Vec<_> = table.lines().collect();
        let line = |needle: &str| {
            lines
                .iter()
                .position(|l| l.contains(needle))
                .unwrap_or_else(|| panic!("no line contains {needle:?}"))
        };

        // Outcomes are ordered by row.
        assert!(line("failed") < line("created"));
        assert!(line("created") < line("not attempted"));
        assert_eq!(line("W2 - S2"), line("failed"));
        assert_eq!(line("(MA0042)"), line("created"));
    }
}
