use crate::AlertRecord;
use serde::{Deserialize, Serialize};

/// Selection of a single value of a filtered dimension, or of all values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Placeholder values which dashboard selectors submit to mean "everything".
    const ALL_SENTINELS: [&'static str; 4] = ["", "Select All", "Select Well", "Select Stage"];

    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if Self::ALL_SENTINELS.contains(&value) {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(only) => only == value,
        }
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Selection::All,
            Some(value) => Selection::parse(&value),
        }
    }
}

impl From<Selection> for Option<String> {
    fn from(value: Selection) -> Self {
        match value {
            Selection::All => None,
            Selection::Only(value) => Some(value),
        }
    }
}

/// AlertFilter narrows the alerts table to a well and/or stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub well: Selection,
    #[serde(default)]
    pub stage: Selection,
}

impl AlertFilter {
    pub fn well(well: &str) -> Self {
        Self {
            well: Selection::parse(well),
            stage: Selection::All,
        }
    }

    pub fn matches(&self, record: &AlertRecord) -> bool {
        self.well.matches(&record.well) && self.stage.matches(&record.stage)
    }
}

/// Filter `records` to those matching `filter`, preserving their order.
/// Every view of the alerts table narrows records through this function.
pub fn filter<'r, I>(records: I, filter: &AlertFilter) -> Vec<&'r AlertRecord>
where
    I: IntoIterator<Item = &'r AlertRecord>,
{
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::AlertStore;

    const FIXTURE: &str = "\
ACTIVE_WELL,STAGE,ALERT_TYPE,ALERT_TIME
W1,S1,Screen Out,01-01-2022 10:00
W2,S1,Offset,01-01-2022 11:00
W1,S2,Screen Out,02-01-2022 09:30
";

    #[test]
    fn test_sentinels_select_everything() {
        for sentinel in ["", "  ", "Select All", "Select Well", "Select Stage"] {
            assert_eq!(Selection::parse(sentinel), Selection::All);
        }
        assert_eq!(Selection::parse(" W1 "), Selection::Only("W1".to_string()));
    }

    #[test]
    fn test_filter_by_well_and_stage() {
        let store = AlertStore::from_reader(FIXTURE.as_bytes()).unwrap();

        let rows = |f: &AlertFilter| -> Vec<usize> {
            filter(store.records(), f).iter().map(|r| r.row).collect()
        };

        assert_eq!(rows(&AlertFilter::default()), vec![0, 1, 2]);
        assert_eq!(rows(&AlertFilter::well("W1")), vec![0, 2]);
        assert_eq!(rows(&AlertFilter::well("Select All")), vec![0, 1, 2]);
        assert_eq!(
            rows(&AlertFilter {
                well: Selection::Only("W1".to_string()),
                stage: Selection::Only("S2".to_string()),
            }),
            vec![2]
        );
        assert!(rows(&AlertFilter::well("W9")).is_empty());
    }

    #[test]
    fn test_filter_serde() {
        let f: AlertFilter = serde_json::from_str(r#"{"well": "Select Well", "stage": "S1"}"#).unwrap();
        assert_eq!(f.well, Selection::All);
        assert_eq!(f.stage, Selection::Only("S1".to_string()));
    }
}
