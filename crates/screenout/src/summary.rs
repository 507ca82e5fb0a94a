use crate::output::Card;
use alerts::{
    AlertRecord, AlertStore, ConvertedTasks, DateCount, LabelCount, SummaryCards, TrendPoint,
    ALERT_TIME_FORMAT,
};
use serde::Serialize;

/// Summary is the dashboard overview of the alerts.
/// Headline cards cover every alert, while charts cover the selected alerts.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub cards: SummaryCards,
    pub alerts_by_well: Vec<LabelCount>,
    pub alerts_by_date: Vec<DateCount>,
    pub alerts_by_type: Vec<LabelCount>,
    pub trend: Vec<TrendPoint>,
    /// Wells which may be selected.
    pub wells: Vec<String>,
    /// Stages which may be selected, if filtering by stage is enabled.
    pub stages: Option<Vec<String>>,
    /// Alert time of the most recent alert of the file.
    pub last_updated: Option<String>,
}

impl Summary {
    /// Summarize `rows`, which were selected from `store`.
    /// Cards and the selectable wells and stages are drawn from the entire store.
    pub fn compute(
        store: &AlertStore,
        rows: &[&AlertRecord],
        converted: Option<ConvertedTasks>,
        stage_filter: bool,
    ) -> Self {
        let selected = || rows.iter().copied();

        Self {
            cards: SummaryCards::compute(store.records(), converted),
            alerts_by_well: alerts::counts_by_well(selected()),
            alerts_by_date: alerts::counts_by_date(selected()),
            alerts_by_type: alerts::counts_by_alert_type(selected()),
            trend: alerts::trend(selected()),
            wells: alerts::distinct_wells(store.records()),
            stages: stage_filter.then(|| alerts::distinct_stages(store.records())),
            last_updated: store
                .last_updated()
                .map(|at| at.format(ALERT_TIME_FORMAT).to_string()),
        }
    }

    /// Headline figures, for table output.
    pub fn cards(&self) -> Vec<Card> {
        let cards = &self.cards;
        let percent = |pct: Option<f64>| pct.map(|pct| format!("{pct}%"));

        vec![
            Card {
                name: "Screenout alerts",
                value: Some(cards.screenout_alerts.to_string()),
            },
            Card {
                name: "Offset alerts",
                value: Some(cards.offset_alerts.to_string()),
            },
            Card {
                name: "Cost communication alerts",
                value: Some(cards.cost_communication_alerts.to_string()),
            },
            Card {
                name: "Open alerts",
                value: Some(cards.open_alerts.to_string()),
            },
            Card {
                name: "New alerts",
                value: cards.new_alerts.map(|n| n.to_string()),
            },
            Card {
                name: "Change",
                value: percent(cards.change_percentage),
            },
            Card {
                name: "Converted tasks",
                value: cards.converted.map(|c| c.total.to_string()),
            },
            Card {
                name: "Converted today",
                value: cards.converted.map(|c| c.today.to_string()),
            },
            Card {
                name: "Converted today (share)",
                value: percent(cards.converted_today_percentage),
            },
            Card {
                name: "Last updated",
                value: self.last_updated.clone(),
            },
        ]
    }
}
