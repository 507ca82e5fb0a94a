use crate::Error;
use alerts::{AlertFilter, AlertRecord, AlertStore, Selection, SortDirection, TableColumn};
use serde::{Deserialize, Serialize};

/// FilterQuery selects alerts of a well and stage.
/// Omitted or placeholder values select every well or stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args, Serialize, Deserialize)]
pub struct FilterQuery {
    /// Show only alerts of this well.
    #[clap(long)]
    #[serde(default)]
    pub well: Option<String>,
    /// Show only alerts of this stage. Requires --stage-filter.
    #[clap(long)]
    #[serde(default)]
    pub stage: Option<String>,
}

impl FilterQuery {
    /// Build the AlertFilter of this query. A stage selection is an error
    /// unless filtering by stage is enabled.
    pub fn to_filter(&self, stage_filter: bool) -> Result<AlertFilter, Error> {
        let well = Selection::from(self.well.clone());
        let stage = Selection::from(self.stage.clone());

        match stage {
            Selection::Only(stage) if !stage_filter => Err(Error::StageFilterDisabled(stage)),
            stage => Ok(AlertFilter { well, stage }),
        }
    }
}

/// TableQuery selects and orders rows of the alerts table.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args, Serialize, Deserialize)]
pub struct TableQuery {
    #[clap(flatten)]
    #[serde(flatten)]
    pub filter: FilterQuery,
    /// Column to sort rows by. Rows are in file order otherwise.
    #[clap(long)]
    #[serde(default)]
    pub sort: Option<TableColumn>,
    /// Direction of the sort: asc or desc.
    #[clap(long)]
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

impl TableQuery {
    /// Select the rows of `store` matched by this query, in display order.
    pub fn select<'s>(
        &self,
        store: &'s AlertStore,
        stage_filter: bool,
    ) -> Result<Vec<&'s AlertRecord>, Error> {
        let filter = self.filter.to_filter(stage_filter)?;
        let mut rows = alerts::filter(store.records(), &filter);

        if let Some(column) = self.sort {
            alerts::sort(&mut rows, column, self.direction.unwrap_or_default());
        }
        Ok(rows)
    }
}
