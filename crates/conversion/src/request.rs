use crate::ValidationError;
use alerts::{AlertRecord, AlertStore};
use serde::{Deserialize, Serialize};

/// ConversionRequest is the set of alert rows which an operator selected
/// for conversion in a single action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub rows: Vec<usize>,
}

impl ConversionRequest {
    pub fn new(rows: Vec<usize>) -> Self {
        Self { rows }
    }

    /// Resolve selected rows into their records, in selection order.
    pub fn resolve<'s>(&self, store: &'s AlertStore) -> Result<Vec<&'s AlertRecord>, ValidationError> {
        if self.rows.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }

        let mut seen = std::collections::HashSet::with_capacity(self.rows.len());
        self.rows
            .iter()
            .map(|&row| {
                if !seen.insert(row) {
                    return Err(ValidationError::DuplicateRow(row));
                }
                store.get(row).ok_or(ValidationError::UnknownRow(row))
            })
            .collect()
    }
}
