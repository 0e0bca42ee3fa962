//! Row-at-a-time engine

use std::time::Instant;

use shelfsync_common::{normalize, Result};
use tracing::info;

use super::source::{cell, ColumnLayout, TabularSource};
use super::{CatalogColumns, CatalogId, InventoryKeySet, SetDifferenceEngine};

/// Tests each catalog row individually against the key set
#[derive(Debug, Clone, Copy, Default)]
pub struct RowWiseEngine;

impl SetDifferenceEngine for RowWiseEngine {
    fn name(&self) -> &'static str {
        "row_wise"
    }

    fn unmatched_ids(
        &self,
        keys: &InventoryKeySet,
        catalog: &mut dyn TabularSource,
        layout: &ColumnLayout,
    ) -> Result<Vec<CatalogId>> {
        let start = Instant::now();
        let columns = CatalogColumns::resolve(catalog, layout)?;
        let rows = catalog.read_all()?;

        let mut unique_ids = Vec::new();
        for row in &rows {
            let name = normalize(cell(row, columns.name));
            if !keys.contains(&name) {
                unique_ids.push(columns.id_of(row)?);
            }
        }

        info!(
            engine = self.name(),
            catalog_rows = rows.len(),
            unique = unique_ids.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Comparison completed"
        );
        Ok(unique_ids)
    }
}
