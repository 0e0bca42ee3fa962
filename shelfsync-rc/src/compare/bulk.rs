//! Whole-column engine

use std::time::Instant;

use shelfsync_common::{normalize, Result};
use tracing::{debug, info};

use super::source::{cell, ColumnLayout, Row, TabularSource};
use super::{CatalogColumns, CatalogId, InventoryKeySet, SetDifferenceEngine};

/// Materializes the normalized name column, then computes one membership mask
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkEngine;

impl SetDifferenceEngine for BulkEngine {
    fn name(&self) -> &'static str {
        "bulk"
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
        debug!(catalog_rows = rows.len(), "Catalog materialized");

        let unique_ids = select_unmatched(keys, &rows, columns)?;

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

/// Normalize the name column of `rows`, mask names absent from `keys`,
/// and pick the masked identifiers in row order
pub(super) fn select_unmatched(
    keys: &InventoryKeySet,
    rows: &[Row],
    columns: CatalogColumns,
) -> Result<Vec<CatalogId>> {
    let names: Vec<String> = rows
        .iter()
        .map(|row| normalize(cell(row, columns.name)))
        .collect();
    let absent: Vec<bool> = names.iter().map(|name| !keys.contains(name)).collect();

    rows.iter()
        .zip(absent)
        .filter(|(_, absent)| *absent)
        .map(|(row, _)| columns.id_of(row))
        .collect()
}
