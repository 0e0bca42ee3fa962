//! Bounded-batch engine for catalogs too large to materialize

use std::time::Instant;

use shelfsync_common::Result;
use tracing::{debug, info};

use super::bulk::select_unmatched;
use super::source::{ColumnLayout, TabularSource};
use super::{CatalogColumns, CatalogId, InventoryKeySet, SetDifferenceEngine};

/// Reads the catalog `chunk_size` rows at a time, appending each batch's
/// unmatched identifiers to the result
#[derive(Debug, Clone, Copy)]
pub struct ChunkedEngine {
    chunk_size: usize,
}

impl ChunkedEngine {
    /// A zero chunk size is raised to one row per batch
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl SetDifferenceEngine for ChunkedEngine {
    fn name(&self) -> &'static str {
        "chunked"
    }

    fn unmatched_ids(
        &self,
        keys: &InventoryKeySet,
        catalog: &mut dyn TabularSource,
        layout: &ColumnLayout,
    ) -> Result<Vec<CatalogId>> {
        let start = Instant::now();
        let columns = CatalogColumns::resolve(catalog, layout)?;

        let mut unique_ids = Vec::new();
        let mut batches = 0usize;
        let mut catalog_rows = 0usize;
        loop {
            let batch = catalog.read_batch(self.chunk_size)?;
            if batch.is_empty() {
                break;
            }
            batches += 1;
            catalog_rows += batch.len();

            let batch_ids = select_unmatched(keys, &batch, columns)?;
            debug!(batch = batches, rows = batch.len(), unique = batch_ids.len(), "Batch compared");
            unique_ids.extend(batch_ids);
        }

        info!(
            engine = self.name(),
            chunk_size = self.chunk_size,
            batches,
            catalog_rows,
            unique = unique_ids.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Comparison completed"
        );
        Ok(unique_ids)
    }
}
