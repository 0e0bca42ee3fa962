//! Catalog-vs-inventory comparison
//!
//! Computes the one-directional set difference "catalog entries whose
//! normalized name is absent from the inventory key set", returning the
//! matching catalog identifiers in catalog row order. Duplicate identifiers
//! are not collapsed.
//!
//! The inventory side is always built into an [`InventoryKeySet`] first
//! (O(n)); a [`SetDifferenceEngine`] then scans the catalog (O(m)). Three
//! engines exist and must agree on every input:
//! - [`RowWiseEngine`]: one row at a time, the correctness baseline
//! - [`BulkEngine`]: whole normalized name column, then one membership mask
//! - [`ChunkedEngine`]: the bulk step over bounded catalog batches

mod bulk;
mod cache;
mod chunked;
mod keys;
mod row_wise;
pub mod source;

pub use bulk::BulkEngine;
pub use cache::KeySetCache;
pub use chunked::ChunkedEngine;
pub use keys::InventoryKeySet;
pub use row_wise::RowWiseEngine;
pub use source::{CatalogId, ColumnLayout, CsvSource, MemorySource, Row, TabularSource};

use shelfsync_common::config::ComparisonStrategy;
use shelfsync_common::{Error, Result};

use source::{cell, column_index};

/// One way of scanning the catalog against a built key set
pub trait SetDifferenceEngine: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Identifiers of catalog rows whose normalized name is not in `keys`,
    /// in catalog order
    fn unmatched_ids(
        &self,
        keys: &InventoryKeySet,
        catalog: &mut dyn TabularSource,
        layout: &ColumnLayout,
    ) -> Result<Vec<CatalogId>>;
}

/// Resolved positions of the catalog's required columns
#[derive(Debug, Clone, Copy)]
pub(crate) struct CatalogColumns {
    pub id: usize,
    pub name: usize,
}

impl CatalogColumns {
    pub fn resolve(catalog: &dyn TabularSource, layout: &ColumnLayout) -> Result<Self> {
        Ok(Self {
            id: column_index(catalog, &layout.catalog_id, "catalog")?,
            name: column_index(catalog, &layout.catalog_name, "catalog")?,
        })
    }

    /// Identifier of `row`: the source-typed id if present, else the
    /// identifier cell. A missing identifier is malformed input.
    pub fn id_of(&self, row: &Row) -> Result<CatalogId> {
        if let Some(id) = &row.typed_id {
            return Ok(id.clone());
        }
        cell(row, self.id).map(CatalogId::from_cell).ok_or_else(|| {
            Error::MalformedInput("catalog row has an empty identifier".to_string())
        })
    }
}

/// Replace `Auto` by a concrete strategy using the catalog's size in bytes
pub fn select_strategy(
    strategy: ComparisonStrategy,
    catalog_bytes: u64,
    chunk_threshold_bytes: u64,
) -> ComparisonStrategy {
    match strategy {
        ComparisonStrategy::Auto if catalog_bytes > chunk_threshold_bytes => {
            ComparisonStrategy::Chunked
        }
        ComparisonStrategy::Auto => ComparisonStrategy::Bulk,
        concrete => concrete,
    }
}

/// Build the engine for a strategy. `Auto` without a size hint is `Bulk`.
pub fn engine_for(strategy: ComparisonStrategy, chunk_size: usize) -> Box<dyn SetDifferenceEngine> {
    match strategy {
        ComparisonStrategy::RowWise => Box::new(RowWiseEngine),
        ComparisonStrategy::Auto | ComparisonStrategy::Bulk => Box::new(BulkEngine),
        ComparisonStrategy::Chunked => Box::new(ChunkedEngine::new(chunk_size)),
    }
}

/// Inventory/catalog comparator
pub struct Comparator {
    engine: Box<dyn SetDifferenceEngine>,
    layout: ColumnLayout,
}

impl Comparator {
    pub fn new(engine: Box<dyn SetDifferenceEngine>, layout: ColumnLayout) -> Self {
        Self { engine, layout }
    }

    /// Comparator using the default column layout
    pub fn for_strategy(strategy: ComparisonStrategy, chunk_size: usize) -> Self {
        Self::new(engine_for(strategy, chunk_size), ColumnLayout::default())
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Build the inventory key set from `inventory`
    pub fn build_keys(&self, inventory: &mut dyn TabularSource) -> Result<InventoryKeySet> {
        InventoryKeySet::from_source(inventory, &self.layout)
    }

    /// Catalog identifiers whose normalized name is absent from the inventory
    pub fn compare(
        &self,
        inventory: &mut dyn TabularSource,
        catalog: &mut dyn TabularSource,
    ) -> Result<Vec<CatalogId>> {
        let keys = self.build_keys(inventory)?;
        self.compare_with_keys(&keys, catalog)
    }

    /// Like [`Comparator::compare`] with a prebuilt key set
    pub fn compare_with_keys(
        &self,
        keys: &InventoryKeySet,
        catalog: &mut dyn TabularSource,
    ) -> Result<Vec<CatalogId>> {
        self.engine.unmatched_ids(keys, catalog, &self.layout)
    }
}

/// Compare plain in-memory data
///
/// `inventory` holds raw keys; `catalog` holds `(id, name)` pairs with
/// `None` for a missing name.
pub fn compare_records<K, N>(
    inventory: &[K],
    catalog: &[(CatalogId, Option<N>)],
    strategy: ComparisonStrategy,
    chunk_size: usize,
) -> Result<Vec<CatalogId>>
where
    K: AsRef<str>,
    N: AsRef<str>,
{
    let comparator = Comparator::for_strategy(strategy, chunk_size);
    let mut inventory_source = MemorySource::inventory(comparator.layout(), inventory);
    let mut catalog_source = MemorySource::catalog(comparator.layout(), catalog);
    comparator.compare(&mut inventory_source, &mut catalog_source)
}
