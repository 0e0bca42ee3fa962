//! Reconciliation pipeline
//!
//! inventory fetch → catalog fetch → compare. Each stage's failure aborts the
//! run and is wrapped as [`Error::Pipeline`] naming the stage; nothing is
//! retried and no partial result is returned.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shelfsync_common::config::{ComparisonStrategy, ServiceConfig};
use shelfsync_common::{Error, Result};
use tracing::{info, warn};

use crate::compare::{
    engine_for, select_strategy, CatalogId, ColumnLayout, Comparator, CsvSource, KeySetCache,
};
use crate::services::{
    ArtifactStore, CatalogClient, CatalogProvider, InventoryClient, InventoryProvider,
};

/// Comparison settings applied to each run
#[derive(Debug, Clone)]
pub struct CompareSettings {
    pub strategy: ComparisonStrategy,
    pub chunk_size: usize,
    pub auto_chunk_threshold_bytes: u64,
    pub layout: ColumnLayout,
}

impl CompareSettings {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            strategy: config.strategy,
            chunk_size: config.chunk_size,
            auto_chunk_threshold_bytes: config.auto_chunk_threshold_bytes,
            layout: ColumnLayout::default(),
        }
    }
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            strategy: ComparisonStrategy::Auto,
            chunk_size: shelfsync_common::config::DEFAULT_CHUNK_SIZE,
            auto_chunk_threshold_bytes: shelfsync_common::config::DEFAULT_AUTO_CHUNK_THRESHOLD_BYTES,
            layout: ColumnLayout::default(),
        }
    }
}

/// Outcome of one successful run
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    /// Catalog identifiers with no inventory match, in catalog order
    pub unique_ids: Vec<CatalogId>,
    pub unique_count: usize,
    /// Wall-clock seconds for the whole run
    pub processing_time: f64,
    /// Engine that performed the comparison
    pub strategy: ComparisonStrategy,
}

/// Fetch-fetch-compare pipeline
pub struct ReconcilePipeline {
    inventory: Arc<dyn InventoryProvider>,
    catalog: Arc<dyn CatalogProvider>,
    settings: CompareSettings,
    cache: Option<Arc<KeySetCache>>,
}

impl ReconcilePipeline {
    pub fn new(
        inventory: Arc<dyn InventoryProvider>,
        catalog: Arc<dyn CatalogProvider>,
        settings: CompareSettings,
    ) -> Self {
        Self {
            inventory,
            catalog,
            settings,
            cache: None,
        }
    }

    /// Reuse inventory key sets across runs while the artifact content is unchanged
    pub fn with_cache(mut self, cache: Arc<KeySetCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Pipeline over the HTTP upstream clients described by `config`
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store = ArtifactStore::new(&config.output_directory);
        let timeout = Duration::from_secs(config.request_timeout_secs);

        if config.accept_invalid_certs {
            warn!("TLS certificate verification disabled for upstream feeds");
        }

        let inventory = InventoryClient::new(
            config.inventory_source_url.clone(),
            store.clone(),
            timeout,
            config.accept_invalid_certs,
        )?;
        let catalog = CatalogClient::new(
            config.catalog_source_url.clone(),
            store,
            timeout,
            config.accept_invalid_certs,
        )?;

        let pipeline = Self::new(
            Arc::new(inventory),
            Arc::new(catalog),
            CompareSettings::from_config(config),
        );
        Ok(if config.cache_inventory_keys {
            pipeline.with_cache(Arc::new(KeySetCache::new()))
        } else {
            pipeline
        })
    }

    pub fn settings(&self) -> &CompareSettings {
        &self.settings
    }

    /// Run all stages to completion
    pub async fn run(&self) -> Result<ReconcileReport> {
        let start = Instant::now();
        info!("Starting reconciliation run");

        let inventory_path = self
            .inventory
            .fetch_inventory()
            .await
            .map_err(|e| e.in_stage("inventory"))?;

        let catalog_path = self
            .catalog
            .fetch_catalog()
            .await
            .map_err(|e| e.in_stage("catalog"))?;

        let settings = self.settings.clone();
        let cache = self.cache.clone();
        let (strategy, unique_ids) = tokio::task::spawn_blocking(move || {
            compare_artifacts(&inventory_path, &catalog_path, &settings, cache.as_deref())
        })
        .await
        .map_err(|e| Error::Comparison(format!("Comparison worker panicked: {}", e)).in_stage("compare"))?
        .map_err(|e| e.in_stage("compare"))?;

        let processing_time = start.elapsed().as_secs_f64();
        info!(
            strategy = %strategy,
            unique = unique_ids.len(),
            "Reconciliation finished in {:.3} seconds",
            processing_time
        );

        Ok(ReconcileReport {
            unique_count: unique_ids.len(),
            unique_ids,
            processing_time,
            strategy,
        })
    }
}

/// Compare two materialized artifacts, resolving `Auto` from the catalog
/// artifact size. Returns the strategy used and the unmatched identifiers.
pub fn compare_artifacts(
    inventory_path: &Path,
    catalog_path: &Path,
    settings: &CompareSettings,
    cache: Option<&KeySetCache>,
) -> Result<(ComparisonStrategy, Vec<CatalogId>)> {
    let catalog_bytes = fs::metadata(catalog_path)?.len();
    let strategy = select_strategy(
        settings.strategy,
        catalog_bytes,
        settings.auto_chunk_threshold_bytes,
    );
    let comparator = Comparator::new(
        engine_for(strategy, settings.chunk_size),
        settings.layout.clone(),
    );

    let keys = match cache {
        Some(cache) => cache.get_or_build(inventory_path, |content| {
            let mut inventory = CsvSource::from_reader(content)?;
            comparator.build_keys(&mut inventory)
        })?,
        None => {
            let mut inventory = CsvSource::open(inventory_path)?;
            Arc::new(comparator.build_keys(&mut inventory)?)
        }
    };

    let mut catalog = CsvSource::open(catalog_path)?;
    let unique_ids = comparator.compare_with_keys(&keys, &mut catalog)?;
    Ok((strategy, unique_ids))
}
