//! Shared fixtures for shelfsync-rc integration tests
//!
//! Fake upstream providers that hand back pre-written CSV artifacts (or fail),
//! so the pipeline and router run without network access.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use shelfsync_common::{Error, Result};
use shelfsync_rc::services::{CatalogProvider, InventoryProvider};
use shelfsync_rc::{CompareSettings, ReconcilePipeline};

/// Write an `ARTIST_TITLE` inventory artifact
pub fn write_inventory(dir: &Path, keys: &[&str]) -> PathBuf {
    let path = dir.join("inventory.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["ARTIST_TITLE"]).unwrap();
    for key in keys {
        writer.write_record([key]).unwrap();
    }
    writer.flush().unwrap();
    path
}

/// Write an `id,name` catalog artifact
pub fn write_catalog(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("catalog.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["id", "name"]).unwrap();
    for (id, name) in entries {
        writer.write_record([id, name]).unwrap();
    }
    writer.flush().unwrap();
    path
}

/// Provider returning a fixed artifact path and counting calls
pub struct StaticArtifact {
    pub path: PathBuf,
    pub calls: AtomicUsize,
}

impl StaticArtifact {
    pub fn new(path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            path,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hand_out(&self) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.path.clone())
    }
}

#[async_trait]
impl InventoryProvider for StaticArtifact {
    async fn fetch_inventory(&self) -> Result<PathBuf> {
        self.hand_out()
    }
}

#[async_trait]
impl CatalogProvider for StaticArtifact {
    async fn fetch_catalog(&self) -> Result<PathBuf> {
        self.hand_out()
    }
}

/// Provider that always fails with an upstream error
pub struct FailingUpstream {
    pub reason: String,
}

impl FailingUpstream {
    pub fn new(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reason: reason.to_string(),
        })
    }
}

#[async_trait]
impl InventoryProvider for FailingUpstream {
    async fn fetch_inventory(&self) -> Result<PathBuf> {
        Err(Error::UpstreamFetch(self.reason.clone()))
    }
}

#[async_trait]
impl CatalogProvider for FailingUpstream {
    async fn fetch_catalog(&self) -> Result<PathBuf> {
        Err(Error::UpstreamFetch(self.reason.clone()))
    }
}

/// Pipeline over two pre-written artifacts
pub fn artifact_pipeline(inventory: PathBuf, catalog: PathBuf, settings: CompareSettings) -> ReconcilePipeline {
    ReconcilePipeline::new(
        StaticArtifact::new(inventory),
        StaticArtifact::new(catalog),
        settings,
    )
}
