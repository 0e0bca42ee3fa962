//! Upstream collaborators
//!
//! Each provider fetches one feed and materializes it as a CSV artifact,
//! returning the artifact path for the comparator to read.

pub mod artifacts;
pub mod catalog_client;
pub mod inventory_client;

pub use artifacts::{ArtifactKind, ArtifactStore};
pub use catalog_client::CatalogClient;
pub use inventory_client::InventoryClient;

use async_trait::async_trait;
use shelfsync_common::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

const USER_AGENT: &str = concat!("shelfsync-rc/", env!("CARGO_PKG_VERSION"));

/// Produces the inventory artifact (one `ARTIST_TITLE` column of unique keys)
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    async fn fetch_inventory(&self) -> Result<PathBuf>;
}

/// Produces the catalog artifact (`id`, `name` columns)
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_catalog(&self) -> Result<PathBuf>;
}

/// HTTP client shared by both upstream clients
pub(crate) fn build_http_client(
    timeout: Duration,
    accept_invalid_certs: bool,
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| Error::UpstreamFetch(format!("HTTP client setup failed: {}", e)))
}

/// GET `url` and return the body, mapping transport and status failures
pub(crate) async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::UpstreamFetch(format!("GET {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(Error::UpstreamFetch(format!(
            "GET {} returned HTTP {}: {}",
            url,
            status.as_u16(),
            error_text.chars().take(200).collect::<String>()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::UpstreamFetch(format!("Reading body of {} failed: {}", url, e)))?;
    Ok(body.to_vec())
}
