//! Storefront catalog client
//!
//! Fetches the product feed (a JSON array of product objects), keeps only
//! `id` and `name`, decodes the `&amp;` entity in names, and writes an
//! `id,name` CSV artifact.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use shelfsync_common::{Error, Result};
use tracing::info;

use super::artifacts::{ArtifactKind, ArtifactStore};
use super::{build_http_client, fetch_bytes, CatalogProvider};
use crate::compare::CatalogId;

/// One storefront product; other fields in the feed are ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogItem {
    pub id: CatalogId,
    pub name: String,
}

/// HTTP/JSON-backed catalog provider
pub struct CatalogClient {
    http_client: reqwest::Client,
    source_url: String,
    store: ArtifactStore,
}

impl CatalogClient {
    pub fn new(
        source_url: impl Into<String>,
        store: ArtifactStore,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, accept_invalid_certs)?,
            source_url: source_url.into(),
            store,
        })
    }
}

#[async_trait]
impl CatalogProvider for CatalogClient {
    async fn fetch_catalog(&self) -> Result<PathBuf> {
        let start = Instant::now();
        let body = fetch_bytes(&self.http_client, &self.source_url).await?;
        let items = parse_catalog(&body)?;
        let item_count = items.len();

        let store = self.store.clone();
        let path = tokio::task::spawn_blocking(move || {
            store.write_today(ArtifactKind::Catalog, |writer| {
                writer.write_record(["id", "name"])?;
                for item in &items {
                    writer.write_record([item.id.to_string().as_str(), item.name.as_str()])?;
                }
                Ok(())
            })
        })
        .await
        .map_err(|e| Error::Comparison(format!("Catalog worker panicked: {}", e)))??;

        info!(
            items = item_count,
            path = %path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog artifact written"
        );
        Ok(path)
    }
}

/// Decode the product feed body, with `&amp;` in names decoded to `&`
pub fn parse_catalog(body: &[u8]) -> Result<Vec<CatalogItem>> {
    let mut items: Vec<CatalogItem> = serde_json::from_slice(body)
        .map_err(|e| Error::UpstreamFetch(format!("Catalog response is not a product list: {}", e)))?;

    for item in &mut items {
        item.name = decode_ampersand(&item.name);
    }
    Ok(items)
}

/// Replace the literal HTML ampersand entity with `&`
pub fn decode_ampersand(name: &str) -> String {
    name.replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_id_and_name_only() {
        let body = br#"[
            {"id": 101, "name": "Beatles - Abbey Road", "price": "25.00", "sku": "X1"},
            {"id": "ext-7", "name": "Miles Davis - Kind of Blue"}
        ]"#;

        let items = parse_catalog(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, CatalogId::Int(101));
        assert_eq!(items[1].id, CatalogId::Text("ext-7".to_string()));
    }

    #[test]
    fn test_ampersand_entity_decoded() {
        let body = br#"[{"id": 1, "name": "Simon &amp; Garfunkel - Bookends"}]"#;
        let items = parse_catalog(body).unwrap();
        assert_eq!(items[0].name, "Simon & Garfunkel - Bookends");
    }

    #[test]
    fn test_only_ampersand_entity_is_decoded() {
        assert_eq!(decode_ampersand("Guns N&#039; Roses &amp; Co"), "Guns N&#039; Roses & Co");
    }

    #[test]
    fn test_missing_name_is_upstream_error() {
        let err = parse_catalog(br#"[{"id": 1}]"#).unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
    }

    #[test]
    fn test_non_array_body_is_upstream_error() {
        let err = parse_catalog(br#"{"message": "Workflow was started"}"#).unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
    }
}
