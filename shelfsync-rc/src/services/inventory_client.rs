//! Inventory spreadsheet client
//!
//! Downloads the stock spreadsheet, reads the `ARTIST` and `TITLE` columns of
//! its first worksheet, combines them into `"ARTIST - TITLE"` keys, drops
//! exact duplicates (first occurrence wins) and writes the keys as a
//! one-column `ARTIST_TITLE` CSV artifact.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use shelfsync_common::{Error, Result, MISSING_PLACEHOLDER};
use tracing::info;

use super::artifacts::{ArtifactKind, ArtifactStore};
use super::{build_http_client, fetch_bytes, InventoryProvider};

pub const ARTIST_COLUMN: &str = "ARTIST";
pub const TITLE_COLUMN: &str = "TITLE";
pub const ARTIST_TITLE_COLUMN: &str = "ARTIST_TITLE";

/// Spreadsheet-backed inventory provider
pub struct InventoryClient {
    http_client: reqwest::Client,
    source_url: String,
    store: ArtifactStore,
}

impl InventoryClient {
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
impl InventoryProvider for InventoryClient {
    async fn fetch_inventory(&self) -> Result<PathBuf> {
        let start = Instant::now();
        let bytes = fetch_bytes(&self.http_client, &self.source_url).await?;
        let downloaded = bytes.len();

        let store = self.store.clone();
        let (path, key_count) = tokio::task::spawn_blocking(move || -> Result<(PathBuf, usize)> {
            let keys = artist_title_keys(read_first_worksheet(bytes)?)?;
            let count = keys.len();
            let path = store.write_today(ArtifactKind::Inventory, |writer| {
                writer.write_record([ARTIST_TITLE_COLUMN])?;
                for key in &keys {
                    writer.write_record([key])?;
                }
                Ok(())
            })?;
            Ok((path, count))
        })
        .await
        .map_err(|e| Error::Comparison(format!("Inventory worker panicked: {}", e)))??;

        info!(
            bytes = downloaded,
            unique_keys = key_count,
            path = %path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Inventory artifact written"
        );
        Ok(path)
    }
}

/// Decode a workbook (xlsx, xls, ods) and return its first worksheet as
/// optional-text rows, header row included
pub fn read_first_worksheet(bytes: Vec<u8>) -> Result<Vec<Vec<Option<String>>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::UpstreamFetch(format!("Inventory spreadsheet unreadable: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::MalformedInput("Inventory spreadsheet has no worksheets".to_string()))?
        .map_err(|e| Error::UpstreamFetch(format!("Inventory worksheet unreadable: {}", e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Combine the `ARTIST` and `TITLE` columns of `rows` (first row is the
/// header) into unique `"ARTIST - TITLE"` keys in first-seen order
pub fn artist_title_keys(rows: Vec<Vec<Option<String>>>) -> Result<Vec<String>> {
    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| Error::MalformedInput("Inventory worksheet is empty".to_string()))?;

    let find = |name: &str| {
        header
            .iter()
            .position(|h| h.as_deref().map(str::trim) == Some(name))
            .ok_or_else(|| {
                Error::MalformedInput(format!("Inventory worksheet has no '{}' column", name))
            })
    };
    let artist_idx = find(ARTIST_COLUMN)?;
    let title_idx = find(TITLE_COLUMN)?;

    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for row in rows {
        let text = |idx: usize| {
            row.get(idx)
                .and_then(|c| c.as_deref())
                .unwrap_or(MISSING_PLACEHOLDER)
        };
        let key = format!("{} - {}", text(artist_idx), text(title_idx));
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    Ok(keys)
}
