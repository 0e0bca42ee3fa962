//! Tabular inputs for the comparator
//!
//! Both feeds reach the comparator as header-plus-rows tables. A row is a
//! vector of optional cells; `None` is a missing value (an empty CSV cell).
//! In-memory catalog rows also carry their identifier already typed, so it
//! is returned as given instead of being re-read from its cell text.

use serde::{Deserialize, Serialize};
use shelfsync_common::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One table row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Cells in column order; `None` marks a missing cell
    pub cells: Vec<Option<String>>,
    /// Identifier typed by the source, taking precedence over the identifier cell
    pub typed_id: Option<CatalogId>,
}

impl Row {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self {
            cells,
            typed_id: None,
        }
    }

    pub fn with_id(cells: Vec<Option<String>>, id: CatalogId) -> Self {
        Self {
            cells,
            typed_id: Some(id),
        }
    }
}

impl From<Vec<Option<String>>> for Row {
    fn from(cells: Vec<Option<String>>) -> Self {
        Self::new(cells)
    }
}

/// Batch size used by [`TabularSource::read_all`]
const READ_ALL_BATCH: usize = 8192;

/// A header-plus-rows table that can be consumed in batches
pub trait TabularSource {
    /// Column names, in column order
    fn headers(&self) -> &[String];

    /// Read up to `max_rows` further rows. An empty batch means the source is exhausted.
    fn read_batch(&mut self, max_rows: usize) -> Result<Vec<Row>>;

    /// Read every remaining row
    fn read_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        loop {
            let batch = self.read_batch(READ_ALL_BATCH)?;
            if batch.is_empty() {
                return Ok(rows);
            }
            rows.extend(batch);
        }
    }
}

/// Index of `column` in `source`'s headers, or `MalformedInput` naming the source
pub fn column_index(source: &dyn TabularSource, column: &str, source_name: &str) -> Result<usize> {
    source
        .headers()
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| {
            Error::MalformedInput(format!(
                "{} source has no '{}' column (found: {})",
                source_name,
                column,
                source.headers().join(", ")
            ))
        })
}

/// Cell `index` of `row`; short rows read as missing
pub fn cell(row: &Row, index: usize) -> Option<&str> {
    row.cells.get(index).and_then(|c| c.as_deref())
}

/// Names of the columns the comparator requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Inventory key column ("ARTIST - TITLE" text)
    pub inventory_key: String,
    /// Catalog identifier column
    pub catalog_id: String,
    /// Catalog product name column
    pub catalog_name: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            inventory_key: "ARTIST_TITLE".to_string(),
            catalog_id: "id".to_string(),
            catalog_name: "name".to_string(),
        }
    }
}

/// Storefront product identifier, preserved verbatim
///
/// Serializes as a JSON number for integer ids and a JSON string otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    Int(i64),
    Text(String),
}

impl CatalogId {
    /// Interpret a table cell. Only text that round-trips through `i64`
    /// becomes `Int`, so `"007"` or `"+5"` stay textual.
    pub fn from_cell(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(n) if n.to_string() == text => CatalogId::Int(n),
            _ => CatalogId::Text(text.to_string()),
        }
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogId::Int(n) => write!(f, "{}", n),
            CatalogId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CatalogId {
    fn from(n: i64) -> Self {
        CatalogId::Int(n)
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        CatalogId::Text(s.to_string())
    }
}

/// CSV-backed source streaming rows from any reader
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    record: csv::StringRecord,
}

impl CsvSource<File> {
    /// Open a CSV artifact on disk
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvSource<R> {
    /// Wrap a reader whose first record is the header row
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        Ok(Self {
            reader,
            headers,
            record: csv::StringRecord::new(),
        })
    }
}

impl<R: Read> TabularSource for CsvSource<R> {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn read_batch(&mut self, max_rows: usize) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(max_rows.min(READ_ALL_BATCH));
        while rows.len() < max_rows && self.reader.read_record(&mut self.record)? {
            rows.push(Row::new(
                self.record
                    .iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect(),
            ));
        }
        Ok(rows)
    }
}

/// In-memory source, consumed front to back
#[derive(Debug, Clone)]
pub struct MemorySource {
    headers: Vec<String>,
    rows: std::vec::IntoIter<Row>,
}

impl MemorySource {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            headers,
            rows: rows.into_iter(),
        }
    }

    /// Table of untyped cells
    pub fn from_cells(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self::new(headers, rows.into_iter().map(Row::new).collect())
    }

    /// Single-column inventory table under `layout.inventory_key`
    pub fn inventory<S: AsRef<str>>(layout: &ColumnLayout, keys: &[S]) -> Self {
        Self::new(
            vec![layout.inventory_key.clone()],
            keys.iter()
                .map(|k| Row::new(vec![Some(k.as_ref().to_string())]))
                .collect(),
        )
    }

    /// Two-column `(id, name)` catalog table under `layout`'s names.
    /// Each row keeps its `CatalogId` as given.
    pub fn catalog<S: AsRef<str>>(layout: &ColumnLayout, entries: &[(CatalogId, Option<S>)]) -> Self {
        Self::new(
            vec![layout.catalog_id.clone(), layout.catalog_name.clone()],
            entries
                .iter()
                .map(|(id, name)| {
                    Row::with_id(
                        vec![
                            Some(id.to_string()),
                            name.as_ref().map(|n| n.as_ref().to_string()),
                        ],
                        id.clone(),
                    )
                })
                .collect(),
        )
    }
}

impl TabularSource for MemorySource {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn read_batch(&mut self, max_rows: usize) -> Result<Vec<Row>> {
        Ok(self.rows.by_ref().take(max_rows).collect())
    }
}
