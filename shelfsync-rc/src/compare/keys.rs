//! Normalized inventory key set

use std::collections::HashSet;
use std::time::Instant;

use shelfsync_common::{normalize, Result};
use tracing::debug;

use super::source::{cell, column_index, ColumnLayout, TabularSource};

/// Deduplicated set of normalized inventory keys
///
/// Built once per comparison in O(n); lookups are O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryKeySet {
    keys: HashSet<String>,
}

impl InventoryKeySet {
    /// Read every row of `source` and normalize its key column.
    ///
    /// Fails with `MalformedInput` when the key column is absent, even if the
    /// source has no rows.
    pub fn from_source(source: &mut dyn TabularSource, layout: &ColumnLayout) -> Result<Self> {
        let start = Instant::now();
        let key_idx = column_index(source, &layout.inventory_key, "inventory")?;

        let normalized: Vec<String> = source
            .read_all()?
            .iter()
            .map(|row| normalize(cell(row, key_idx)))
            .collect();
        let rows = normalized.len();
        let set: Self = normalized.into_iter().collect();

        debug!(
            rows,
            unique_keys = set.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built inventory key set"
        );
        Ok(set)
    }

    /// Normalize already-extracted key strings
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .map(|k| normalize(Some(k.as_ref())))
            .collect()
    }

    /// Membership test for an already-normalized key
    pub fn contains(&self, normalized_key: &str) -> bool {
        self.keys.contains(normalized_key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<String> for InventoryKeySet {
    /// Collect keys that are already normalized
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
