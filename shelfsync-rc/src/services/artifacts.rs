//! Date-stamped intermediate artifacts
//!
//! Each pipeline run materializes both feeds as CSV files in the output
//! directory: `Xls<DDMMYY>.csv` for the inventory and `Woo<DDMMYY>.csv` for
//! the catalog. Writes go through a uniquely-named temp file and a rename so
//! a concurrent run never reads a half-written artifact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use shelfsync_common::Result;
use tracing::debug;
use uuid::Uuid;

/// Which feed an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Inventory,
    Catalog,
}

impl ArtifactKind {
    fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Inventory => "Xls",
            ArtifactKind::Catalog => "Woo",
        }
    }
}

/// Output directory for materialized feeds
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_directory: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Artifact path for `kind` on `date`
    pub fn path_for(&self, kind: ArtifactKind, date: NaiveDate) -> PathBuf {
        self.output_directory
            .join(format!("{}{}.csv", kind.prefix(), date.format("%d%m%y")))
    }

    /// Artifact path for `kind` today (local calendar day)
    pub fn today_path(&self, kind: ArtifactKind) -> PathBuf {
        self.path_for(kind, Local::now().date_naive())
    }

    /// Write today's artifact for `kind` with `write`, creating the output
    /// directory on demand. Returns the final path.
    pub fn write_today<F>(&self, kind: ArtifactKind, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut csv::Writer<fs::File>) -> Result<()>,
    {
        let target = self.today_path(kind);
        self.write_atomic(&target, write)?;
        Ok(target)
    }

    fn write_atomic<F>(&self, target: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut csv::Writer<fs::File>) -> Result<()>,
    {
        fs::create_dir_all(&self.output_directory)?;

        let temp_path = self
            .output_directory
            .join(format!(".{}.tmp", Uuid::new_v4()));
        let result = (|| -> Result<()> {
            {
                let mut writer = csv::Writer::from_path(&temp_path)?;
                write(&mut writer)?;
                writer.flush()?;
            }
            fs::rename(&temp_path, target)?;
            Ok(())
        })();

        if result.is_err() {
            // Best effort; the temp name is unique so a leftover never collides
            let _ = fs::remove_file(&temp_path);
        } else {
            debug!(path = %target.display(), "Artifact written");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_date_stamped_names() {
        let store = ArtifactStore::new("/srv/upload");
        let date = NaiveDate::from_ymd_opt(2025, 12, 12).unwrap();

        assert_eq!(
            store.path_for(ArtifactKind::Inventory, date),
            PathBuf::from("/srv/upload/Xls121225.csv")
        );
        assert_eq!(
            store.path_for(ArtifactKind::Catalog, date),
            PathBuf::from("/srv/upload/Woo121225.csv")
        );
    }

    #[test]
    fn test_write_creates_directory_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path().join("nested").join("upload"));

        let path = store
            .write_today(ArtifactKind::Catalog, |w| {
                w.write_record(["id", "name"])?;
                w.write_record(["1", "Beatles - Abbey Road"])?;
                Ok(())
            })
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,name\n1,Beatles - Abbey Road\n");

        let entries: Vec<_> = fs::read_dir(store.output_directory()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());

        let path = store
            .write_today(ArtifactKind::Inventory, |w| {
                w.write_record(["ARTIST_TITLE"])?;
                Ok(())
            })
            .unwrap();

        let result = store.write_today(ArtifactKind::Inventory, |_| {
            Err(shelfsync_common::Error::Comparison("boom".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "ARTIST_TITLE\n");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
