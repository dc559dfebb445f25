//! Working directory for run artifacts.
//!
//! All map images and the report land in one flat directory that is wiped
//! at the start of every run. A sentinel file keeps the directory present
//! in version control across wipes.

use crate::types::{GeoResult, ProductKind, RunId};
use std::fs;
use std::path::{Path, PathBuf};

/// File the cleanup pass never deletes
pub const SENTINEL_FILE: &str = ".gitkeep";

/// Filename prefix for assembled reports
pub const REPORT_PREFIX: &str = "GeoInformeExpress";

/// Flat artifact directory with destructive per-run cleanup
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure(&self) -> GeoResult<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Remove every entry except the sentinel file. Entries that cannot be
    /// removed are logged and skipped. Returns the number of entries removed;
    /// a missing directory counts as already clean.
    pub fn clean(&self) -> GeoResult<usize> {
        if !self.root.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            if entry.file_name() == SENTINEL_FILE {
                continue;
            }
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Failed to delete {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            log::debug!("Removed {} stale artifacts from {}", removed, self.root.display());
        }
        Ok(removed)
    }

    /// Path for a rendered map image: `{key}_{run_id}.png`
    pub fn artifact_path(&self, product: ProductKind, run_id: &RunId) -> PathBuf {
        self.root.join(format!("{}_{}.png", product.key(), run_id))
    }

    /// Path for the assembled report: `GeoInformeExpress_{run_id}.{ext}`
    pub fn report_path(&self, run_id: &RunId, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}_{}.{}", REPORT_PREFIX, run_id, extension))
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_keeps_sentinel_and_removes_the_rest() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());

        fs::write(dir.path().join(SENTINEL_FILE), "").unwrap();
        fs::write(dir.path().join("ndvi_old.png"), b"png").unwrap();
        fs::write(dir.path().join("GeoInformeExpress_old.html"), b"html").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/file.txt"), b"x").unwrap();

        let removed = workspace.clean().unwrap();
        assert_eq!(removed, 3);

        let remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(remaining, vec![SENTINEL_FILE]);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        fs::write(dir.path().join(SENTINEL_FILE), "").unwrap();

        assert_eq!(workspace.clean().unwrap(), 0);
        assert_eq!(workspace.clean().unwrap(), 0);
    }

    #[test]
    fn test_clean_missing_directory_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().join("does-not-exist"));
        assert_eq!(workspace.clean().unwrap(), 0);
    }

    #[test]
    fn test_artifact_naming() {
        let workspace = Workspace::new("data");
        let run_id = RunId::next();

        let map = workspace.artifact_path(ProductKind::Vegetation, &run_id);
        assert_eq!(
            map,
            PathBuf::from(format!("data/ndvi_{}.png", run_id))
        );

        let report = workspace.report_path(&run_id, "html");
        assert_eq!(
            report,
            PathBuf::from(format!("data/GeoInformeExpress_{}.html", run_id))
        );
    }
}
