use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::{LoadError, load_file};
use super::model::AnimeTable;

/// Outcome of a load, shared so a failure can be handed out repeatedly.
pub type LoadResult = Result<Arc<AnimeTable>, Arc<LoadError>>;

// ---------------------------------------------------------------------------
// SourceKey – identity of a data source on disk
// ---------------------------------------------------------------------------

/// Identifies one version of a source file. A change in length or
/// modification time invalidates the cached table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub len: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl SourceKey {
    /// Fingerprint `path`. A missing file yields a key without metadata.
    pub fn for_path(path: &Path) -> Self {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let meta = std::fs::metadata(&path).ok();
        SourceKey {
            len: meta.as_ref().map(|m| m.len()),
            modified: meta.and_then(|m| m.modified().ok()),
            path,
        }
    }
}

// ---------------------------------------------------------------------------
// TableCache
// ---------------------------------------------------------------------------

/// Holds the most recently loaded table together with its [`SourceKey`].
///
/// Failures are cached as well, so a broken source is reported once and
/// not on every interaction.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<(SourceKey, LoadResult)>,
    loads: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it if the source changed.
    pub fn get_or_load(&mut self, path: &Path) -> LoadResult {
        let key = SourceKey::for_path(path);
        if let Some((cached_key, result)) = &self.entry {
            if *cached_key == key {
                log::debug!("Cache hit for {}", path.display());
                return result.clone();
            }
        }

        self.loads += 1;
        let result = match load_file(path) {
            Ok(table) => Ok(Arc::new(table)),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                Err(Arc::new(e))
            }
        };
        self.entry = Some((key, result.clone()));
        result
    }

    /// Drop the cached entry; the next call reloads unconditionally.
    pub fn invalidate(&mut self) {
        log::info!("Table cache invalidated");
        self.entry = None;
    }

    /// How many times the loader actually ran.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
