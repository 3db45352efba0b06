use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::models::{CacheSnapshot, CACHE_VERSION};

/// Result of reading the cache file
#[derive(Debug, Clone)]
pub struct LoadedCache {
    pub snapshot: CacheSnapshot,
    /// `false` when there was no cache file (or it was empty)
    pub exists: bool,
}

impl LoadedCache {
    pub fn missing() -> Self {
        Self {
            snapshot: CacheSnapshot::empty(),
            exists: false,
        }
    }

    /// Whether the snapshot is too old to serve without a refresh
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if !self.exists {
            return true;
        }
        match chrono::Duration::from_std(window) {
            Ok(window) => now - self.snapshot.last_refreshed_at > window,
            // A window too large to represent never expires
            Err(_) => false,
        }
    }
}

/// Single-file JSON store for the last refreshed item set
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot.
    ///
    /// A missing or empty file means "no cache" and is not an error. A file
    /// that exists but cannot be read or parsed is.
    pub fn load(&self) -> Result<LoadedCache> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No cache file");
            return Ok(LoadedCache::missing());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache file: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(LoadedCache::missing());
        }

        let snapshot: CacheSnapshot = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse cache JSON from {}. Delete it to start over.",
                self.path.display()
            )
        })?;

        if snapshot.version != CACHE_VERSION {
            anyhow::bail!(
                "Unsupported cache file version: {}. Expected {}. Delete {} to start over.",
                snapshot.version,
                CACHE_VERSION,
                self.path.display()
            );
        }

        Ok(LoadedCache {
            snapshot,
            exists: true,
        })
    }

    /// Replace the cache file with `snapshot`.
    ///
    /// Writes a sibling temp file and renames it into place, so a reader sees
    /// either the old file or the new one.
    pub fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create cache directory")?;
        }

        let json = serde_json::to_vec(snapshot).context("Failed to serialize cache")?;

        let tmp_path = self.tmp_path();
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let written = options
            .open(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .with_context(|| format!("Failed to write cache file: {}", tmp_path.display()));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace cache file: {}", self.path.display()))?;

        debug!(path = %self.path.display(), items = snapshot.items.len(), "Cache saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cache.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
