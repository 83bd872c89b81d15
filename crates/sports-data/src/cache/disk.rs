//! On-disk layer: one JSON file per entry.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::fs;

use super::entry::CacheEntry;
use super::key::CacheKey;

const EXTENSION: &str = "json";

/// Persistent layer rooted at a directory. Each entry lives in
/// `<dir>/<key>.json`.
///
/// Callers serialize access per key; this type does no locking of its own.
pub(crate) struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key, EXTENSION))
    }

    /// Read an entry. Missing files are a miss; unreadable or corrupt files
    /// are deleted and treated as a miss.
    pub async fn read(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cache file {} unreadable: {}", path.display(), e);
                self.remove(key).await;
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Discarding corrupt cache file {}: {}", path.display(), e);
                self.remove(key).await;
                None
            }
        }
    }

    /// Write an entry atomically: the payload goes to a temp file that is
    /// then renamed over the final path.
    pub async fn write(&self, key: &CacheKey, entry: &CacheEntry) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let bytes = serde_json::to_vec(entry)?;
        let path = self.path(key);
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));

        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        debug!("Cache file written: {}", path.display());
        Ok(())
    }

    pub async fn remove(&self, key: &CacheKey) {
        let path = self.path(key);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to delete cache file {}: {}", path.display(), e),
        }
    }

    /// Keys of every entry file currently on disk.
    pub async fn keys(&self) -> io::Result<Vec<CacheKey>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut keys = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(CacheKey::from_file_stem)
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlClass;
    use crate::models::{DataValue, Team};
    use chrono::Utc;
    use std::borrow::Cow;
    use tempfile::tempdir;

    fn team_entry() -> CacheEntry {
        CacheEntry::new(
            DataValue::Team(Team {
                id: "150".to_string(),
                name: "Duke".to_string(),
                ..Default::default()
            }),
            Cow::Borrowed("espn"),
            Utc::now(),
            TtlClass::Daily,
            TtlClass::Daily.default_ttl(),
        )
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let disk = DiskCache::new(dir.path());
        let key = CacheKey::from_parts("get_team", [("team_id", "150")]);

        let entry = team_entry();
        disk.write(&key, &entry).await.unwrap();

        let path = dir.path().join(format!("{}.json", key));
        assert!(path.exists());
        assert_eq!(disk.read(&key).await, Some(entry));
        assert_eq!(disk.keys().await.unwrap(), vec![key]);
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let disk = DiskCache::new(dir.path().join("nested").join("cache"));
        let key = CacheKey::from_parts("get_team", [("team_id", "150")]);

        assert!(disk.read(&key).await.is_none());
        assert!(disk.keys().await.unwrap().is_empty());

        disk.write(&key, &team_entry()).await.unwrap();
        assert!(disk.read(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_deleted() {
        let dir = tempdir().unwrap();
        let disk = DiskCache::new(dir.path());
        let key = CacheKey::from_parts("get_roster", [("team_id", "57")]);
        let path = dir.path().join(format!("{}.json", key));

        std::fs::write(&path, b"{not json").unwrap();

        assert!(disk.read(&key).await.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_keys_ignore_foreign_files() {
        let dir = tempdir().unwrap();
        let disk = DiskCache::new(dir.path());
        std::fs::write(dir.path().join("notes.json"), b"{}").unwrap();
        std::fs::write(dir.path().join(format!("{}.json.tmp", "a".repeat(64))), b"{}").unwrap();

        assert!(disk.keys().await.unwrap().is_empty());
    }
}
