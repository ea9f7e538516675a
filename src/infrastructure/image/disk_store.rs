//! Count-bounded, age-bounded disk store for cached images.
//!
//! Each entry is one `.img` file under the store root plus a record in
//! `index.json`. Payloads are written to a unique temporary file and renamed
//! into place under the index lock, so readers never observe a half-written
//! file and an abandoned write leaves the prior entry untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::errors::StoreResult;
use crate::domain::{CacheEntry, CacheKey, CachePolicy, Clock, StoreError};

const INDEX_FILE: &str = "index.json";
const DATA_EXT: &str = "img";
const TEMP_EXT: &str = "tmp";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexRecord {
    key: CacheKey,
    file_name: String,
    valid_till: DateTime<Utc>,
    content_length: u64,
    #[serde(default)]
    e_tag: Option<String>,
    last_accessed: DateTime<Utc>,
}

/// Disk store holding at most `max_objects` live entries.
///
/// Least recently used entries are evicted first once the limit is exceeded.
pub struct DiskStore {
    root: PathBuf,
    max_objects: usize,
    stale_period: TimeDelta,
    clock: Arc<dyn Clock>,
    index: Mutex<LruCache<CacheKey, IndexRecord>>,
}

impl std::fmt::Debug for DiskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskStore")
            .field("root", &self.root)
            .field("max_objects", &self.max_objects)
            .field("stale_period", &self.stale_period)
            .finish_non_exhaustive()
    }
}

impl DiskStore {
    /// Opens the store rooted at `root`, rebuilding state from the persisted index.
    ///
    /// Records whose files are gone are dropped; unreferenced and temporary
    /// files are removed; capacity is enforced before returning.
    ///
    /// # Errors
    /// Returns error if the store directory cannot be created or read.
    pub async fn open(
        root: PathBuf,
        max_objects: usize,
        stale_period: TimeDelta,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io("failed to create cache dir", e))?;

        let mut records = load_index(&root.join(INDEX_FILE)).await;
        records.sort_by_key(|r| r.last_accessed);

        let mut index = LruCache::unbounded();
        for record in records {
            if fs::try_exists(root.join(&record.file_name))
                .await
                .unwrap_or(false)
            {
                index.put(record.key.clone(), record);
            } else {
                debug!(key = %record.key, "Dropping index record with missing file");
            }
        }

        sweep_orphans(&root, &index, true).await?;

        let store = Self {
            root,
            max_objects: max_objects.max(1),
            stale_period,
            clock,
            index: Mutex::new(index),
        };

        {
            let mut index = store.index.lock().await;
            store.evict_locked(&mut index).await;
            store.persist_locked(&index).await;
            debug!(
                root = %store.root.display(),
                entries = index.len(),
                "Opened disk store"
            );
        }

        Ok(store)
    }

    /// Opens the store with limits taken from `policy`.
    ///
    /// # Errors
    /// Returns error if the store directory cannot be created or read.
    pub async fn open_with_policy(
        root: PathBuf,
        policy: &CachePolicy,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        Self::open(root, policy.max_objects, policy.stale_period, clock).await
    }

    /// Returns the store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configured staleness window.
    #[must_use]
    pub const fn stale_period(&self) -> TimeDelta {
        self.stale_period
    }

    fn entry_for(&self, record: &IndexRecord) -> CacheEntry {
        CacheEntry {
            key: record.key.clone(),
            storage_path: self.root.join(&record.file_name),
            valid_till: record.valid_till,
            content_length: record.content_length,
            e_tag: record.e_tag.clone(),
        }
    }

    /// Returns the live entry for `key`.
    ///
    /// Stale entries are reported absent and removed.
    pub async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = self.clock.now();
        let mut index = self.index.lock().await;

        let record = index.get_mut(key)?;
        let entry = self.entry_for(record);
        if entry.is_stale_at(now) {
            debug!(key = %key, valid_till = %entry.valid_till, "Disk store entry is stale");
            if let Some(record) = index.pop(key) {
                self.remove_file(&record.file_name).await;
            }
            self.persist_locked(&index).await;
            return None;
        }

        if !fs::try_exists(&entry.storage_path).await.unwrap_or(false) {
            warn!(
                key = %key,
                path = %entry.storage_path.display(),
                "Cached file vanished, dropping entry"
            );
            index.pop(key);
            self.persist_locked(&index).await;
            return None;
        }

        record.last_accessed = now;
        trace!(key = %key, path = %entry.storage_path.display(), "Disk store hit");
        Some(entry)
    }

    /// Stores `bytes` under `key` with the configured staleness window.
    ///
    /// # Errors
    /// Returns error if the payload cannot be written to disk. The prior entry
    /// for `key`, if any, is left untouched in that case or when the returned
    /// future is dropped before completion.
    pub async fn write(
        &self,
        key: &CacheKey,
        bytes: &[u8],
        e_tag: Option<String>,
    ) -> StoreResult<CacheEntry> {
        self.write_with_ttl(key, bytes, self.stale_period, e_tag)
            .await
    }

    /// Stores `bytes` under `key`, valid for `ttl` from now.
    ///
    /// # Errors
    /// Returns error if the payload cannot be written to disk.
    pub async fn write_with_ttl(
        &self,
        key: &CacheKey,
        bytes: &[u8],
        ttl: TimeDelta,
        e_tag: Option<String>,
    ) -> StoreResult<CacheEntry> {
        let stem = key.file_stem();
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let temp_path = self.root.join(format!("{stem}-{unique}.{TEMP_EXT}"));
        let file_name = format!("{stem}-{unique}.{DATA_EXT}");
        let final_path = self.root.join(&file_name);

        if let Err(e) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StoreError::io("failed to write cache file", e));
        }
        let mut index = self.index.lock().await;
        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StoreError::io("failed to move cache file into place", e));
        }

        let now = self.clock.now();
        let record = IndexRecord {
            key: key.clone(),
            file_name,
            valid_till: now + ttl,
            content_length: bytes.len() as u64,
            e_tag,
            last_accessed: now,
        };
        let entry = self.entry_for(&record);

        if let Some(previous) = index.put(key.clone(), record) {
            self.remove_file(&previous.file_name).await;
        }
        self.evict_locked(&mut index).await;
        self.sweep_locked(&index).await;
        self.persist_locked(&index).await;

        debug!(
            key = %key,
            path = %entry.storage_path.display(),
            size = entry.content_length,
            "Stored image in disk store"
        );

        Ok(entry)
    }

    /// Removes least recently used entries until the count is within the limit,
    /// then deletes payload files no entry references.
    ///
    /// Returns the number of evicted entries.
    pub async fn evict_over_capacity(&self) -> usize {
        let mut index = self.index.lock().await;
        let evicted = self.evict_locked(&mut index).await;
        self.sweep_locked(&index).await;
        if evicted > 0 {
            self.persist_locked(&index).await;
        }
        evicted
    }

    /// Payloads of writes abandoned during the rename are unreferenced.
    /// Temporary files are left alone; in-flight writes still own them.
    async fn sweep_locked(&self, index: &LruCache<CacheKey, IndexRecord>) {
        if let Err(e) = sweep_orphans(&self.root, index, false).await {
            warn!(root = %self.root.display(), error = %e, "Failed to sweep unreferenced cache files");
        }
    }

    async fn evict_locked(&self, index: &mut LruCache<CacheKey, IndexRecord>) -> usize {
        let mut evicted = 0;
        while index.len() > self.max_objects {
            let Some((key, record)) = index.pop_lru() else {
                break;
            };
            self.remove_file(&record.file_name).await;
            debug!(key = %key, "Evicted least recently used entry");
            evicted += 1;
        }
        evicted
    }

    /// Removes the entry for `key`. Returns true if one existed.
    pub async fn remove(&self, key: &CacheKey) -> bool {
        let mut index = self.index.lock().await;
        let Some(record) = index.pop(key) else {
            return false;
        };
        self.remove_file(&record.file_name).await;
        self.persist_locked(&index).await;
        debug!(key = %key, "Removed entry from disk store");
        true
    }

    /// Removes every entry and every file under the store root.
    ///
    /// # Errors
    /// Returns error if the store directory cannot be read.
    pub async fn clear(&self) -> StoreResult<()> {
        let mut index = self.index.lock().await;
        index.clear();

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io("failed to read cache dir", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io("failed to read cache dir entry", e))?
        {
            let path = entry.path();
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if is_file && let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove cache file");
            }
        }

        debug!(root = %self.root.display(), "Cleared disk store");
        Ok(())
    }

    /// Returns true if a live entry exists for `key`, without touching recency.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        let now = self.clock.now();
        let index = self.index.lock().await;
        index.peek(key).is_some_and(|r| now < r.valid_till)
    }

    /// Returns the number of indexed entries, stale ones included until inspected.
    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the total size of all files under the store root.
    pub async fn total_size(&self) -> u64 {
        total_size(&self.root).await
    }

    async fn remove_file(&self, file_name: &str) {
        let path = self.root.join(file_name);
        if let Err(e) = fs::remove_file(&path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %path.display(), error = %e, "Failed to remove cache file");
        }
    }

    /// Writes the index, least recently used first. Failures are logged only.
    async fn persist_locked(&self, index: &LruCache<CacheKey, IndexRecord>) {
        let records: Vec<&IndexRecord> = index.iter().rev().map(|(_, r)| r).collect();
        let json = match serde_json::to_vec(&records) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize disk store index");
                return;
            }
        };

        let unique = uuid::Uuid::new_v4().simple().to_string();
        let temp_path = self.root.join(format!("{INDEX_FILE}-{unique}.{TEMP_EXT}"));
        let result = match fs::write(&temp_path, &json).await {
            Ok(()) => fs::rename(&temp_path, self.root.join(INDEX_FILE)).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            warn!(root = %self.root.display(), error = %e, "Failed to persist disk store index");
        }
    }
}

async fn load_index(path: &Path) -> Vec<IndexRecord> {
    let Ok(content) = fs::read(path).await else {
        return Vec::new();
    };
    match serde_json::from_slice(&content) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse disk store index, starting empty");
            Vec::new()
        }
    }
}

/// Removes data files the index does not reference, and temporary files when
/// `temp_files` is set.
async fn sweep_orphans(
    root: &Path,
    index: &LruCache<CacheKey, IndexRecord>,
    temp_files: bool,
) -> StoreResult<()> {
    let mut entries = fs::read_dir(root)
        .await
        .map_err(|e| StoreError::io("failed to read cache dir", e))?;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let orphan = match ext {
            TEMP_EXT => temp_files,
            DATA_EXT => !index.iter().any(|(_, r)| r.file_name == file_name),
            _ => false,
        };
        if orphan {
            trace!(path = %path.display(), "Removing orphaned cache file");
            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove orphaned cache file");
            }
        }
    }
    Ok(())
}

/// Sums the sizes of all files below `root`. Unreadable entries count as zero.
pub async fn total_size(root: &Path) -> u64 {
    let mut total = 0u64;
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(mut entries) = fs::read_dir(&dir).await else {
            continue;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if meta.is_dir() {
                pending.push(entry.path());
            } else {
                total += meta.len();
            }
        }
    }

    total
}

/// Returns the default cache directory path.
#[must_use]
pub fn dirs_cache_path() -> PathBuf {
    directories::ProjectDirs::from("com", "linuxmobile", "imgcache").map_or_else(
        || std::env::temp_dir().join("imgcache").join("cache").join("images"),
        |dirs| dirs.cache_dir().join("images"),
    )
}
