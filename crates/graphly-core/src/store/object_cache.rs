// ── Concurrent object cache ──
//
// In-memory id→payload map, optionally backed by a `DiskCache`. Safe under
// concurrent access from in-flight load completions: per-key writes are
// last-writer-wins, and there are no cross-key transactions.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{trace, warn};

use super::disk::DiskCache;

/// Cache of raw JSON payloads and photo bytes, keyed by object id.
///
/// Reads check memory first and fall through to disk (repopulating the
/// memory entry on a hit). Writes go to both layers; disk failures degrade
/// to a log line -- the cache is best-effort by design.
pub struct ObjectCache {
    json: DashMap<String, Arc<str>>,
    photos: DashMap<String, Arc<[u8]>>,
    disk: Option<DiskCache>,
}

impl ObjectCache {
    /// Memory-only cache.
    pub fn in_memory() -> Self {
        Self {
            json: DashMap::new(),
            photos: DashMap::new(),
            disk: None,
        }
    }

    /// Cache backed by a [`DiskCache`].
    pub fn with_disk(disk: DiskCache) -> Self {
        Self {
            json: DashMap::new(),
            photos: DashMap::new(),
            disk: Some(disk),
        }
    }

    // ── JSON payloads ────────────────────────────────────────────────

    pub fn get_json(&self, object_id: &str) -> Option<Arc<str>> {
        if let Some(hit) = self.json.get(object_id) {
            trace!(object_id, "json cache hit (memory)");
            return Some(Arc::clone(&hit));
        }

        let disk = self.disk.as_ref()?;
        match disk.read_json(object_id) {
            Ok(Some(body)) => {
                trace!(object_id, "json cache hit (disk)");
                let entry: Arc<str> = Arc::from(body);
                self.json.insert(object_id.to_owned(), Arc::clone(&entry));
                Some(entry)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(object_id, error = %e, "json cache read failed");
                None
            }
        }
    }

    pub fn put_json(&self, object_id: &str, body: &str) {
        self.json.insert(object_id.to_owned(), Arc::from(body));
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.write_json(object_id, body) {
                warn!(object_id, error = %e, "json cache write failed");
            }
        }
    }

    // ── Photo bytes ──────────────────────────────────────────────────

    pub fn get_photo(&self, object_id: &str) -> Option<Arc<[u8]>> {
        if let Some(hit) = self.photos.get(object_id) {
            trace!(object_id, "photo cache hit (memory)");
            return Some(Arc::clone(&hit));
        }

        let disk = self.disk.as_ref()?;
        match disk.read_photo(object_id) {
            Ok(Some(bytes)) => {
                let entry: Arc<[u8]> = Arc::from(bytes);
                self.photos
                    .insert(object_id.to_owned(), Arc::clone(&entry));
                Some(entry)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(object_id, error = %e, "photo cache read failed");
                None
            }
        }
    }

    pub fn put_photo(&self, object_id: &str, bytes: &[u8]) {
        self.photos.insert(object_id.to_owned(), Arc::from(bytes));
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.write_photo(object_id, bytes) {
                warn!(object_id, error = %e, "photo cache write failed");
            }
        }
    }

    // ── Invalidation ─────────────────────────────────────────────────

    /// Drop every cached entry for one id.
    pub fn flush_object(&self, object_id: &str) {
        self.json.remove(object_id);
        self.photos.remove(object_id);
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.remove(object_id) {
                warn!(object_id, error = %e, "cache remove failed");
            }
        }
    }

    /// Drop everything.
    pub fn flush_all(&self) {
        self.json.clear();
        self.photos.clear();
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.flush_all() {
                warn!(error = %e, "disk cache flush failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_roundtrip_and_flush() {
        let cache = ObjectCache::in_memory();

        assert!(cache.get_json("1").is_none());
        cache.put_json("1", r#"{"id":"1"}"#);
        assert_eq!(cache.get_json("1").unwrap().as_ref(), r#"{"id":"1"}"#);

        cache.flush_object("1");
        assert!(cache.get_json("1").is_none());
    }

    #[test]
    fn last_writer_wins_per_key() {
        let cache = ObjectCache::in_memory();
        cache.put_json("1", "old");
        cache.put_json("1", "new");
        assert_eq!(cache.get_json("1").unwrap().as_ref(), "new");
    }

    #[test]
    fn disk_backed_survives_memory_loss() {
        let dir = tempfile::tempdir().unwrap();

        {
            let cache = ObjectCache::with_disk(DiskCache::new(dir.path()).unwrap());
            cache.put_json("42", r#"{"id":"42"}"#);
            cache.put_photo("42", &[9, 9]);
        }

        // Fresh instance: memory empty, disk warm.
        let cache = ObjectCache::with_disk(DiskCache::new(dir.path()).unwrap());
        assert_eq!(cache.get_json("42").unwrap().as_ref(), r#"{"id":"42"}"#);
        assert_eq!(cache.get_photo("42").unwrap().as_ref(), [9, 9]);
    }

    #[test]
    fn flush_all_clears_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ObjectCache::with_disk(DiskCache::new(dir.path()).unwrap());

        cache.put_json("a", "{}");
        cache.put_photo("b", &[1]);
        cache.flush_all();

        assert!(cache.get_json("a").is_none());
        assert!(cache.get_photo("b").is_none());
    }

    #[test]
    fn flush_object_reaches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let disk = DiskCache::new(dir.path()).unwrap();
        let cache = ObjectCache::with_disk(disk.clone());

        cache.put_json("x", "{}");
        cache.flush_object("x");

        assert!(cache.get_json("x").is_none());
        assert_eq!(disk.read_json("x").unwrap(), None);
    }
}
