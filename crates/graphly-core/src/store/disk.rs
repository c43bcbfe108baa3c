// ── File-backed cache ──
//
// Content-addressed by object id: one file per id under `json/` for raw
// payload text and `photos/` for image bytes. No TTL and no size bound;
// entries live until flushed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Path-per-id file cache for JSON payloads and photo binaries.
#[derive(Debug, Clone)]
pub struct DiskCache {
    json_dir: PathBuf,
    photos_dir: PathBuf,
}

impl DiskCache {
    /// Open (creating if needed) a cache rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let json_dir = root.join("json");
        let photos_dir = root.join("photos");
        fs::create_dir_all(&json_dir)?;
        fs::create_dir_all(&photos_dir)?;
        Ok(Self {
            json_dir,
            photos_dir,
        })
    }

    /// Where the JSON blob for `id` lives.
    pub fn json_path(&self, object_id: &str) -> PathBuf {
        self.json_dir.join(format!("{}.json", file_stem(object_id)))
    }

    /// Where the photo bytes for `id` live.
    pub fn photo_path(&self, object_id: &str) -> PathBuf {
        self.photos_dir.join(file_stem(object_id).into_owned())
    }

    pub fn read_json(&self, object_id: &str) -> io::Result<Option<String>> {
        read_optional(&self.json_path(object_id)).map(|bytes| {
            bytes.and_then(|b| String::from_utf8(b).ok())
        })
    }

    pub fn write_json(&self, object_id: &str, body: &str) -> io::Result<()> {
        fs::write(self.json_path(object_id), body)
    }

    pub fn read_photo(&self, object_id: &str) -> io::Result<Option<Vec<u8>>> {
        read_optional(&self.photo_path(object_id))
    }

    pub fn write_photo(&self, object_id: &str, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.photo_path(object_id), bytes)
    }

    /// Remove both cache entries for an id. Missing files are fine.
    pub fn remove(&self, object_id: &str) -> io::Result<()> {
        remove_if_present(&self.json_path(object_id))?;
        remove_if_present(&self.photo_path(object_id))
    }

    /// Wipe the whole cache, leaving the directories in place.
    pub fn flush_all(&self) -> io::Result<()> {
        debug!("flushing disk cache");
        for dir in [&self.json_dir, &self.photos_dir] {
            fs::remove_dir_all(dir)?;
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Object ids are opaque strings; keep them filesystem-safe.
fn file_stem(object_id: &str) -> std::borrow::Cow<'_, str> {
    if object_id.contains(['/', '\\']) {
        object_id.replace(['/', '\\'], "_").into()
    } else {
        object_id.into()
    }
}

fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        assert_eq!(cache.read_json("123").unwrap(), None);
        cache.write_json("123", r#"{"id":"123"}"#).unwrap();
        assert_eq!(
            cache.read_json("123").unwrap().as_deref(),
            Some(r#"{"id":"123"}"#)
        );

        cache.remove("123").unwrap();
        assert_eq!(cache.read_json("123").unwrap(), None);
        // Removing again is not an error.
        cache.remove("123").unwrap();
    }

    #[test]
    fn photo_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        let bytes = vec![0xFF, 0xD8, 0xFF];
        cache.write_photo("p1", &bytes).unwrap();
        assert_eq!(cache.read_photo("p1").unwrap(), Some(bytes));
    }

    #[test]
    fn flush_all_clears_both_trees() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        cache.write_json("a", "{}").unwrap();
        cache.write_photo("a", &[1, 2, 3]).unwrap();
        cache.flush_all().unwrap();

        assert_eq!(cache.read_json("a").unwrap(), None);
        assert_eq!(cache.read_photo("a").unwrap(), None);
        // Still usable after a flush.
        cache.write_json("b", "{}").unwrap();
        assert!(cache.read_json("b").unwrap().is_some());
    }

    #[test]
    fn ids_with_separators_stay_in_tree() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        cache.write_json("42/feed", "{}").unwrap();
        assert!(cache.json_path("42/feed").starts_with(dir.path()));
        assert!(cache.read_json("42/feed").unwrap().is_some());
    }
}
