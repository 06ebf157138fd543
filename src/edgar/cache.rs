use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

/// On-disk memoization of normalized filing text, keyed by source URL.
///
/// No TTL and no eviction: an entry is exactly what a successful
/// fetch-and-normalize of that URL produced when it was first cached.
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DocumentCache { dir: dir.into() }
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(format!("{}.txt", hex::encode(digest)))
    }

    pub fn get(&self, url: &str) -> Option<String> {
        let path = self.path_for(url);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("Failed to read cache entry {:?}: {}", path, e);
                None
            }
        }
    }

    /// Write-through on a successful fetch. A cache write failure is logged
    /// and swallowed; it must not fail the fetch that produced the text.
    pub fn put(&self, url: &str, text: &str) {
        let path = self.path_for(url);
        if let Err(e) = fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, text)) {
            log::warn!("Failed to write cache entry {:?}: {}", path, e);
        }
    }
}
