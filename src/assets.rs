//! Image assets (base rocks and stamps) and their deferred loading.
//!
//! Every operation that needs an image is split in two: a request that is
//! queued with a ticket, and a continuation that runs once the image is
//! available. Base image requests carry a generation number; only the most
//! recent one may repaint the surface, so a slow load can never overwrite
//! a newer choice.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::components::tools::StrokePoint;
use crate::error::PaintError;

pub type Ticket = u64;

/// Result of loading one asset. Errors are human-readable diagnostics.
pub type LoadResult = Result<Arc<RgbaImage>, String>;

// ============================================================================
// Asset sources
// ============================================================================

/// Where asset bytes come from.
pub trait AssetSource: Sync {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, PaintError>;
}

/// Assets stored as files under a root directory.
#[derive(Clone, Debug)]
pub struct FileAssetSource {
    root: PathBuf,
}

impl FileAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let rel = Path::new(key);
        // Keys stay inside the asset root.
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(rel))
    }
}

impl AssetSource for FileAssetSource {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, PaintError> {
        let path = self
            .resolve(key)
            .ok_or_else(|| PaintError::AssetMissing(key.to_string()))?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PaintError::AssetMissing(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory assets, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(key.into(), bytes);
    }

    /// Store `image` PNG-encoded under `key`.
    pub fn insert_image(&mut self, key: impl Into<String>, image: &RgbaImage) -> Result<(), PaintError> {
        let bytes = crate::io::encode_png(image)?;
        self.insert(key, bytes);
        Ok(())
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, PaintError> {
        self.assets
            .get(key)
            .cloned()
            .ok_or_else(|| PaintError::AssetMissing(key.to_string()))
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, PaintError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

// ============================================================================
// Pending loads
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum LoadPurpose {
    /// Repaint the surface with a new base image.
    Base { generation: u64, cleared: bool },
    /// Draw a stamp at `at` with the rotation chosen at click time.
    Stamp { at: StrokePoint, rotation_deg: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PendingLoad {
    pub ticket: Ticket,
    pub key: String,
    pub purpose: LoadPurpose,
}

/// Queue of outstanding image requests plus a decoded-image cache.
#[derive(Debug, Default)]
pub struct AssetLoader {
    next_ticket: Ticket,
    base_generation: u64,
    pending: Vec<PendingLoad>,
    cache: HashMap<String, Arc<RgbaImage>>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a base image load. Supersedes every earlier base request.
    pub fn request_base(&mut self, key: &str, cleared: bool) -> Ticket {
        self.base_generation += 1;
        let generation = self.base_generation;
        self.enqueue(key, LoadPurpose::Base { generation, cleared })
    }

    pub fn request_stamp(&mut self, key: &str, at: StrokePoint, rotation_deg: f32) -> Ticket {
        self.enqueue(key, LoadPurpose::Stamp { at, rotation_deg })
    }

    fn enqueue(&mut self, key: &str, purpose: LoadPurpose) -> Ticket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending.push(PendingLoad {
            ticket,
            key: key.to_string(),
            purpose,
        });
        ticket
    }

    pub fn pending(&self) -> &[PendingLoad] {
        &self.pending
    }

    /// Remove one pending load so its completion can be delivered.
    pub fn take(&mut self, ticket: Ticket) -> Option<PendingLoad> {
        let idx = self.pending.iter().position(|p| p.ticket == ticket)?;
        Some(self.pending.remove(idx))
    }

    pub fn base_generation(&self) -> u64 {
        self.base_generation
    }

    pub fn is_current_base(&self, generation: u64) -> bool {
        generation == self.base_generation
    }

    pub fn cached(&self, key: &str) -> Option<Arc<RgbaImage>> {
        self.cache.get(key).cloned()
    }

    pub fn cache_insert(&mut self, key: &str, image: Arc<RgbaImage>) {
        self.cache.insert(key.to_string(), image);
    }

    /// Drain every pending load, fetching and decoding uncached assets in
    /// parallel. Results come back in request order.
    pub fn resolve_all(&mut self, source: &dyn AssetSource) -> Vec<(PendingLoad, LoadResult)> {
        let loads = std::mem::take(&mut self.pending);

        let mut missing: Vec<&str> = loads
            .iter()
            .map(|l| l.key.as_str())
            .filter(|k| !self.cache.contains_key(*k))
            .collect();
        missing.sort_unstable();
        missing.dedup();

        let fetched: Vec<(String, Result<RgbaImage, PaintError>)> = missing
            .par_iter()
            .map(|key| {
                let decoded = source.fetch(key).and_then(|bytes| decode_image(&bytes));
                (key.to_string(), decoded)
            })
            .collect();

        let mut failures: HashMap<String, String> = HashMap::new();
        for (key, decoded) in fetched {
            match decoded {
                Ok(img) => {
                    self.cache.insert(key, Arc::new(img));
                }
                Err(e) => {
                    failures.insert(key, e.to_string());
                }
            }
        }

        loads
            .into_iter()
            .map(|load| {
                let result = match self.cache.get(&load.key) {
                    Some(img) => Ok(Arc::clone(img)),
                    None => Err(failures
                        .get(&load.key)
                        .cloned()
                        .unwrap_or_else(|| format!("Asset not found: {}", load.key))),
                };
                (load, result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn source_with(keys: &[&str]) -> MemoryAssetSource {
        let mut src = MemoryAssetSource::new();
        for k in keys {
            src.insert_image(*k, &RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])))
                .unwrap();
        }
        src
    }

    #[test]
    fn base_requests_bump_generation() {
        let mut loader = AssetLoader::new();
        let first = loader.request_base("a.png", false);
        let second = loader.request_base("b.png", false);
        assert_ne!(first, second);
        assert_eq!(loader.base_generation(), 2);
        assert!(loader.is_current_base(2));
        assert!(!loader.is_current_base(1));
    }

    #[test]
    fn resolve_all_keeps_request_order_and_reports_failures() {
        let src = source_with(&["a.png", "b.png"]);
        let mut loader = AssetLoader::new();
        loader.request_stamp("b.png", StrokePoint::default(), 0.0);
        loader.request_stamp("missing.png", StrokePoint::default(), 0.0);
        loader.request_base("a.png", false);

        let results = loader.resolve_all(&src);
        let keys: Vec<_> = results.iter().map(|(l, _)| l.key.as_str()).collect();
        assert_eq!(keys, vec!["b.png", "missing.png", "a.png"]);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.as_ref().unwrap_err().contains("missing.png"));
        assert!(loader.pending().is_empty());
        assert!(loader.cached("a.png").is_some());
    }

    #[test]
    fn take_removes_single_ticket() {
        let mut loader = AssetLoader::new();
        let t1 = loader.request_stamp("x", StrokePoint::default(), 0.0);
        let t2 = loader.request_stamp("y", StrokePoint::default(), 0.0);
        assert_eq!(loader.take(t1).map(|l| l.key), Some("x".to_string()));
        assert!(loader.take(t1).is_none());
        assert_eq!(loader.pending().len(), 1);
        assert_eq!(loader.pending()[0].ticket, t2);
    }

    #[test]
    fn file_source_rejects_escaping_keys() {
        let src = FileAssetSource::new(std::env::temp_dir());
        assert!(matches!(src.fetch("../etc/passwd"), Err(PaintError::AssetMissing(_))));
        assert!(matches!(
            src.fetch("rockpaint-definitely-missing.png"),
            Err(PaintError::AssetMissing(_))
        ));
    }

    #[test]
    fn undecodable_bytes_fail() {
        assert!(decode_image(b"not an image").is_err());
    }
}
