//! Local gallery of saved artworks.
//!
//! The gallery is a single value (a bincode-encoded list of PNG entries)
//! kept under [`GALLERY_KEY`] in a durable key/value store. It holds at most
//! `capacity` entries; saving past that drops the oldest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PaintError;
use crate::{log_info, log_warn};

pub const GALLERY_KEY: &str = "rockyGallery";
pub const GALLERY_CAPACITY: usize = 10;

// ============================================================================
// Key/value storage
// ============================================================================

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PaintError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PaintError>;
    fn remove(&mut self, key: &str) -> Result<(), PaintError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PaintError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PaintError> {
        self.values.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PaintError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory. Writes go through a temporary file
/// and a rename so a crash never leaves a half-written value.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/RockPaint/storage`
    pub fn default_location() -> Self {
        Self::new(crate::logger::data_dir().join("RockPaint").join("storage"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.bin", safe))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PaintError> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PaintError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PaintError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Gallery
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: Uuid,
    /// PNG-encoded artwork
    pub png: Vec<u8>,
}

pub struct Gallery<S: KeyValueStore> {
    store: S,
    capacity: usize,
}

impl<S: KeyValueStore> Gallery<S> {
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, GALLERY_CAPACITY)
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored entries, oldest first. A corrupt stored value is an error.
    pub fn entries(&self) -> Result<Vec<GalleryEntry>, PaintError> {
        match self.store.get(GALLERY_KEY)? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append an artwork, evicting the oldest past capacity. Returns the new
    /// entry and how many entries are now stored. A corrupt stored gallery
    /// is replaced rather than blocking the save.
    pub fn save(&mut self, png: Vec<u8>) -> Result<(GalleryEntry, usize), PaintError> {
        let mut entries = match self.entries() {
            Ok(entries) => entries,
            Err(e) => {
                log_warn!("Gallery: discarding unreadable stored gallery: {}", e);
                Vec::new()
            }
        };

        let entry = GalleryEntry {
            id: Uuid::new_v4(),
            png,
        };
        entries.push(entry.clone());
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }

        let encoded = bincode::serialize(&entries)?;
        self.store.set(GALLERY_KEY, &encoded)?;
        log_info!("Gallery: saved artwork {} ({} stored)", entry.id, entries.len());
        Ok((entry, entries.len()))
    }

    pub fn len(&self) -> Result<usize, PaintError> {
        Ok(self.entries()?.len())
    }

    pub fn clear(&mut self) -> Result<(), PaintError> {
        self.store.remove(GALLERY_KEY)
    }
}
