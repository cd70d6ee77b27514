use image::{ImageFormat, RgbaImage};
use std::collections::VecDeque;

use crate::canvas::Surface;
use crate::error::PaintError;

/// Default number of snapshots kept.
pub const HISTORY_CAPACITY: usize = 20;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Full copy of the surface, stored as lossless PNG bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl Snapshot {
    pub fn capture(surface: &Surface) -> Result<Self, PaintError> {
        Self::from_image(surface.pixels())
    }

    pub fn from_image(image: &RgbaImage) -> Result<Self, PaintError> {
        Ok(Self {
            png: crate::io::encode_png(image)?,
            width: image.width(),
            height: image.height(),
        })
    }

    pub fn decode(&self) -> Result<RgbaImage, PaintError> {
        let img = image::load_from_memory_with_format(&self.png, ImageFormat::Png)?;
        Ok(img.to_rgba8())
    }

    /// Repaint `surface` with this snapshot's pixels.
    pub fn restore_into(&self, surface: &mut Surface) -> Result<(), PaintError> {
        surface.restore(self.decode()?);
        Ok(())
    }

    pub fn as_png(&self) -> &[u8] {
        &self.png
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn memory_size(&self) -> usize {
        self.png.len()
    }
}

// ============================================================================
// HISTORY STACK
// ============================================================================

/// Bounded append log of snapshots. Oldest entries fall off the front once
/// `capacity` is exceeded; undo pops from the back but never below one
/// entry, so the base state always survives.
#[derive(Debug)]
pub struct HistoryStack {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Drop the newest snapshot and repaint `surface` from the one below.
    /// Returns `Ok(false)` without touching anything when fewer than two
    /// snapshots exist.
    pub fn undo(&mut self, surface: &mut Surface) -> Result<bool, PaintError> {
        if self.entries.len() < 2 {
            return Ok(false);
        }
        let popped = self.entries.pop_back();
        let restored = match self.entries.back() {
            Some(top) => top.restore_into(surface),
            None => Ok(()),
        };
        if let Err(e) = restored {
            // Keep the stack consistent with what is on the surface.
            if let Some(snapshot) = popped {
                self.entries.push_back(snapshot);
            }
            return Err(e);
        }
        Ok(true)
    }

    pub fn top(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Encoded bytes held across all snapshots.
    pub fn memory_usage(&self) -> usize {
        self.entries.iter().map(Snapshot::memory_size).sum()
    }
}
