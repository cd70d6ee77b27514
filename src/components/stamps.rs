/// Edge length stamps are drawn at.
pub const STAMP_SIZE: u32 = 50;
/// Stamps are rotated by a random angle within ±this many degrees.
pub const STAMP_MAX_ROTATION_DEG: f32 = 22.5;

/// Round-robin sequence of stamp asset keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StampCarousel {
    stamps: Vec<String>,
    cursor: usize,
}

impl StampCarousel {
    pub fn new(stamps: Vec<String>) -> Self {
        Self { stamps, cursor: 0 }
    }

    /// Return the stamp under the cursor and advance it.
    pub fn advance(&mut self) -> Option<String> {
        if self.stamps.is_empty() {
            return None;
        }
        let key = self.stamps[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.stamps.len();
        Some(key)
    }

    pub fn peek(&self) -> Option<&str> {
        self.stamps.get(self.cursor).map(String::as_str)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn stamps(&self) -> &[String] {
        &self.stamps
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}
