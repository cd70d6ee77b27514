use std::collections::VecDeque;

use image::Rgb;

use crate::error::PaintError;

/// Default palette capacity.
pub const COLOR_HISTORY_CAPACITY: usize = 5;

/// Swatches shown before the user picks anything.
pub const DEFAULT_SWATCHES: [Rgb<u8>; 3] = [
    Rgb([0xFF, 0x69, 0xB4]),
    Rgb([0x00, 0xFF, 0x99]),
    Rgb([0xFF, 0xD7, 0x00]),
];

// ============================================================================
// ColorHistory: recently used brush colors
// ============================================================================

/// Up to `capacity` distinct colors, oldest first. Adding a new color past
/// capacity drops the oldest; re-adding a known color changes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorHistory {
    colors: VecDeque<Rgb<u8>>,
    capacity: usize,
}

impl Default for ColorHistory {
    fn default() -> Self {
        Self::with_colors(COLOR_HISTORY_CAPACITY, DEFAULT_SWATCHES)
    }
}

impl ColorHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            colors: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn with_colors(capacity: usize, colors: impl IntoIterator<Item = Rgb<u8>>) -> Self {
        let mut history = Self::new(capacity);
        for c in colors {
            history.record(c);
        }
        history
    }

    /// Returns true when the palette changed.
    pub fn record(&mut self, color: Rgb<u8>) -> bool {
        if self.colors.contains(&color) {
            return false;
        }
        self.colors.push_back(color);
        while self.colors.len() > self.capacity {
            self.colors.pop_front();
        }
        true
    }

    pub fn colors(&self) -> impl Iterator<Item = &Rgb<u8>> {
        self.colors.iter()
    }

    pub fn to_vec(&self) -> Vec<Rgb<u8>> {
        self.colors.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ============================================================================
// Color conversion helpers
// ============================================================================

/// Parse `#RRGGBB` (leading `#` optional, case-insensitive).
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>, PaintError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(PaintError::InvalidInput(format!("expected #RRGGBB, got '{}'", s)));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| PaintError::InvalidInput(format!("bad hex color '{}'", s)))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

pub fn to_hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// HSL (H: 0..1, S: 0..1, L: 0..1) → RGB (0..1)
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s.abs() < 1e-6 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 { t += 1.0; }
    if t > 1.0 { t -= 1.0; }
    if t < 1.0 / 6.0 { return p + (q - p) * 6.0 * t; }
    if t < 1.0 / 2.0 { return q; }
    if t < 2.0 / 3.0 { return p + (q - p) * (2.0 / 3.0 - t) * 6.0; }
    p
}
