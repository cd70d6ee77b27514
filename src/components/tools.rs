use image::{Rgb, Rgba};

use crate::canvas::{Composite, Surface};
use crate::components::colors::hsl_to_rgb;

/// Dots painted per spray sample.
pub const SPRAY_SAMPLES: u32 = 15;
/// Largest spray dot radius.
pub const SPRAY_DOT_RADIUS: f32 = 2.0;
/// Dots painted per glitter sample.
pub const GLITTER_SAMPLES: u32 = 10;
/// Largest glitter dot radius.
pub const GLITTER_DOT_RADIUS: f32 = 3.0;
/// Glitter dots use full saturation at this lightness.
pub const GLITTER_LIGHTNESS: f32 = 0.7;

// ============================================================================
// MODES
// ============================================================================

/// Toggleable drawing modes. At most one is active; none active means
/// freehand for drags and stamp for clicks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContinuousMode {
    Spray,
    Eraser,
    Glitter,
}

impl ContinuousMode {
    pub fn label(&self) -> &'static str {
        match self {
            ContinuousMode::Spray => "spray",
            ContinuousMode::Eraser => "eraser",
            ContinuousMode::Glitter => "glitter",
        }
    }

    pub fn all() -> &'static [ContinuousMode] {
        &[
            ContinuousMode::Spray,
            ContinuousMode::Eraser,
            ContinuousMode::Glitter,
        ]
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// The effective drawing behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    Freehand,
    Spray,
    Eraser,
    Glitter,
    Stamp,
}

impl From<ContinuousMode> for ToolMode {
    fn from(mode: ContinuousMode) -> Self {
        match mode {
            ContinuousMode::Spray => ToolMode::Spray,
            ContinuousMode::Eraser => ToolMode::Eraser,
            ContinuousMode::Glitter => ToolMode::Glitter,
        }
    }
}

/// Result of a mode toggle, handed to collaborators that restyle buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChange {
    pub previous: Option<ContinuousMode>,
    pub current: Option<ContinuousMode>,
}

/// Exclusive toggle over the continuous modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeController {
    active: Option<ContinuousMode>,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selecting the active mode turns it off (back to freehand); selecting
    /// any other mode activates it and drops the rest.
    pub fn set_mode(&mut self, requested: ContinuousMode) -> ModeChange {
        let previous = self.active;
        self.active = if previous == Some(requested) {
            None
        } else {
            Some(requested)
        };
        ModeChange {
            previous,
            current: self.active,
        }
    }

    pub fn active(&self) -> Option<ContinuousMode> {
        self.active
    }

    pub fn is_active(&self, mode: ContinuousMode) -> bool {
        self.active == Some(mode)
    }

    /// Mode used for drag strokes.
    pub fn stroke_mode(&self) -> ToolMode {
        self.active.map(ToolMode::from).unwrap_or(ToolMode::Freehand)
    }

    /// Mode for a discrete click: stamp while no continuous mode is on.
    pub fn click_mode(&self) -> ToolMode {
        self.active.map(ToolMode::from).unwrap_or(ToolMode::Stamp)
    }
}

// ============================================================================
// BRUSH
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushState {
    pub color: Rgb<u8>,
    size: u32,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            color: Rgb([0xFF, 0x69, 0xB4]),
            size: 10,
        }
    }
}

impl BrushState {
    pub fn new(color: Rgb<u8>, size: u32) -> Self {
        Self {
            color,
            size: size.max(1),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sizes below 1 are raised to 1.
    pub fn set_size(&mut self, size: u32) {
        self.size = size.max(1);
    }

    pub fn rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.color.0;
        Rgba([r, g, b, 255])
    }
}

// ============================================================================
// RANDOMNESS
// ============================================================================

/// Small seeded generator for spray, glitter and stamp rotation. Seeded
/// sessions replay identically.
#[derive(Clone, Debug)]
pub struct StrokeRng {
    seed: u32,
    counter: u32,
}

impl StrokeRng {
    pub fn new(seed: u32) -> Self {
        Self { seed, counter: 0 }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.counter = self.counter.wrapping_add(1);
        let mut h = self
            .seed
            .wrapping_mul(374761393)
            .wrapping_add(self.counter.wrapping_mul(668265263))
            .wrapping_add(1013904223);
        h ^= h >> 13;
        h = h.wrapping_mul(1274126177);
        h ^= h >> 16;
        h
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }
}

// ============================================================================
// STROKES
// ============================================================================

/// One pointer sample: surface-local position plus the viewport position
/// the decorative layer uses.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    pub client_x: f32,
    pub client_y: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, client_x: f32, client_y: f32) -> Self {
        Self {
            x,
            y,
            client_x,
            client_y,
        }
    }

    /// Point whose viewport and surface coordinates coincide.
    pub fn local(x: f32, y: f32) -> Self {
        Self::new(x, y, x, y)
    }
}

/// In-progress stroke bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct StrokeState {
    drawing: bool,
    last_position: StrokePoint,
    painted: bool,
}

impl StrokeState {
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn last_position(&self) -> StrokePoint {
        self.last_position
    }

    /// Start a stroke. No pixels change until the first extension.
    pub fn begin(&mut self, point: StrokePoint) {
        self.drawing = true;
        self.last_position = point;
        self.painted = false;
    }

    /// Paint from the last position to `point` using `mode`. Returns false
    /// (and does nothing) when no stroke is active.
    pub fn extend(
        &mut self,
        surface: &mut Surface,
        point: StrokePoint,
        mode: ToolMode,
        brush: &BrushState,
        rng: &mut StrokeRng,
    ) -> bool {
        if !self.drawing {
            return false;
        }
        let from = (self.last_position.x, self.last_position.y);
        let to = (point.x, point.y);
        match mode {
            // Stamps are placed per click, never along a drag.
            ToolMode::Stamp => {
                self.last_position = point;
                return true;
            }
            ToolMode::Freehand => {
                surface.stroke_segment(from, to, brush.size() as f32, brush.rgba(), Composite::SourceOver);
            }
            ToolMode::Eraser => {
                surface.stroke_segment(from, to, brush.size() as f32, brush.rgba(), Composite::DestinationOut);
            }
            ToolMode::Spray => spray(surface, to, brush, rng),
            ToolMode::Glitter => glitter(surface, to, brush, rng),
        }
        self.last_position = point;
        self.painted = true;
        true
    }

    /// Finish the stroke and reset path state. Returns whether the stroke
    /// touched any pixels.
    pub fn end(&mut self) -> bool {
        let painted = self.painted;
        self.drawing = false;
        self.painted = false;
        painted
    }
}

/// Granular spray: samples from the square around `at`, keeps those
/// strictly inside the brush disc.
fn spray(surface: &mut Surface, at: (f32, f32), brush: &BrushState, rng: &mut StrokeRng) {
    let size = brush.size() as f32;
    let color = brush.rgba();
    for _ in 0..SPRAY_SAMPLES {
        let ox = at.0 + rng.range(-size, size);
        let oy = at.1 + rng.range(-size, size);
        let dist = ((ox - at.0).powi(2) + (oy - at.1).powi(2)).sqrt();
        if dist < size {
            let radius = rng.range(0.0, SPRAY_DOT_RADIUS);
            surface.fill_circle(ox, oy, radius, color, Composite::SourceOver);
        }
    }
}

/// Randomly colored sparkles around `at`; ignores the previous position.
fn glitter(surface: &mut Surface, at: (f32, f32), brush: &BrushState, rng: &mut StrokeRng) {
    let half = brush.size() as f32 / 2.0;
    for _ in 0..GLITTER_SAMPLES {
        let ox = at.0 + rng.range(-half, half);
        let oy = at.1 + rng.range(-half, half);
        let radius = rng.range(0.0, GLITTER_DOT_RADIUS);
        let hue = rng.next_f32();
        let (r, g, b) = hsl_to_rgb(hue, 1.0, GLITTER_LIGHTNESS);
        let color = Rgba([
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            255,
        ]);
        surface.fill_circle(ox, oy, radius, color, Composite::SourceOver);
    }
}
