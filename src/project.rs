use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgb, RgbaImage};
use uuid::Uuid;

use crate::assets::{AssetLoader, AssetSource, LoadPurpose, LoadResult, PendingLoad, Ticket};
use crate::canvas::{CanvasBounds, SURFACE_HEIGHT, SURFACE_WIDTH, Surface};
use crate::components::colors::{ColorHistory, DEFAULT_SWATCHES, parse_hex_color};
use crate::components::history::{HistoryStack, Snapshot};
use crate::components::stamps::{STAMP_MAX_ROTATION_DEG, STAMP_SIZE, StampCarousel};
use crate::components::tools::{
    BrushState, ContinuousMode, ModeChange, ModeController, StrokePoint, StrokeRng, StrokeState,
    ToolMode,
};
use crate::error::PaintError;
use crate::gallery::{Gallery, KeyValueStore};
use crate::settings::PainterSettings;
use crate::{log_err, log_info, log_warn};

/// Operations that end with a history snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommittedOp {
    Stroke,
    Stamp,
    BaseReplaced,
    Cleared,
    Undo,
}

/// Notifications for the presentation layer (button styles, palette,
/// effects, gallery toasts). Drained with [`Project::take_events`].
#[derive(Clone, Debug, PartialEq)]
pub enum PainterEvent {
    ModeChanged(ModeChange),
    Committed(CommittedOp),
    ColorHistoryChanged(Vec<Rgb<u8>>),
    AssetFailed { key: String, reason: String },
    GallerySaved { id: Uuid, stored: usize },
    GallerySaveFailed(String),
}

/// One painting session: the surface and everything that mutates it.
pub struct Project {
    pub id: Uuid,
    settings: PainterSettings,
    surface: Surface,
    history: HistoryStack,
    modes: ModeController,
    brush: BrushState,
    colors: ColorHistory,
    stamps: StampCarousel,
    stroke: StrokeState,
    /// Where the current press started, and whether it has left the click
    /// tolerance since.
    press: Option<StrokePoint>,
    press_moved: bool,
    bounds: CanvasBounds,
    rng: StrokeRng,
    loader: AssetLoader,
    current_base: String,
    events: Vec<PainterEvent>,
}

impl Project {
    /// New session with the base image request already queued. The surface
    /// stays transparent and the history empty until that load completes.
    pub fn new(settings: PainterSettings) -> Self {
        let mut colors = ColorHistory::with_colors(settings.color_history_capacity, DEFAULT_SWATCHES);
        colors.record(settings.brush_color);

        let mut project = Self {
            id: Uuid::new_v4(),
            surface: Surface::new(SURFACE_WIDTH, SURFACE_HEIGHT),
            history: HistoryStack::new(settings.history_capacity),
            modes: ModeController::new(),
            brush: BrushState::new(settings.brush_color, settings.brush_size),
            colors,
            stamps: StampCarousel::new(settings.stamps.clone()),
            stroke: StrokeState::default(),
            press: None,
            press_moved: false,
            bounds: CanvasBounds::default(),
            rng: StrokeRng::new(settings.seed),
            loader: AssetLoader::new(),
            current_base: settings.base_image.clone(),
            events: Vec::new(),
            settings,
        };
        let base = project.current_base.clone();
        project.loader.request_base(&base, false);
        log_info!("Session {} started with base '{}'", project.id, base);
        project
    }

    // -- Accessors --------------------------------------------------------

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn pixels(&self) -> &RgbaImage {
        self.surface.pixels()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn color_history(&self) -> &ColorHistory {
        &self.colors
    }

    pub fn stamps(&self) -> &StampCarousel {
        &self.stamps
    }

    pub fn current_base(&self) -> &str {
        &self.current_base
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_drawing()
    }

    pub fn pending_loads(&self) -> &[PendingLoad] {
        self.loader.pending()
    }

    pub fn take_events(&mut self) -> Vec<PainterEvent> {
        std::mem::take(&mut self.events)
    }

    /// Update the on-screen rectangle used to translate pointer input.
    pub fn set_bounds(&mut self, bounds: CanvasBounds) {
        self.bounds = bounds;
    }

    // -- Pointer input ----------------------------------------------------

    fn point_at(&self, client_x: f32, client_y: f32) -> StrokePoint {
        let (x, y) = self.bounds.to_local(client_x, client_y);
        StrokePoint::new(x, y, client_x, client_y)
    }

    pub fn pointer_down(&mut self, client_x: f32, client_y: f32) {
        let point = self.point_at(client_x, client_y);
        self.press = Some(point);
        self.press_moved = false;
        self.stroke.begin(point);
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) {
        if !self.stroke.is_drawing() {
            return;
        }
        let point = self.point_at(client_x, client_y);
        if let Some(origin) = self.press {
            let dist = ((point.x - origin.x).powi(2) + (point.y - origin.y).powi(2)).sqrt();
            if dist > self.settings.click_tolerance {
                self.press_moved = true;
            }
        }
        let mode = self.modes.stroke_mode();
        self.stroke
            .extend(&mut self.surface, point, mode, &self.brush, &mut self.rng);
    }

    /// Release. A press that never left the click tolerance places a stamp
    /// when no continuous mode is on.
    pub fn pointer_up(&mut self, client_x: f32, client_y: f32) -> Option<Ticket> {
        let was_click = self.press.is_some() && !self.press_moved;
        self.finish_stroke();
        if was_click {
            self.click(client_x, client_y)
        } else {
            None
        }
    }

    /// Pointer left the surface or the gesture was cancelled. Never stamps.
    pub fn pointer_cancel(&mut self) {
        self.finish_stroke();
    }

    fn finish_stroke(&mut self) {
        self.press = None;
        self.press_moved = false;
        let painted = self.stroke.end();
        // Strokes are only individually undoable when asked for; otherwise
        // the next stamp, base change or clear captures them.
        if painted && self.settings.snapshot_strokes {
            self.commit(CommittedOp::Stroke);
        }
    }

    /// Discrete click: requests the next stamp from the carousel. Ignored
    /// while a stroke is in progress or a continuous mode is on.
    pub fn click(&mut self, client_x: f32, client_y: f32) -> Option<Ticket> {
        if self.stroke.is_drawing() || self.modes.click_mode() != ToolMode::Stamp {
            return None;
        }
        let point = self.point_at(client_x, client_y);
        let Some(key) = self.stamps.advance() else {
            log_warn!("Stamp requested but the stamp carousel is empty");
            return None;
        };
        let rotation = self
            .rng
            .range(-STAMP_MAX_ROTATION_DEG, STAMP_MAX_ROTATION_DEG);
        Some(self.loader.request_stamp(&key, point, rotation))
    }

    // -- Controls ---------------------------------------------------------

    pub fn set_mode(&mut self, mode: ContinuousMode) -> ModeChange {
        let change = self.modes.set_mode(mode);
        log_info!(
            "Mode {:?} -> {:?}",
            change.previous.map(|m| m.label()),
            change.current.map(|m| m.label())
        );
        self.events.push(PainterEvent::ModeChanged(change));
        change
    }

    pub fn set_brush_color(&mut self, color: Rgb<u8>) {
        self.brush.color = color;
        if self.colors.record(color) {
            self.events
                .push(PainterEvent::ColorHistoryChanged(self.colors.to_vec()));
        }
    }

    pub fn set_brush_color_hex(&mut self, hex: &str) -> Result<(), PaintError> {
        let color = parse_hex_color(hex)?;
        self.set_brush_color(color);
        Ok(())
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.set_size(size);
    }

    /// Switch the base rock. The surface is repainted once the image loads;
    /// any earlier base request still in flight is superseded.
    pub fn request_base(&mut self, key: &str) -> Ticket {
        self.current_base = key.to_string();
        self.loader.request_base(key, false)
    }

    /// Reset to the current base, discarding all strokes and stamps.
    pub fn clear(&mut self) -> Ticket {
        let key = self.current_base.clone();
        self.loader.request_base(&key, true)
    }

    /// Returns true when a snapshot was popped and the surface repainted.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.surface) {
            Ok(true) => {
                self.events.push(PainterEvent::Committed(CommittedOp::Undo));
                true
            }
            Ok(false) => false,
            Err(e) => {
                log_err!("Undo failed, keeping current surface: {}", e);
                false
            }
        }
    }

    // -- Asset continuations ----------------------------------------------

    /// Resolve every queued image request against `source` and run the
    /// continuations in request order. Returns how many were applied.
    pub fn pump_loads(&mut self, source: &dyn AssetSource) -> usize {
        let results = self.loader.resolve_all(source);
        results
            .into_iter()
            .filter(|(load, result)| self.finish_load(load, result))
            .count()
    }

    /// Deliver one completion from an external loader, in whatever order
    /// loads finish. Unknown tickets are ignored.
    pub fn complete_load(&mut self, ticket: Ticket, result: Result<RgbaImage, String>) -> bool {
        let Some(load) = self.loader.take(ticket) else {
            return false;
        };
        let result: LoadResult = result.map(|img| {
            let img = Arc::new(img);
            self.loader.cache_insert(&load.key, Arc::clone(&img));
            img
        });
        self.finish_load(&load, &result)
    }

    fn finish_load(&mut self, load: &PendingLoad, result: &LoadResult) -> bool {
        let image = match result {
            Ok(image) => image,
            Err(reason) => {
                log_err!("Failed to load image '{}': {}", load.key, reason);
                self.events.push(PainterEvent::AssetFailed {
                    key: load.key.clone(),
                    reason: reason.clone(),
                });
                return false;
            }
        };

        match load.purpose {
            LoadPurpose::Base { generation, cleared } => {
                if !self.loader.is_current_base(generation) {
                    log_warn!(
                        "Dropping stale base image '{}' (generation {} < {})",
                        load.key,
                        generation,
                        self.loader.base_generation()
                    );
                    return false;
                }
                self.surface.draw_base(image);
                let op = if cleared {
                    CommittedOp::Cleared
                } else {
                    CommittedOp::BaseReplaced
                };
                self.commit(op);
            }
            LoadPurpose::Stamp { at, rotation_deg } => {
                self.surface
                    .draw_image_rotated(image, at.x, at.y, (STAMP_SIZE, STAMP_SIZE), rotation_deg);
                self.commit(CommittedOp::Stamp);
            }
        }
        true
    }

    /// Snapshot the surface. Collaborators only hear about snapshots that
    /// actually landed in the history.
    fn commit(&mut self, op: CommittedOp) {
        match Snapshot::capture(&self.surface) {
            Ok(snapshot) => {
                self.history.push(snapshot);
                self.events.push(PainterEvent::Committed(op));
            }
            Err(e) => {
                log_err!("Could not snapshot surface after {:?}: {}", op, e);
            }
        }
    }

    // -- Export -----------------------------------------------------------

    pub fn export_png(&self) -> Result<Vec<u8>, PaintError> {
        crate::io::encode_png(self.surface.pixels())
    }

    /// Write the artwork as PNG; a directory receives `my_rocky_art.png`.
    pub fn download(&self, path: &Path) -> Result<PathBuf, PaintError> {
        let written = crate::io::write_png(self.surface.pixels(), path)?;
        log_info!("Artwork written to {}", written.display());
        Ok(written)
    }

    pub fn save_to_gallery<S: KeyValueStore>(&mut self, gallery: &mut Gallery<S>) -> Result<Uuid, PaintError> {
        let saved = self
            .export_png()
            .and_then(|png| gallery.save(png))
            .map(|(entry, stored)| (entry.id, stored));
        match saved {
            Ok((id, stored)) => {
                self.events.push(PainterEvent::GallerySaved { id, stored });
                Ok(id)
            }
            Err(e) => {
                log_err!("Saving to gallery failed: {}", e);
                self.events.push(PainterEvent::GallerySaveFailed(e.to_string()));
                Err(e)
            }
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(PainterSettings::default())
    }
}
