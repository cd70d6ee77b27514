use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Logical surface size of the rock canvas.
pub const SURFACE_WIDTH: u32 = 500;
pub const SURFACE_HEIGHT: u32 = 350;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How a painted pixel combines with what is already on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Composite {
    /// Normal alpha-over painting.
    #[default]
    SourceOver,
    /// Removes coverage: every touched pixel becomes fully transparent.
    DestinationOut,
}

/// On-screen bounding rectangle of the surface, in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CanvasBounds {
    pub left: f32,
    pub top: f32,
}

impl CanvasBounds {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }

    /// Viewport → surface-local coordinates.
    pub fn to_local(&self, client_x: f32, client_y: f32) -> (f32, f32) {
        (client_x - self.left, client_y - self.top)
    }
}

// ============================================================================
// SURFACE
// ============================================================================

/// The raster buffer the user paints on.
///
/// Every pixel is always defined; the surface starts fully transparent and
/// each mutation writes whole pixels.
#[derive(Clone, Debug)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(SURFACE_WIDTH, SURFACE_HEIGHT)
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// True when no pixel has any coverage.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }

    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = TRANSPARENT;
        }
    }

    /// Clear the surface and draw `base` stretched to fill its bounds.
    pub fn draw_base(&mut self, base: &RgbaImage) {
        let (w, h) = (self.width(), self.height());
        self.clear();
        if base.width() == 0 || base.height() == 0 {
            return;
        }
        if base.dimensions() == (w, h) {
            imageops::overlay(&mut self.pixels, base, 0, 0);
        } else {
            let scaled = imageops::resize(base, w, h, FilterType::Triangle);
            imageops::overlay(&mut self.pixels, &scaled, 0, 0);
        }
    }

    /// Replace the whole buffer with `image`, stretched if its size differs.
    pub fn restore(&mut self, image: RgbaImage) {
        let (w, h) = (self.width(), self.height());
        if image.dimensions() == (w, h) {
            self.pixels = image;
        } else {
            self.pixels = imageops::resize(&image, w, h, FilterType::Nearest);
        }
    }

    /// Paint a filled disc. Pixels whose centers lie within `radius` of
    /// `(cx, cy)` are touched; the pixel containing the center is always
    /// touched so tiny dots still leave a mark.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>, composite: Composite) {
        if radius <= 0.0 {
            return;
        }
        let Some((min_x, min_y, max_x, max_y)) = self.clip_box(cx - radius, cy - radius, cx + radius, cy + radius)
        else {
            return;
        };
        let r_sq = radius * radius;
        let center_px = (cx.floor() as i64, cy.floor() as i64);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r_sq || (x as i64, y as i64) == center_px {
                    self.apply(x, y, color, composite);
                }
            }
        }
    }

    /// Round-capped line segment of the given width. Each pixel is touched
    /// at most once, so translucent colors do not build up along the stroke.
    pub fn stroke_segment(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgba<u8>,
        composite: Composite,
    ) {
        let half = width / 2.0;
        if half <= 0.0 {
            return;
        }
        let Some((min_x, min_y, max_x, max_y)) = self.clip_box(
            from.0.min(to.0) - half,
            from.1.min(to.1) - half,
            from.0.max(to.0) + half,
            from.1.max(to.1) + half,
        ) else {
            return;
        };

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len_sq = dx * dx + dy * dy;
        let half_sq = half * half;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                // Project onto the segment, clamped to its endpoints (round caps).
                let t = if len_sq < 1e-6 {
                    0.0
                } else {
                    (((px - from.0) * dx + (py - from.1) * dy) / len_sq).clamp(0.0, 1.0)
                };
                let qx = from.0 + dx * t - px;
                let qy = from.1 + dy * t - py;
                if qx * qx + qy * qy <= half_sq {
                    self.apply(x, y, color, composite);
                }
            }
        }
    }

    /// Draw `image` scaled to `size` and centered at `(cx, cy)`, rotated
    /// by `rotation_deg` (clockwise in surface space). Nearest-neighbour
    /// sampling, source-over.
    pub fn draw_image_rotated(
        &mut self,
        image: &RgbaImage,
        cx: f32,
        cy: f32,
        size: (u32, u32),
        rotation_deg: f32,
    ) {
        let (dst_w, dst_h) = (size.0 as f32, size.1 as f32);
        if image.width() == 0 || image.height() == 0 || dst_w <= 0.0 || dst_h <= 0.0 {
            return;
        }
        let half_w = dst_w / 2.0;
        let half_h = dst_h / 2.0;
        // The rotated stamp fits inside the circle through its corners.
        let reach = (half_w * half_w + half_h * half_h).sqrt();
        let Some((min_x, min_y, max_x, max_y)) = self.clip_box(cx - reach, cy - reach, cx + reach, cy + reach)
        else {
            return;
        };

        // Inverse rotation maps surface pixels back into stamp space.
        let rad = -rotation_deg.to_radians();
        let (sin_a, cos_a) = rad.sin_cos();
        let scale_x = image.width() as f32 / dst_w;
        let scale_y = image.height() as f32 / dst_h;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let rx = x as f32 + 0.5 - cx;
                let ry = y as f32 + 0.5 - cy;
                let u = rx * cos_a - ry * sin_a + half_w;
                let v = rx * sin_a + ry * cos_a + half_h;
                if u < 0.0 || v < 0.0 || u >= dst_w || v >= dst_h {
                    continue;
                }
                let sx = ((u * scale_x) as u32).min(image.width() - 1);
                let sy = ((v * scale_y) as u32).min(image.height() - 1);
                let src = *image.get_pixel(sx, sy);
                self.apply(x, y, src, Composite::SourceOver);
            }
        }
    }

    fn apply(&mut self, x: u32, y: u32, color: Rgba<u8>, composite: Composite) {
        let dst = self.pixels.get_pixel_mut(x, y);
        *dst = match composite {
            Composite::SourceOver => blend_pixel(*dst, color),
            Composite::DestinationOut => {
                if color[3] == 0 {
                    *dst
                } else {
                    TRANSPARENT
                }
            }
        };
    }

    /// Clamp a float bounding box to pixel indices on the surface.
    fn clip_box(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(u32, u32, u32, u32)> {
        let w = self.width() as f32;
        let h = self.height() as f32;
        if x1 < 0.0 || y1 < 0.0 || x0 >= w || y0 >= h || w == 0.0 || h == 0.0 {
            return None;
        }
        let min_x = x0.max(0.0).floor() as u32;
        let min_y = y0.max(0.0).floor() as u32;
        let max_x = (x1.min(w - 1.0).floor() as u32).min(self.width() - 1);
        let max_y = (y1.min(h - 1.0).floor() as u32).min(self.height() - 1);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some((min_x, min_y, max_x, max_y))
    }
}

/// Source-over compositing of unpremultiplied RGBA.
pub fn blend_pixel(base: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    // Fast paths: nothing to add, or fully opaque top overwrites.
    if top[3] == 0 {
        return base;
    }
    if top[3] == 255 {
        return top;
    }

    let base_a = base[3] as f32 / 255.0;
    let top_a = top[3] as f32 / 255.0;

    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a == 0.0 {
        return TRANSPARENT;
    }

    let channel = |i: usize| {
        let b = base[i] as f32 / 255.0;
        let t = top[i] as f32 / 255.0;
        let out = (t * top_a + b * base_a * (1.0 - top_a)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
