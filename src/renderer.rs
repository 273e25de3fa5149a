//! Software rasterizer
//!
//! Draws a display list into a `FrameBuffer` of `0x00RRGGBB` pixels, the
//! format softbuffer presents directly. Everything is CPU-side so a preview
//! can be written to PNG on a machine with no display.

use std::path::Path;

use tracing::debug;

use crate::assets::{Bitmap, ImageStore};
use crate::ast::Color;
use crate::error::{Error, Result};
use crate::layout::Rect;
use crate::paint::{DisplayItem, DisplayList};
use crate::text::Typesetter;

/// Rounded rectangle that limits drawing, in pixel space
#[derive(Debug, Clone, Copy)]
struct Clip {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    radius: f32,
}

impl Clip {
    fn new(rect: Rect, radius: f32) -> Self {
        let radius = radius.max(0.0).min(rect.width / 2.0).min(rect.height / 2.0);
        Self {
            x0: rect.x.round(),
            y0: rect.y.round(),
            x1: rect.right().round(),
            y1: rect.bottom().round(),
            radius,
        }
    }

    /// Tests the pixel center.
    fn contains(&self, px: i32, py: i32) -> bool {
        let x = px as f32 + 0.5;
        let y = py as f32 + 0.5;
        if x < self.x0 || x >= self.x1 || y < self.y0 || y >= self.y1 {
            return false;
        }
        if self.radius <= 0.0 {
            return true;
        }
        let cx = x.clamp(self.x0 + self.radius, self.x1 - self.radius);
        let cy = y.clamp(self.y0 + self.radius, self.y1 - self.radius);
        let (dx, dy) = (x - cx, y - cy);
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Pixel buffer for rendering
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
    clips: Vec<Clip>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE.to_u32(); width * height],
            clips: vec![],
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_u32());
        self.clips.clear();
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn color_at(&self, x: usize, y: usize) -> Color {
        Color::from_u32(self.pixel(x, y))
    }

    pub fn push_clip(&mut self, rect: Rect, radius: f32) {
        self.clips.push(Clip::new(rect, radius));
    }

    pub fn pop_clip(&mut self) {
        self.clips.pop();
    }

    /// Part of `[x0, x1) x [y0, y1)` inside the buffer and every clip box.
    /// Empty ranges come back with `x1 <= x0` or `y1 <= y0`.
    fn visible_span(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> (i32, i32, i32, i32) {
        let (mut x0, mut y0) = (x0.max(0), y0.max(0));
        let (mut x1, mut y1) = (x1.min(self.width as i64), y1.min(self.height as i64));
        for c in &self.clips {
            x0 = x0.max(c.x0 as i64);
            y0 = y0.max(c.y0 as i64);
            x1 = x1.min(c.x1 as i64);
            y1 = y1.min(c.y1 as i64);
        }
        (x0 as i32, y0 as i32, x1.max(x0) as i32, y1.max(y0) as i32)
    }

    fn visible(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && self.clips.iter().all(|c| c.contains(x, y))
    }

    /// Blend `color` over the pixel with the given coverage.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: u8) {
        if alpha == 0 || !self.visible(x, y) {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if alpha == 255 {
            self.pixels[idx] = color.to_u32();
            return;
        }

        let bg = Color::from_u32(self.pixels[idx]);
        let a = alpha as u32;
        let inv_a = 255 - a;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * inv_a) / 255) as u8;
        self.pixels[idx] = Color::from_rgb(mix(color.r, bg.r), mix(color.g, bg.g), mix(color.b, bg.b)).to_u32();
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        let (x, y) = (x as i64, y as i64);
        self.fill_span(x, y, x + w as i64, y + h as i64, color);
    }

    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let (x0, y0, x1, y1) = self.visible_span(x0, y0, x1, y1);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color, color.a);
            }
        }
    }

    /// Outline drawn inside the rectangle. Corners are covered once.
    pub fn draw_rect_outline(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color, thickness: u32) {
        let (x, y) = (x as i64, y as i64);
        self.stroke_span(x, y, x + w as i64, y + h as i64, color, thickness as i64);
    }

    fn stroke_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color, thickness: i64) {
        let (w, h) = (x1 - x0, y1 - y0);
        let t = thickness.min((w + 1) / 2).min((h + 1) / 2);
        if t <= 0 {
            return;
        }
        // Top and bottom
        self.fill_span(x0, y0, x1, y0 + t, color);
        self.fill_span(x0, y1 - t, x1, y1, color);
        // Left and right, between them
        self.fill_span(x0, y0 + t, x0 + t, y1 - t, color);
        self.fill_span(x1 - t, y0 + t, x1, y1 - t, color);
    }

    /// Rows above `start_y` get `top`, the rest blend towards `bottom`
    /// which is reached on the last row.
    pub fn fill_vertical_gradient(&mut self, rect: Rect, start_y: f32, top: Color, bottom: Color) {
        let (x0, y0, x1, y1) = pixel_bounds(rect);
        let start = start_y.round() as i64;
        let span = (y1 - 1 - start).max(1) as f32;
        let (x0, y0, x1, y1) = self.visible_span(x0, y0, x1, y1);
        for py in y0..y1 {
            let row = py as i64;
            let color = if row < start {
                top
            } else {
                top.lerp(bottom, ((row - start) as f32 / span).clamp(0.0, 1.0))
            };
            if color.a == 0 {
                continue;
            }
            for px in x0..x1 {
                self.blend_pixel(px, py, color, color.a);
            }
        }
    }

    /// Draw `bitmap` scaled to fit inside `bounds`, centered, nearest neighbour.
    pub fn draw_bitmap_fit(&mut self, bitmap: &Bitmap, bounds: Rect) {
        if bitmap.width == 0 || bitmap.height == 0 || bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }
        let scale = (bounds.width / bitmap.width as f32).min(bounds.height / bitmap.height as f32);
        let w = bitmap.width as f32 * scale;
        let h = bitmap.height as f32 * scale;
        let dest = Rect::new(
            bounds.x + (bounds.width - w) / 2.0,
            bounds.y + (bounds.height - h) / 2.0,
            w,
            h,
        );

        let (x0, y0, x1, y1) = pixel_bounds(dest);
        let (x0, y0, x1, y1) = self.visible_span(x0, y0, x1, y1);
        for py in y0..y1 {
            let sy = (((py as f32 + 0.5 - dest.y) / scale) as u32).min(bitmap.height - 1);
            for px in x0..x1 {
                let sx = (((px as f32 + 0.5 - dest.x) / scale) as u32).min(bitmap.width - 1);
                let c = bitmap.pixel(sx, sy);
                self.blend_pixel(px, py, c, c.a);
            }
        }
    }

    /// Straight RGBA bytes, fully opaque.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let c = Color::from_u32(p);
            out.extend_from_slice(&[c.r, c.g, c.b, 255]);
        }
        out
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        let img = image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.to_rgba())
            .ok_or_else(|| Error::Other("frame buffer size mismatch".to_string()))?;
        img.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Rounded edges. Wide enough that no layout size overflows the
/// arithmetic done on them.
fn pixel_bounds(rect: Rect) -> (i64, i64, i64, i64) {
    let edge = |v: f32| (v.round() as i64).clamp(-EDGE_LIMIT, EDGE_LIMIT);
    (edge(rect.x), edge(rect.y), edge(rect.right()), edge(rect.bottom()))
}

const EDGE_LIMIT: i64 = 1 << 40;

/// The renderer
pub struct Renderer {
    typesetter: Typesetter,
}

impl Renderer {
    pub fn new(typesetter: Typesetter) -> Self {
        Self { typesetter }
    }

    pub fn typesetter(&self) -> &Typesetter {
        &self.typesetter
    }

    pub fn rasterize(&self, list: &DisplayList, fb: &mut FrameBuffer, images: &ImageStore) {
        for item in list.iter() {
            match item {
                DisplayItem::FillRect { rect, color } => {
                    let (x0, y0, x1, y1) = pixel_bounds(*rect);
                    fb.fill_span(x0, y0, x1, y1, *color);
                }
                DisplayItem::StrokeRect { rect, width, color } => {
                    let (x0, y0, x1, y1) = pixel_bounds(*rect);
                    let thickness = (width.round() as i64).clamp(0, EDGE_LIMIT);
                    fb.stroke_span(x0, y0, x1, y1, *color, thickness);
                }
                DisplayItem::Text { x, y, text, style } => {
                    self.typesetter.draw(fb, text, x.round() as i32, y.round() as i32, style.size, style.color);
                }
                DisplayItem::Image { id, bounds } => match images.get(id) {
                    Some(bitmap) => fb.draw_bitmap_fit(bitmap, *bounds),
                    None => debug!(id = id.as_str(), "image not in store, skipped"),
                },
                DisplayItem::VerticalGradient { rect, start_y, top, bottom } => {
                    fb.fill_vertical_gradient(*rect, *start_y, *top, *bottom);
                }
                DisplayItem::PushClip { rect, radius } => fb.push_clip(*rect, *radius),
                DisplayItem::PopClip => fb.pop_clip(),
            }
        }
    }
}
