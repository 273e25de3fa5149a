//! Text measurement and drawing
//!
//! With a font file configured, glyphs come from `fontdue`. Without one the
//! typesetter falls back to solid block glyphs with a fixed advance, which
//! keeps layout deterministic on machines with no fonts at all.

use std::path::Path;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};

use crate::ast::Color;
use crate::error::{Error, Result};
use crate::renderer::FrameBuffer;

/// Advance of a fallback glyph, as a fraction of the font size
pub const FALLBACK_ADVANCE: f32 = 0.55;

/// Extra leading added to the font size for fallback lines
pub const FALLBACK_LEADING: f32 = 6.0;

pub struct Typesetter {
    font: Option<Font>,
}

impl Typesetter {
    pub fn fallback() -> Self {
        Self { font: None }
    }

    pub fn from_font_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings {
            scale: 40.0,
            ..FontSettings::default()
        })
        .map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self { font: Some(font) })
    }

    pub fn from_font_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_font_bytes(&bytes)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Ascent, descent (positive) and line gap in pixels.
    pub fn line_metrics(&self, size: f32) -> (f32, f32, f32) {
        match self.font.as_ref().and_then(|f| f.horizontal_line_metrics(size)) {
            Some(m) => (m.ascent.ceil(), (-m.descent).ceil(), m.line_gap.ceil()),
            None => (size.ceil(), FALLBACK_LEADING, 0.0),
        }
    }

    pub fn line_height(&self, size: f32) -> f32 {
        let (ascent, descent, gap) = self.line_metrics(size);
        ascent + descent + gap
    }

    /// Width of a single line.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let Some(font) = &self.font else {
            return text.chars().count() as f32 * size * FALLBACK_ADVANCE;
        };
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, size, 0));
        match layout.glyphs().last() {
            Some(last) => (last.x + last.width as f32).ceil(),
            None => 0.0,
        }
    }

    /// Greedy word wrap. A single word wider than `width` gets its own line.
    pub fn wrap(&self, content: &str, size: f32, width: f32) -> Vec<String> {
        if content.is_empty() {
            return vec![];
        }

        let mut lines: Vec<String> = vec![];
        let mut current = String::new();
        for word in content.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if self.measure(&candidate, size) <= width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Size of a wrapped paragraph.
    pub fn measure_block(&self, content: &str, size: f32, width: f32) -> (f32, f32) {
        let lines = self.wrap(content, size, width);
        let w = lines
            .iter()
            .map(|l| self.measure(l, size))
            .fold(0.0f32, f32::max);
        (w, lines.len() as f32 * self.line_height(size))
    }

    /// Draw one line with its line box starting at `top`.
    pub fn draw(&self, fb: &mut FrameBuffer, text: &str, x: i32, top: i32, size: f32, color: Color) {
        let (ascent, _, _) = self.line_metrics(size);
        let baseline = top + ascent as i32;

        let Some(font) = &self.font else {
            self.draw_blocks(fb, text, x, baseline, size, color);
            return;
        };

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: x as f32,
            y: 0.0,
            ..LayoutSettings::default()
        });
        layout.append(&[font], &TextStyle::new(text, size, 0));
        let baseline_in_layout = layout
            .lines()
            .and_then(|lines| lines.first().map(|l| l.baseline_y.round() as i32))
            .unwrap_or(0);
        let dy = baseline - baseline_in_layout;

        for glyph in layout.glyphs() {
            let (metrics, bitmap) = font.rasterize_config(glyph.key);
            let gx = glyph.x.round() as i32;
            let gy = glyph.y.round() as i32 + dy;

            for (i, alpha) in bitmap.iter().enumerate() {
                if *alpha == 0 {
                    continue;
                }
                let px = gx + (i % metrics.width) as i32;
                let py = gy + (i / metrics.width) as i32;
                let a = (*alpha as u32 * color.a as u32 / 255) as u8;
                fb.blend_pixel(px, py, color, a);
            }
        }
    }

    fn draw_blocks(&self, fb: &mut FrameBuffer, text: &str, x: i32, baseline: i32, size: f32, color: Color) {
        let advance = size * FALLBACK_ADVANCE;
        let glyph_h = (size * 0.7).round().max(1.0) as u32;
        let glyph_w = (advance - 2.0).round().max(1.0) as u32;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = x + (i as f32 * advance).round() as i32 + 1;
            fb.fill_rect(gx, baseline - glyph_h as i32, glyph_w, glyph_h, color);
        }
    }
}
