//! Preview runtime
//!
//! Owns one description tree together with the resources it needs (font,
//! images, canvas color) and turns it into pixels on demand. Each render is
//! a fresh pass: validate, lay out, paint, rasterize. Nothing is cached
//! between passes, so a resized window simply renders again.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::assets::ImageStore;
use crate::ast::{validate, Color, Node};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::layout::{layout, Size};
use crate::paint::{paint, DisplayList};
use crate::parser;
use crate::renderer::{FrameBuffer, Renderer};
use crate::sandbox::{Sandbox, MAX_LAYOUT_FILE_BYTES};
use crate::text::Typesetter;

/// The preview runtime
pub struct Preview {
    root: Node,
    renderer: Renderer,
    images: ImageStore,
    background: Color,
}

impl Preview {
    /// Load the configured font and asset directory around `root`.
    ///
    /// A font that fails to load falls back to block glyphs; a missing
    /// asset directory is an error since cards would have nothing to show.
    pub fn new(root: Node, config: &Config) -> Result<Self> {
        let typesetter = match &config.font_path {
            Some(path) => match Typesetter::from_font_file(path) {
                Ok(ts) => {
                    info!("Using font {}", path.display());
                    ts
                }
                Err(err) => {
                    warn!("Falling back to block glyphs: {}", err);
                    Typesetter::fallback()
                }
            },
            None => Typesetter::fallback(),
        };

        let mut images = ImageStore::new();
        if let Some(dir) = &config.assets_dir {
            images.load_dir(dir)?;
        }

        Ok(Self::with_parts(root, typesetter, images, config.background_color()?))
    }

    pub fn with_parts(root: Node, typesetter: Typesetter, images: ImageStore, background: Color) -> Self {
        Self {
            root,
            renderer: Renderer::new(typesetter),
            images,
            background,
        }
    }

    /// Parse a `.layout` file and build a preview for it.
    pub fn from_file(path: &Path, config: &Config) -> Result<Self> {
        let sandbox = Sandbox::new();
        sandbox.validate_layout_path(path)?;
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        sandbox.check_file_size(source.len(), MAX_LAYOUT_FILE_BYTES)?;

        let root = parser::parse(&source)?;
        info!("Parsed {}", path.display());
        Self::new(root, config)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageStore {
        &mut self.images
    }

    pub fn display_list(&self, width: u32, height: u32) -> Result<DisplayList> {
        validate(&self.root, &self.images)?;
        let ts = self.renderer.typesetter();
        let tree = layout(&self.root, Size::new(width as f32, height as f32), ts);
        Ok(paint(&tree, ts))
    }

    pub fn render(&self, width: u32, height: u32) -> Result<FrameBuffer> {
        let mut fb = FrameBuffer::new(width as usize, height as usize);
        self.render_into(&mut fb)?;
        Ok(fb)
    }

    /// Render into an existing buffer, sized by the buffer.
    pub fn render_into(&self, fb: &mut FrameBuffer) -> Result<()> {
        let list = self.display_list(fb.width as u32, fb.height as u32)?;
        fb.clear(self.background);
        self.renderer.rasterize(&list, fb, &self.images);
        debug!(items = list.len(), width = fb.width, height = fb.height, "rendered frame");
        Ok(())
    }

    pub fn layout_report(&self, width: u32, height: u32) -> Result<String> {
        validate(&self.root, &self.images)?;
        let tree = layout(
            &self.root,
            Size::new(width as f32, height as f32),
            self.renderer.typesetter(),
        );
        Ok(tree.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Bitmap;
    use crate::ast::{Container, ImageCard, Length};

    fn preview(root: Node) -> Preview {
        Preview::with_parts(root, Typesetter::fallback(), ImageStore::new(), Color::WHITE)
    }

    #[test]
    fn test_render_fills_background() {
        let root: Node = Container::column().into();
        let p = Preview::with_parts(root, Typesetter::fallback(), ImageStore::new(), Color::YELLOW);
        let fb = p.render(8, 4).unwrap();
        assert!(fb.pixels.iter().all(|&px| px == Color::YELLOW.to_u32()));
    }

    #[test]
    fn test_render_rejects_missing_image() {
        let root: Node = ImageCard::new("nope", "", "t").into();
        assert!(matches!(preview(root).render(10, 10), Err(Error::MissingImage(_))));
    }

    #[test]
    fn test_render_rejects_bad_fraction() {
        let root: Node = Container::column().width(Length::Fraction(1.2)).into();
        assert!(matches!(preview(root).render(10, 10), Err(Error::InvalidFraction(_))));
    }

    #[test]
    fn test_images_mut_makes_card_renderable() {
        let root: Node = ImageCard::new("aj1", "", "t").into();
        let mut p = preview(root);
        p.images_mut().insert("aj1", Bitmap::solid(4, 4, Color::RED));
        assert!(p.render(40, 200).is_ok());
    }

    #[test]
    fn test_layout_report_lists_nodes() {
        let root: Node = Container::column().child(Node::text("Hi")).into();
        let report = preview(root).layout_report(100, 100).unwrap();
        assert!(report.starts_with("Column frame=(0.0, 0.0,"));
        assert!(report.contains("  Text frame="));
        assert!(report.contains("text='Hi'"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen.layout");
        std::fs::write(&path, "column background=red {\n  text \"Hi\"\n}\n").unwrap();
        let p = Preview::from_file(&path, &Config::default()).unwrap();
        assert_eq!(p.root().children().len(), 1);
    }

    #[test]
    fn test_from_file_checks_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen.txt");
        std::fs::write(&path, "column").unwrap();
        assert!(matches!(
            Preview::from_file(&path, &Config::default()),
            Err(Error::Sandbox(_))
        ));
    }

    #[test]
    fn test_from_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.layout");
        std::fs::write(&path, "column {\n").unwrap();
        assert!(matches!(
            Preview::from_file(&path, &Config::default()),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_missing_font_falls_back() {
        let config = Config {
            font_path: Some("/no/such/font.ttf".into()),
            ..Config::default()
        };
        let p = Preview::new(Container::column().into(), &config).unwrap();
        assert!(!p.renderer.typesetter().has_font());
    }
}
