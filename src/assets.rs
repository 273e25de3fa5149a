//! Image resources for image cards
//!
//! Images are looked up by a plain identifier (the file stem when loaded
//! from an asset directory). Raster formats go through `image`, SVG through
//! `usvg` + `resvg`. Every decoded bitmap is counted against the sandbox
//! image budget.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::ast::Color;
use crate::error::{Error, Result};
use crate::sandbox::{Sandbox, MAX_IMAGE_FILE_BYTES};

/// Straight-alpha RGBA8 pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, rgba })
    }

    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let rgba = [color.r, color.g, color.b, color.a].repeat(width as usize * height as usize);
        Self { width, height, rgba }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Color::from_rgba(self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3])
    }

    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    pub fn rasterize_svg(bytes: &[u8]) -> Result<Self> {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())?;
        let size = tree.size().to_int_size();
        let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| Error::Other("svg has an empty canvas".to_string()))?;
        resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let mut rgba = Vec::with_capacity(pixmap.pixels().len() * 4);
        for p in pixmap.pixels() {
            let c = p.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(Self {
            width: size.width(),
            height: size.height(),
            rgba,
        })
    }
}

/// Identifier → bitmap table for one preview
#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<String, Bitmap>,
    sandbox: Sandbox,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sandbox(sandbox: Sandbox) -> Self {
        Self {
            images: HashMap::new(),
            sandbox,
        }
    }

    /// Register a bitmap. Replaces an existing image with the same id.
    pub fn insert(&mut self, id: impl Into<String>, bitmap: Bitmap) {
        let id = id.into();
        let old = self.images.get(&id).map_or(0, Bitmap::byte_len);
        // Only loaded files are held to the budget; bitmaps handed in directly are counted.
        self.sandbox.record(old, bitmap.byte_len());
        self.images.insert(id, bitmap);
    }

    pub fn get(&self, id: &str) -> Option<&Bitmap> {
        self.images.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Decode one file and register it under `id`.
    pub fn load_file(&mut self, id: &str, path: &Path) -> Result<()> {
        self.sandbox.validate_image_id(id)?;
        self.sandbox.validate_image_path(path)?;

        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        self.sandbox.check_file_size(bytes.len(), MAX_IMAGE_FILE_BYTES)?;

        let is_svg = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);
        let bitmap = if is_svg {
            Bitmap::rasterize_svg(&bytes)?
        } else {
            Bitmap::decode(&bytes)?
        };

        let old = self.images.get(id).map_or(0, Bitmap::byte_len);
        self.sandbox.reallocate(old, bitmap.byte_len())?;
        debug!(id, width = bitmap.width, height = bitmap.height, "decoded image");
        self.images.insert(id.to_string(), bitmap);
        Ok(())
    }

    /// Register every supported image in `dir` by file stem.
    ///
    /// Files that fail to decode are skipped with a warning; a missing
    /// directory is an error.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        let mut loaded = 0;
        for entry in entries {
            let path = entry.map_err(|e| Error::io(dir, e))?.path();
            if !path.is_file() || self.sandbox.validate_image_path(&path).is_err() {
                continue;
            }
            let Some(id) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            match self.load_file(&id, &path) {
                Ok(()) => loaded += 1,
                Err(err) => warn!("Skipping {}: {}", path.display(), err),
            }
        }
        info!("Loaded {} image(s) from {}", loaded, dir.display());
        Ok(loaded)
    }

    pub fn memory_usage(&self) -> usize {
        self.sandbox.image_usage()
    }
}
