use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::ast::Color;
use crate::error::{Error, Result};

pub const CONFIG_ENV: &str = "TESSERA_CONFIG";
pub const LOCAL_CONFIG: &str = "tessera.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Viewport size in pixels
    pub width: u32,
    pub height: u32,
    /// Canvas color behind the root node, hex or named
    pub background: String,
    /// TTF/OTF used for text; block glyphs when unset
    pub font_path: Option<PathBuf>,
    /// Directory scanned for card images
    pub assets_dir: Option<PathBuf>,
    /// Default PNG destination
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 480,
            height: 1280,
            background: "#FFFFFF".to_string(),
            font_path: None,
            assets_dir: None,
            output: PathBuf::from("preview.png"),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Explicit path, then `$TESSERA_CONFIG`, then `./tessera.toml`, then defaults.
    ///
    /// An explicitly named file must exist; the implicit ones are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(LOCAL_CONFIG);
        if local.is_file() {
            return Self::from_file(local);
        }
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn background_color(&self) -> Result<Color> {
        let s = self.background.as_str();
        let color = if s.starts_with('#') {
            Color::from_hex(s)
        } else {
            Color::from_name(s)
        };
        color.ok_or_else(|| Error::Other(format!("invalid background color '{}'", s)))
    }
}
