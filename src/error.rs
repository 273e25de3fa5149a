//! Error types for Tessera.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;
use crate::sandbox::SandboxError;

#[derive(Debug, Error)]
pub enum Error {
    /// An image card references an identifier the image store does not know.
    #[error("missing image resource '{0}'")]
    MissingImage(String),

    /// A fractional size outside (0, 1].
    #[error("size fraction {0} is outside (0, 1]")]
    InvalidFraction(f32),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("rejected resource: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("svg error: {0}")]
    Svg(#[from] usvg::Error),

    #[error("font error: {0}")]
    Font(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
