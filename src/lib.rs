//! Tessera - a small layout previewer
//!
//! Describe a screen as a tree of columns, rows, text, spacers and image
//! cards, then render it to a PNG or a window.

pub mod assets;
pub mod ast;
pub mod config;
pub mod demo;
pub mod error;
pub mod layout;
pub mod paint;
pub mod parser;
pub mod renderer;
pub mod runtime;
pub mod sandbox;
pub mod text;

pub use error::{Error, Result};
pub use runtime::Preview;
