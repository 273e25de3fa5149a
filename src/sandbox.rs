//! Resource guard for Tessera previews
//!
//! Everything a preview pulls in from disk passes through here first:
//! - Only .layout description files
//! - No path traversal
//! - Size limits on description files and image resources
//! - A nesting limit for description files
//! - A byte budget for decoded bitmaps

use std::path::Path;

use thiserror::Error;

/// Budget for decoded image data held by one preview (64MB default)
pub const IMAGE_BUDGET_BYTES: usize = 64 * 1024 * 1024;

/// Maximum description file size that can be loaded (1MB)
pub const MAX_LAYOUT_FILE_BYTES: usize = 1024 * 1024;

/// Maximum encoded image file size (16MB)
pub const MAX_IMAGE_FILE_BYTES: usize = 16 * 1024 * 1024;

/// Longest accepted image identifier
pub const MAX_IMAGE_ID_LEN: usize = 128;

/// Deepest container nesting accepted in a description file
pub const MAX_NESTING_DEPTH: usize = 256;

/// Resource guard state for one preview
#[derive(Debug)]
pub struct Sandbox {
    image_bytes: usize,
    image_budget: usize,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self::with_budget(IMAGE_BUDGET_BYTES)
    }

    pub fn with_budget(image_budget: usize) -> Self {
        Self {
            image_bytes: 0,
            image_budget,
        }
    }

    /// Validate that a description file path is safe to load
    pub fn validate_layout_path(&self, path: &Path) -> Result<(), SandboxError> {
        match path.extension() {
            Some(ext) if ext == "layout" => {}
            _ => return Err(SandboxError::InvalidFileType),
        }
        reject_traversal(path)
    }

    /// Validate an image file found in an asset directory
    pub fn validate_image_path(&self, path: &Path) -> Result<(), SandboxError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "svg") {
            return Err(SandboxError::InvalidFileType);
        }
        reject_traversal(path)
    }

    /// Image identifiers are plain names: letters, digits, `_` and `-`
    pub fn validate_image_id(&self, id: &str) -> Result<(), SandboxError> {
        if id.is_empty() || id.len() > MAX_IMAGE_ID_LEN {
            return Err(SandboxError::InvalidImageId(id.to_string()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(SandboxError::InvalidImageId(id.to_string()));
        }
        Ok(())
    }

    /// Check an encoded file size against its limit
    pub fn check_file_size(&self, bytes: usize, limit: usize) -> Result<(), SandboxError> {
        if bytes > limit {
            return Err(SandboxError::FileTooLarge);
        }
        Ok(())
    }

    /// Swap `old` tracked bytes for `new` ones, refusing to go over budget.
    /// Usage is unchanged on error.
    pub fn reallocate(&mut self, old: usize, new: usize) -> Result<(), SandboxError> {
        let next = self.image_bytes.saturating_sub(old).saturating_add(new);
        if next > self.image_budget {
            return Err(SandboxError::ImageBudgetExceeded);
        }
        self.image_bytes = next;
        Ok(())
    }

    /// Swap tracked bytes without a budget check
    pub fn record(&mut self, old: usize, new: usize) {
        self.image_bytes = self.image_bytes.saturating_sub(old).saturating_add(new);
    }

    /// Get current decoded image usage
    pub fn image_usage(&self) -> usize {
        self.image_bytes
    }
}

fn reject_traversal(path: &Path) -> Result<(), SandboxError> {
    let path_str = path.to_string_lossy();
    if path_str.contains("..") {
        return Err(SandboxError::PathTraversal);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SandboxError {
    #[error("Unsupported file type")]
    InvalidFileType,
    #[error("Path traversal not allowed")]
    PathTraversal,
    #[error("File exceeds maximum size limit")]
    FileTooLarge,
    #[error("Decoded image budget exceeded")]
    ImageBudgetExceeded,
    #[error("Invalid image identifier '{0}'")]
    InvalidImageId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_layout_path_rules() {
        let sandbox = Sandbox::new();
        assert!(sandbox.validate_layout_path(&PathBuf::from("demos/tutorial.layout")).is_ok());
        assert_eq!(
            sandbox.validate_layout_path(&PathBuf::from("demos/tutorial.txt")),
            Err(SandboxError::InvalidFileType)
        );
        assert_eq!(
            sandbox.validate_layout_path(&PathBuf::from("../secret.layout")),
            Err(SandboxError::PathTraversal)
        );
    }

    #[test]
    fn test_image_path_extensions() {
        let sandbox = Sandbox::new();
        assert!(sandbox.validate_image_path(&PathBuf::from("assets/aj1.PNG")).is_ok());
        assert!(sandbox.validate_image_path(&PathBuf::from("assets/logo.svg")).is_ok());
        assert!(sandbox.validate_image_path(&PathBuf::from("assets/clip.gif")).is_err());
    }

    #[test]
    fn test_image_id_rules() {
        let sandbox = Sandbox::new();
        assert!(sandbox.validate_image_id("aj1").is_ok());
        assert!(sandbox.validate_image_id("air-jordan_1").is_ok());
        assert!(sandbox.validate_image_id("").is_err());
        assert!(sandbox.validate_image_id("../aj1").is_err());
        assert!(sandbox.validate_image_id("a b").is_err());
    }

    #[test]
    fn test_image_budget() {
        let mut sandbox = Sandbox::with_budget(100);
        assert!(sandbox.reallocate(0, 60).is_ok());
        assert_eq!(sandbox.reallocate(0, 60), Err(SandboxError::ImageBudgetExceeded));
        assert_eq!(sandbox.image_usage(), 60);
        // replacing 60 with 90 fits once the old bytes are released
        assert!(sandbox.reallocate(60, 90).is_ok());
        assert_eq!(sandbox.image_usage(), 90);
        sandbox.reallocate(90, 0).unwrap();
        assert_eq!(sandbox.image_usage(), 0);
    }

    #[test]
    fn test_record_ignores_budget() {
        let mut sandbox = Sandbox::with_budget(100);
        sandbox.record(0, 150);
        sandbox.record(0, 30);
        assert_eq!(sandbox.image_usage(), 180);
        assert_eq!(sandbox.reallocate(0, 1), Err(SandboxError::ImageBudgetExceeded));
        sandbox.record(150, 0);
        assert_eq!(sandbox.image_usage(), 30);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SandboxError::PathTraversal.to_string(), "Path traversal not allowed");
        assert_eq!(
            SandboxError::InvalidImageId("a b".into()).to_string(),
            "Invalid image identifier 'a b'"
        );
    }

    #[test]
    fn test_file_size_limit() {
        let sandbox = Sandbox::new();
        assert!(sandbox.check_file_size(10, MAX_LAYOUT_FILE_BYTES).is_ok());
        assert_eq!(
            sandbox.check_file_size(MAX_LAYOUT_FILE_BYTES + 1, MAX_LAYOUT_FILE_BYTES),
            Err(SandboxError::FileTooLarge)
        );
    }
}
