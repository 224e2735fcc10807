//! Error types for texture storage.

use std::fmt;

/// Errors that can occur when building a texture from raw block data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// Image dimensions cannot hold a texture.
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },
    /// Raw block data does not match the expected texture size.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::InvalidDimensions {
                width,
                height,
                reason,
            } => {
                write!(f, "Invalid dimensions {}×{}: {}", width, height, reason)
            }
            TextureError::SizeMismatch { expected, actual } => write!(
                f,
                "Block data size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for TextureError {}
