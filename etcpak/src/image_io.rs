//! Loading and saving raw images.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Load any format supported by the `image` crate as RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, ImageIoError> {
    image::open(path)
        .map(|image| image.into_rgba8())
        .map_err(|source| ImageIoError::Load {
            path: path.to_path_buf(),
            source,
        })
}

/// Save an RGBA image; the format follows the file extension.
pub fn save_image(path: &Path, image: &RgbaImage) -> Result<(), ImageIoError> {
    image.save(path).map_err(|source| ImageIoError::Save {
        path: path.to_path_buf(),
        source,
    })
}
