//! Mipmap chain generation.
//!
//! Each level halves both dimensions (never below 1) until the chain
//! reaches 1×1. Pixels are averaged with a 2×2 box filter; odd source
//! dimensions reuse the last row or column.

use image::{Rgba, RgbaImage};

/// Dimensions of every level, largest first.
///
/// Without mipmaps the chain is the base level alone.
pub fn level_dimensions(width: u32, height: u32, mipmapped: bool) -> Vec<(u32, u32)> {
    let mut dims = vec![(width, height)];
    if !mipmapped {
        return dims;
    }
    let (mut w, mut h) = (width, height);
    while w > 1 || h > 1 {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        dims.push((w, h));
    }
    dims
}

/// Downsample an image by 2× using a box filter.
pub fn downsample_box_2x(source: &RgbaImage) -> RgbaImage {
    let new_width = (source.width() / 2).max(1);
    let new_height = (source.height() / 2).max(1);
    let max_x = source.width() - 1;
    let max_y = source.height() - 1;

    RgbaImage::from_fn(new_width, new_height, |x, y| {
        let x0 = (x * 2).min(max_x);
        let x1 = (x * 2 + 1).min(max_x);
        let y0 = (y * 2).min(max_y);
        let y1 = (y * 2 + 1).min(max_y);

        let p00 = source.get_pixel(x0, y0);
        let p10 = source.get_pixel(x1, y0);
        let p01 = source.get_pixel(x0, y1);
        let p11 = source.get_pixel(x1, y1);

        Rgba([0, 1, 2, 3].map(|c| {
            ((p00[c] as u16 + p10[c] as u16 + p01[c] as u16 + p11[c] as u16 + 2) / 4) as u8
        }))
    })
}

/// Returns true if any pixel is not fully opaque.
pub fn has_alpha(image: &RgbaImage) -> bool {
    image.pixels().any(|p| p[3] != 255)
}

/// A source image and its downsampled levels, largest first.
#[derive(Debug, Clone)]
pub struct MipChain {
    levels: Vec<RgbaImage>,
}

impl MipChain {
    /// A chain holding only the base level.
    pub fn single(image: RgbaImage) -> Self {
        Self {
            levels: vec![image],
        }
    }

    /// Build the full chain down to 1×1.
    pub fn generate(image: RgbaImage) -> Self {
        let count = level_dimensions(image.width(), image.height(), true).len();
        let mut levels = Vec::with_capacity(count);
        levels.push(image);
        for _ in 1..count {
            let next = match levels.last() {
                Some(previous) => downsample_box_2x(previous),
                None => break,
            };
            levels.push(next);
        }
        Self { levels }
    }

    /// Build a chain with or without mipmaps.
    pub fn new(image: RgbaImage, mipmapped: bool) -> Self {
        if mipmapped {
            Self::generate(image)
        } else {
            Self::single(image)
        }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Level `index`, where 0 is the base image.
    ///
    /// # Panics
    ///
    /// Panics if `index >= level_count()`.
    pub fn level(&self, index: usize) -> &RgbaImage {
        &self.levels[index]
    }

    pub fn levels(&self) -> &[RgbaImage] {
        &self.levels
    }

    /// The base image.
    pub fn base(&self) -> &RgbaImage {
        &self.levels[0]
    }

    /// Returns true if the base image has any translucent pixel.
    pub fn has_alpha(&self) -> bool {
        has_alpha(self.base())
    }
}
