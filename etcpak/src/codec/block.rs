//! Pixel blocks and encoded block records.

use super::Format;
use image::{Rgba, RgbaImage};

/// Block edge length in pixels.
pub const BLOCK_SIZE: u32 = 4;

/// A 4×4 group of RGBA pixels stored in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBlock {
    pixels: [[u8; 4]; 16],
}

impl PixelBlock {
    /// Create a block from 16 row-major pixels.
    pub const fn new(pixels: [[u8; 4]; 16]) -> Self {
        Self { pixels }
    }

    /// Create a block where every pixel has the same color.
    pub const fn solid(rgba: [u8; 4]) -> Self {
        Self { pixels: [rgba; 16] }
    }

    /// All 16 pixels, row-major.
    pub fn pixels(&self) -> &[[u8; 4]; 16] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        self.pixels[y * 4 + x]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        self.pixels[y * 4 + x] = rgba;
    }

    /// Extract block (`bx`, `by`) from an image.
    ///
    /// Samples outside the image replicate the nearest edge pixel, so
    /// levels smaller than a block still produce a full block.
    pub fn from_image(image: &RgbaImage, bx: u32, by: u32) -> Self {
        let max_x = image.width().saturating_sub(1);
        let max_y = image.height().saturating_sub(1);
        let mut pixels = [[0u8; 4]; 16];
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                let px = (bx * BLOCK_SIZE + x).min(max_x);
                let py = (by * BLOCK_SIZE + y).min(max_y);
                pixels[(y * 4 + x) as usize] = image.get_pixel(px, py).0;
            }
        }
        Self { pixels }
    }

    /// Write this block into an image at block position (`bx`, `by`),
    /// clipping pixels that fall outside it.
    pub fn write_to(&self, image: &mut RgbaImage, bx: u32, by: u32) {
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                let px = bx * BLOCK_SIZE + x;
                let py = by * BLOCK_SIZE + y;
                if px < image.width() && py < image.height() {
                    image.put_pixel(px, py, Rgba(self.pixels[(y * 4 + x) as usize]));
                }
            }
        }
    }

    /// Gray block carrying the alpha channel in r, g and b.
    pub fn alpha_as_gray(&self) -> Self {
        let mut pixels = self.pixels;
        for p in pixels.iter_mut() {
            *p = [p[3], p[3], p[3], 255];
        }
        Self { pixels }
    }

    /// Returns true if any pixel is not fully opaque.
    pub fn has_translucency(&self) -> bool {
        self.pixels.iter().any(|p| p[3] != 255)
    }

    /// Largest absolute difference over the r, g and b channels.
    pub fn max_channel_error(&self, other: &PixelBlock) -> u8 {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .flat_map(|(a, b)| (0..3).map(move |c| a[c].abs_diff(b[c])))
            .max()
            .unwrap_or(0)
    }

    /// Largest absolute difference in the alpha channel.
    pub fn max_alpha_error(&self, other: &PixelBlock) -> u8 {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .map(|(a, b)| a[3].abs_diff(b[3]))
            .max()
            .unwrap_or(0)
    }

    /// Sum of squared r, g, b differences.
    pub fn rgb_error(&self, other: &PixelBlock) -> u64 {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .map(|(a, b)| super::color::rgb_distance(*a, *b) as u64)
            .sum()
    }
}

/// An encoded block.
///
/// Records are kept as native integers; byte order is applied only when
/// the block is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressedBlock {
    /// Single 64-bit record (ETC1, ETC2 RGB, DXT1).
    Color(u64),
    /// ETC2 RGBA: EAC alpha record plus ETC2 color record.
    ColorAlpha { alpha: u64, color: u64 },
}

impl CompressedBlock {
    /// Number of 64-bit records.
    pub fn word_count(&self) -> usize {
        match self {
            CompressedBlock::Color(_) => 1,
            CompressedBlock::ColorAlpha { .. } => 2,
        }
    }

    /// Record `index` in storage order (alpha before color).
    ///
    /// # Panics
    ///
    /// Panics if `index >= word_count()`.
    pub fn word(&self, index: usize) -> u64 {
        match (self, index) {
            (CompressedBlock::Color(word), 0) => *word,
            (CompressedBlock::ColorAlpha { alpha, .. }, 0) => *alpha,
            (CompressedBlock::ColorAlpha { color, .. }, 1) => *color,
            _ => panic!("record index {} out of range for {:?}", index, self),
        }
    }

    /// The color record.
    pub fn color(&self) -> u64 {
        match self {
            CompressedBlock::Color(word) => *word,
            CompressedBlock::ColorAlpha { color, .. } => *color,
        }
    }

    /// Build a block from records in storage order.
    ///
    /// # Panics
    ///
    /// Panics if the number of records does not match `format`.
    pub fn from_words(format: Format, words: &[u64]) -> Self {
        assert_eq!(
            words.len(),
            format.words_per_block(),
            "{} blocks hold {} records",
            format,
            format.words_per_block()
        );
        match words {
            [color] => CompressedBlock::Color(*color),
            [alpha, color] => CompressedBlock::ColorAlpha {
                alpha: *alpha,
                color: *color,
            },
            _ => unreachable!("record count checked above"),
        }
    }

    /// Append the serialized block to `out`.
    ///
    /// ETC records are big-endian; DXT1 records are little-endian.
    pub fn write_bytes(&self, format: Format, out: &mut Vec<u8>) {
        assert_eq!(self.word_count(), format.words_per_block());
        for index in 0..self.word_count() {
            let word = self.word(index);
            match format {
                Format::Dxt1 => out.extend_from_slice(&word.to_le_bytes()),
                _ => out.extend_from_slice(&word.to_be_bytes()),
            }
        }
    }

    /// Parse one serialized block.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len()` differs from `format.bytes_per_block()`.
    pub fn from_bytes(format: Format, bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), format.bytes_per_block());
        let mut words = [0u64; 2];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            *word = match format {
                Format::Dxt1 => u64::from_le_bytes(raw),
                _ => u64::from_be_bytes(raw),
            };
        }
        Self::from_words(format, &words[..format.words_per_block()])
    }
}
