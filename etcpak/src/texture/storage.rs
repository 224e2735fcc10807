//! Preallocated atomic block storage.

use super::error::TextureError;
use super::layout::{level_layouts, LevelLayout};
use crate::codec::{codec_for, CompressedBlock, Effort, Format};
use image::RgbaImage;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Encoded blocks for every level of a mip chain.
///
/// Each block occupies `format.words_per_block()` atomic words, so workers
/// can fill disjoint blocks through a shared reference. Writes use relaxed
/// ordering; readers must wait for the scheduler's sync first.
#[derive(Debug)]
pub struct Texture {
    format: Format,
    width: u32,
    height: u32,
    mipmapped: bool,
    levels: Vec<LevelLayout>,
    words: Box<[AtomicU64]>,
}

impl Texture {
    /// Allocate a zeroed texture for an image of the given size.
    pub fn new(format: Format, width: u32, height: u32, mipmapped: bool) -> Self {
        let levels = level_layouts(width, height, mipmapped);
        let blocks: usize = levels.iter().map(LevelLayout::block_count).sum();
        let words = (0..blocks * format.words_per_block())
            .map(|_| AtomicU64::new(0))
            .collect();
        Self {
            format,
            width,
            height,
            mipmapped,
            levels,
            words,
        }
    }

    /// Rebuild a texture from its serialized block data.
    pub fn from_bytes(
        format: Format,
        width: u32,
        height: u32,
        mipmapped: bool,
        bytes: &[u8],
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions {
                width,
                height,
                reason: "dimensions must be non-zero".to_string(),
            });
        }
        let texture = Self::new(format, width, height, mipmapped);
        if bytes.len() != texture.byte_size() {
            return Err(TextureError::SizeMismatch {
                expected: texture.byte_size(),
                actual: bytes.len(),
            });
        }
        for (index, chunk) in bytes.chunks_exact(format.bytes_per_block()).enumerate() {
            texture.store_block(index, CompressedBlock::from_bytes(format, chunk));
        }
        Ok(texture)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the texture was allocated with a mip chain.
    pub fn is_mipmapped(&self) -> bool {
        self.mipmapped
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[LevelLayout] {
        &self.levels
    }

    /// Layout of level `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= level_count()`.
    pub fn level(&self, index: usize) -> &LevelLayout {
        &self.levels[index]
    }

    /// Total number of blocks over all levels.
    pub fn block_count(&self) -> usize {
        self.words.len() / self.format.words_per_block()
    }

    /// Serialized size in bytes.
    pub fn byte_size(&self) -> usize {
        self.block_count() * self.format.bytes_per_block()
    }

    /// Write the record for block `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the record does not match the
    /// texture's format.
    pub fn store_block(&self, index: usize, block: CompressedBlock) {
        let per_block = self.format.words_per_block();
        assert_eq!(
            block.word_count(),
            per_block,
            "{} textures store {} records per block",
            self.format,
            per_block
        );
        let base = index * per_block;
        for word in 0..per_block {
            self.words[base + word].store(block.word(word), Ordering::Relaxed);
        }
    }

    /// Read the record for block `index`.
    pub fn block(&self, index: usize) -> CompressedBlock {
        let per_block = self.format.words_per_block();
        let base = index * per_block;
        let mut words = [0u64; 2];
        for (word, slot) in words.iter_mut().take(per_block).enumerate() {
            *slot = self.words[base + word].load(Ordering::Relaxed);
        }
        CompressedBlock::from_words(self.format, &words[..per_block])
    }

    /// Decode one level back to pixels.
    ///
    /// Block rows are decoded in parallel.
    pub fn decode_level(&self, level: usize) -> RgbaImage {
        let layout = self.levels[level];
        let codec = codec_for(self.format, Effort::Fast);
        let mut image = RgbaImage::new(layout.width, layout.height);
        let row_bytes = layout.width as usize * 4 * 4;

        image
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(by, strip)| {
                let strip_rows = strip.len() / (layout.width as usize * 4);
                for bx in 0..layout.blocks_wide {
                    let decoded = codec.decode(&self.block(layout.block_index(bx, by as u32)));
                    for y in 0..strip_rows {
                        for x in 0..4usize {
                            let px = bx as usize * 4 + x;
                            if px >= layout.width as usize {
                                break;
                            }
                            let offset = (y * layout.width as usize + px) * 4;
                            strip[offset..offset + 4].copy_from_slice(&decoded.pixel(x, y));
                        }
                    }
                }
            });
        image
    }

    /// Decode the base level.
    pub fn decode(&self) -> RgbaImage {
        self.decode_level(0)
    }

    /// Serialize all blocks, level by level, largest first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_size());
        for index in 0..self.block_count() {
            self.block(index).write_bytes(self.format, &mut out);
        }
        out
    }

    /// Serialized blocks of a single level.
    pub fn level_bytes(&self, level: usize) -> Vec<u8> {
        let range = self.levels[level].block_range();
        let mut out = Vec::with_capacity(range.len() * self.format.bytes_per_block());
        for index in range {
            self.block(index).write_bytes(self.format, &mut out);
        }
        out
    }
}

impl Clone for Texture {
    fn clone(&self) -> Self {
        Self {
            format: self.format,
            width: self.width,
            height: self.height,
            mipmapped: self.mipmapped,
            levels: self.levels.clone(),
            words: self
                .words
                .iter()
                .map(|w| AtomicU64::new(w.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}
