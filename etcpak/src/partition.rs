//! Splitting a mip chain into independent work units.
//!
//! A work unit is a horizontal band of whole block rows inside one mip
//! level. Units of one level never overlap and together cover every block
//! of the level, so workers can encode them in any order.
//!
//! The number of units per level is proportional to the level's share of
//! all blocks, with roughly four units per worker overall:
//!
//! ```text
//! units = ceil(workers * 4 * level_blocks / total_blocks)
//! clamped to 1 ..= min(block_rows, max(1, level_blocks / 64))
//! ```

use crate::mipmap::MipChain;
use crate::texture::{level_layouts, LevelLayout};
use image::RgbaImage;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;

/// Smallest number of blocks worth a unit of its own.
const MIN_BLOCKS_PER_UNIT: usize = 64;
/// Target units per worker over the whole chain.
const UNITS_PER_WORKER: usize = 4;

/// Errors raised while preparing a source image for partitioning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    #[error("image is empty ({width}×{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("image dimensions {width}×{height} are not multiples of 4")]
    NotBlockAligned { width: u32, height: u32 },
}

/// A band of block rows within one mip level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    /// Mip level index (0 is the base image).
    pub level: usize,
    /// First block row of the band.
    pub first_row: u32,
    /// Number of block rows in the band.
    pub rows: u32,
    /// Blocks per row in the level.
    pub width: u32,
    /// Destination index of the band's first block in the texture.
    pub block_offset: usize,
}

impl WorkUnit {
    pub fn block_count(&self) -> usize {
        self.rows as usize * self.width as usize
    }

    /// Destination block indices covered by this unit.
    pub fn block_range(&self) -> Range<usize> {
        self.block_offset..self.block_offset + self.block_count()
    }
}

fn units_for_level(level: &LevelLayout, total_blocks: usize, workers: usize) -> usize {
    let level_blocks = level.block_count();
    let wanted = (workers * UNITS_PER_WORKER * level_blocks).div_ceil(total_blocks.max(1));
    let cap = (level.blocks_high as usize)
        .min((level_blocks / MIN_BLOCKS_PER_UNIT).max(1))
        .max(1);
    wanted.clamp(1, cap)
}

/// Split one level into `units` bands of nearly equal height.
fn split_level(index: usize, level: &LevelLayout, units: usize) -> Vec<WorkUnit> {
    let rows = level.blocks_high as usize;
    let base = rows / units;
    let extra = rows % units;
    let mut first_row = 0usize;
    (0..units)
        .map(|i| {
            let band = base + usize::from(i < extra);
            let unit = WorkUnit {
                level: index,
                first_row: first_row as u32,
                rows: band as u32,
                width: level.blocks_wide,
                block_offset: level.block_offset + first_row * level.blocks_wide as usize,
            };
            first_row += band;
            unit
        })
        .collect()
}

/// Produces the work units for a source image and its mip chain.
#[derive(Debug, Clone)]
pub struct WorkPartitioner {
    chain: Arc<MipChain>,
    levels: Vec<LevelLayout>,
    units: Vec<WorkUnit>,
    cursor: usize,
}

impl WorkPartitioner {
    /// Prepare `image` for compression by `workers` threads.
    ///
    /// The base image must be a non-empty multiple of 4 in both
    /// dimensions. When `mipmaps` is set the full chain down to 1×1 is
    /// generated here.
    pub fn new(image: RgbaImage, mipmaps: bool, workers: usize) -> Result<Self, PartitionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PartitionError::EmptyImage { width, height });
        }
        if width % 4 != 0 || height % 4 != 0 {
            return Err(PartitionError::NotBlockAligned { width, height });
        }

        let levels = level_layouts(width, height, mipmaps);
        let chain = MipChain::new(image, mipmaps);
        let total_blocks: usize = levels.iter().map(LevelLayout::block_count).sum();
        let workers = workers.max(1);

        let units = levels
            .iter()
            .enumerate()
            .flat_map(|(index, level)| {
                split_level(index, level, units_for_level(level, total_blocks, workers))
            })
            .collect();

        Ok(Self {
            chain: Arc::new(chain),
            levels,
            units,
            cursor: 0,
        })
    }

    /// Total number of units.
    pub fn number_of_parts(&self) -> usize {
        self.units.len()
    }

    /// Next unit in order (largest level first, top to bottom), or `None`
    /// once every unit has been handed out.
    pub fn next_part(&mut self) -> Option<WorkUnit> {
        let unit = self.units.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(unit)
    }

    /// Restart iteration from the first unit.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn units(&self) -> &[WorkUnit] {
        &self.units
    }

    pub fn levels(&self) -> &[LevelLayout] {
        &self.levels
    }

    /// Shared handle to the mip chain the units refer to.
    pub fn mip_chain(&self) -> &Arc<MipChain> {
        &self.chain
    }

    pub fn width(&self) -> u32 {
        self.chain.base().width()
    }

    pub fn height(&self) -> u32 {
        self.chain.base().height()
    }

    pub fn is_mipmapped(&self) -> bool {
        self.levels.len() > 1
    }

    /// Returns true if the base image has translucent pixels.
    pub fn has_alpha(&self) -> bool {
        self.chain.has_alpha()
    }
}

impl Iterator for WorkPartitioner {
    type Item = WorkUnit;

    fn next(&mut self) -> Option<WorkUnit> {
        self.next_part()
    }
}
