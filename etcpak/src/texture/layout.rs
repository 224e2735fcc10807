//! Block layout of a mip chain.

use crate::mipmap::level_dimensions;
use std::ops::Range;

/// Position and extent of one mip level inside a texture's block storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelLayout {
    /// Level width in pixels.
    pub width: u32,
    /// Level height in pixels.
    pub height: u32,
    /// Blocks per row: `ceil(width / 4)`.
    pub blocks_wide: u32,
    /// Block rows: `ceil(height / 4)`.
    pub blocks_high: u32,
    /// Index of the level's first block.
    pub block_offset: usize,
}

impl LevelLayout {
    pub fn block_count(&self) -> usize {
        self.blocks_wide as usize * self.blocks_high as usize
    }

    /// Block indices covered by this level.
    pub fn block_range(&self) -> Range<usize> {
        self.block_offset..self.block_offset + self.block_count()
    }

    /// Storage index of block (`bx`, `by`).
    pub fn block_index(&self, bx: u32, by: u32) -> usize {
        self.block_offset + by as usize * self.blocks_wide as usize + bx as usize
    }
}

/// Layout of every level, largest first.
pub fn level_layouts(width: u32, height: u32, mipmapped: bool) -> Vec<LevelLayout> {
    let mut offset = 0usize;
    level_dimensions(width, height, mipmapped)
        .into_iter()
        .map(|(w, h)| {
            let layout = LevelLayout {
                width: w,
                height: h,
                blocks_wide: w.div_ceil(4),
                blocks_high: h.div_ceil(4),
                block_offset: offset,
            };
            offset += layout.block_count();
            layout
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_level_layout() {
        let layouts = level_layouts(64, 32, false);
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].blocks_wide, 16);
        assert_eq!(layouts[0].blocks_high, 8);
        assert_eq!(layouts[0].block_range(), 0..128);
    }

    #[test]
    fn test_small_levels_occupy_one_block() {
        let layouts = level_layouts(8, 8, true);
        let counts: Vec<usize> = layouts.iter().map(|l| l.block_count()).collect();
        assert_eq!(counts, vec![4, 1, 1, 1]);
        assert_eq!(layouts[3].block_offset, 6);
    }

    #[test]
    fn test_levels_are_contiguous() {
        let layouts = level_layouts(256, 64, true);
        for pair in layouts.windows(2) {
            assert_eq!(pair[0].block_range().end, pair[1].block_offset);
        }
    }

    #[test]
    fn test_block_index() {
        let layout = level_layouts(16, 16, true)[0];
        assert_eq!(layout.block_index(0, 0), 0);
        assert_eq!(layout.block_index(3, 2), 11);
    }
}
