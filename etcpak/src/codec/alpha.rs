//! EAC alpha records used by ETC2 RGBA.
//!
//! ```text
//! base:8 | multiplier:4 | table:4 | 16 × index:3
//! ```
//!
//! Indices are column-major: pixel (x, y) occupies bits
//! `45 - 3*(x*4 + y)` .. `47 - 3*(x*4 + y)`.

use super::block::PixelBlock;
use super::color::clamp255;
use super::tables::ALPHA_MODIFIERS;

/// Table whose modifier 4 is zero; used for constant alpha.
const FLAT_TABLE: usize = 13;

#[inline]
fn index_shift(x: usize, y: usize) -> u32 {
    45 - 3 * (x * 4 + y) as u32
}

#[inline]
fn alpha_value(base: i32, modifier: i32, multiplier: i32) -> u8 {
    clamp255(base + modifier * multiplier)
}

/// Returns the summed squared error and best indices for one setting.
fn evaluate(
    alphas: &[u8; 16],
    base: i32,
    table: usize,
    multiplier: i32,
    limit: u64,
) -> (u64, [u8; 16]) {
    let mut error = 0u64;
    let mut indices = [0u8; 16];
    for (i, &alpha) in alphas.iter().enumerate() {
        let mut best = u32::MAX;
        for (m, &modifier) in ALPHA_MODIFIERS[table].iter().enumerate() {
            let d = (alpha as i32 - alpha_value(base, modifier, multiplier) as i32).unsigned_abs();
            if d * d < best {
                best = d * d;
                indices[i] = m as u8;
            }
        }
        error += best as u64;
        if error >= limit {
            break;
        }
    }
    (error, indices)
}

fn pack(base: i32, multiplier: i32, table: usize, indices: &[u8; 16]) -> u64 {
    let mut word = (base as u64) << 56 | (multiplier as u64) << 52 | (table as u64) << 48;
    for y in 0..4 {
        for x in 0..4 {
            word |= (indices[y * 4 + x] as u64) << index_shift(x, y);
        }
    }
    word
}

/// Encode the alpha channel of a block.
pub(crate) fn encode_alpha(block: &PixelBlock) -> u64 {
    let mut alphas = [0u8; 16];
    for (a, p) in alphas.iter_mut().zip(block.pixels().iter()) {
        *a = p[3];
    }
    let min = *alphas.iter().min().unwrap_or(&0) as i32;
    let max = *alphas.iter().max().unwrap_or(&0) as i32;

    if min == max {
        return pack(min, 1, FLAT_TABLE, &[4; 16]);
    }

    let mut best_error = u64::MAX;
    let mut best_word = 0u64;
    for (table, modifiers) in ALPHA_MODIFIERS.iter().enumerate() {
        let low = modifiers[3];
        let high = modifiers[7];
        let span = (high - low) as f32;
        let estimate = ((max - min) as f32 / span).round() as i32;
        for multiplier in (estimate - 1)..=(estimate + 1) {
            if !(1..=15).contains(&multiplier) {
                continue;
            }
            let from_min = min - low * multiplier;
            let from_mid = ((min + max) as f32 / 2.0 - (low + high) as f32 * multiplier as f32 / 2.0)
                .round() as i32;
            for base in [from_min - 1, from_min, from_min + 1, from_mid - 1, from_mid, from_mid + 1] {
                let base = base.clamp(0, 255);
                let (error, indices) = evaluate(&alphas, base, table, multiplier, best_error);
                if error < best_error {
                    best_error = error;
                    best_word = pack(base, multiplier, table, &indices);
                    if error == 0 {
                        return best_word;
                    }
                }
            }
        }
    }
    best_word
}

/// Decode an alpha record into the alpha channel of `block`.
pub(crate) fn decode_alpha(word: u64, block: &mut PixelBlock) {
    let base = (word >> 56) as i32;
    let multiplier = ((word >> 52) & 0xF) as i32;
    let table = ((word >> 48) & 0xF) as usize;
    for y in 0..4 {
        for x in 0..4 {
            let index = ((word >> index_shift(x, y)) & 7) as usize;
            let mut pixel = block.pixel(x, y);
            pixel[3] = alpha_value(base, ALPHA_MODIFIERS[table][index], multiplier);
            block.set_pixel(x, y, pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alpha_block(alphas: [u8; 16]) -> PixelBlock {
        let mut pixels = [[0u8; 4]; 16];
        for (p, a) in pixels.iter_mut().zip(alphas) {
            *p = [0, 0, 0, a];
        }
        PixelBlock::new(pixels)
    }

    fn round_trip(block: &PixelBlock) -> PixelBlock {
        let mut decoded = PixelBlock::solid([0, 0, 0, 0]);
        decode_alpha(encode_alpha(block), &mut decoded);
        decoded
    }

    #[test]
    fn test_constant_alpha_is_exact() {
        for a in [0u8, 1, 128, 254, 255] {
            let block = alpha_block([a; 16]);
            assert_eq!(round_trip(&block).max_alpha_error(&block), 0);
        }
    }

    #[test]
    fn test_two_level_alpha_is_exact() {
        let mut alphas = [255u8; 16];
        alphas[..8].fill(64);
        let block = alpha_block(alphas);
        assert_eq!(round_trip(&block).max_alpha_error(&block), 0);
    }

    #[test]
    fn test_index_layout_is_column_major() {
        // base 100, multiplier 1, table 13; pixel (0, 1) gets index 7 (+9)
        let word = 100u64 << 56 | 1u64 << 52 | 13u64 << 48 | 4u64 << index_shift(0, 0) | 7u64 << 42;
        let mut block = PixelBlock::solid([0, 0, 0, 0]);
        decode_alpha(word, &mut block);
        assert_eq!(block.pixel(0, 0)[3], 100);
        assert_eq!(block.pixel(0, 1)[3], 109);
        assert_eq!(block.pixel(1, 0)[3], 99);
    }

    #[test]
    fn test_decode_clamps() {
        let word = 250u64 << 56 | 15u64 << 52 | 7u64 << index_shift(2, 3);
        let mut block = PixelBlock::solid([0, 0, 0, 0]);
        decode_alpha(word, &mut block);
        assert_eq!(block.pixel(2, 3)[3], 255);
        // index 0 everywhere else: 250 - 3 * 15
        assert_eq!(block.pixel(0, 0)[3], 205);
    }

    #[test]
    fn test_decode_preserves_color() {
        let mut block = PixelBlock::solid([1, 2, 3, 4]);
        decode_alpha(pack(77, 1, FLAT_TABLE, &[4; 16]), &mut block);
        assert_eq!(block.pixel(3, 3), [1, 2, 3, 77]);
    }

    proptest! {
        #[test]
        fn prop_smooth_alpha_within_step(start in 0u8..=200, step in 0u8..=3) {
            let mut alphas = [0u8; 16];
            for (i, a) in alphas.iter_mut().enumerate() {
                *a = start + step * i as u8;
            }
            let block = alpha_block(alphas);
            prop_assert!(round_trip(&block).max_alpha_error(&block) <= 12);
        }
    }
}
