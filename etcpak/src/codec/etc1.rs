//! ETC1 individual and differential mode encoding.
//!
//! Bit layout of the 64-bit record (bit 63 is the most significant):
//!
//! ```text
//! individual:   R1:4 R2:4 G1:4 G2:4 B1:4 B2:4 | T1:3 T2:3 D:1 F:1 | MSB:16 LSB:16
//! differential: R1:5 dR:3 G1:5 dG:3 B1:5 dB:3 | T1:3 T2:3 D:1 F:1 | MSB:16 LSB:16
//! ```
//!
//! Pixel index bits are stored column-major: pixel (x, y) uses bit
//! `16 + x*4 + y` for the high plane and bit `x*4 + y` for the low plane.

use super::block::{CompressedBlock, PixelBlock};
use super::color::{clamp255, expand4, expand5, mean_rgb, quantize, rgb_distance};
use super::dither::dither_block;
use super::tables::ETC_MODIFIERS;
use super::{BlockCodec, Channels, Effort, Format};

const DIFF_BIT: u32 = 33;
const FLIP_BIT: u32 = 32;

/// A candidate record and its squared r, g, b error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub word: u64,
    pub error: u64,
}

impl Candidate {
    pub(crate) fn worst() -> Self {
        Self {
            word: 0,
            error: u64::MAX,
        }
    }

    /// Replace `self` when `other` is strictly better.
    pub(crate) fn keep_better(&mut self, other: Candidate) {
        if other.error < self.error {
            *self = other;
        }
    }
}

/// Which half of the block pixel (x, y) belongs to.
#[inline]
pub(crate) fn sub_block_of(flip: bool, x: usize, y: usize) -> usize {
    if flip {
        (y >= 2) as usize
    } else {
        (x >= 2) as usize
    }
}

fn sub_block_coords(flip: bool, sub: usize) -> [(usize, usize); 8] {
    let mut coords = [(0, 0); 8];
    let mut i = 0;
    for y in 0..4 {
        for x in 0..4 {
            if sub_block_of(flip, x, y) == sub {
                coords[i] = (x, y);
                i += 1;
            }
        }
    }
    coords
}

#[inline]
pub(crate) fn sign_extend3(value: u64) -> i32 {
    let v = (value & 7) as i32;
    if v >= 4 {
        v - 8
    } else {
        v
    }
}

#[derive(Debug, Clone, Copy)]
struct SubBlockFit {
    error: u64,
    table: usize,
    indices: [u8; 8],
}

/// Best modifier table and per-pixel indices for one half-block.
fn fit_sub_block(pixels: &[[u8; 4]; 8], base: [u8; 3]) -> SubBlockFit {
    let mut best = SubBlockFit {
        error: u64::MAX,
        table: 0,
        indices: [0; 8],
    };
    for (table, modifiers) in ETC_MODIFIERS.iter().enumerate() {
        let mut error = 0u64;
        let mut indices = [0u8; 8];
        for (i, pixel) in pixels.iter().enumerate() {
            let mut best_pixel = u32::MAX;
            for (m, &modifier) in modifiers.iter().enumerate() {
                let paint = [
                    clamp255(base[0] as i32 + modifier),
                    clamp255(base[1] as i32 + modifier),
                    clamp255(base[2] as i32 + modifier),
                    255,
                ];
                let d = rgb_distance(*pixel, paint);
                if d < best_pixel {
                    best_pixel = d;
                    indices[i] = m as u8;
                }
            }
            error += best_pixel as u64;
            if error >= best.error {
                break;
            }
        }
        if error < best.error {
            best = SubBlockFit {
                error,
                table,
                indices,
            };
        }
    }
    best
}

/// Quantized base colors to try for a half-block average.
///
/// The rounded color always comes first. `Thorough` adds single-channel
/// and luminance neighbours.
fn base_candidates(avg: [f32; 3], bits: u32, effort: Effort) -> Vec<[u8; 3]> {
    let rounded = avg.map(|v| quantize(v, bits));
    let mut candidates = vec![rounded];
    if effort == Effort::Thorough {
        let max = ((1 << bits) - 1) as i32;
        let mut offsets: Vec<[i32; 3]> = Vec::with_capacity(8);
        for c in 0..3 {
            for d in [-1, 1] {
                let mut offset = [0; 3];
                offset[c] = d;
                offsets.push(offset);
            }
        }
        offsets.push([-1, -1, -1]);
        offsets.push([1, 1, 1]);
        for offset in offsets {
            let shifted = [
                rounded[0] as i32 + offset[0],
                rounded[1] as i32 + offset[1],
                rounded[2] as i32 + offset[2],
            ];
            if shifted.iter().all(|&c| (0..=max).contains(&c)) {
                candidates.push(shifted.map(|c| c as u8));
            }
        }
    }
    candidates
}

fn pack_indices(flip: bool, fits: [&SubBlockFit; 2]) -> u64 {
    let mut word = 0u64;
    for (sub, fit) in fits.iter().enumerate() {
        for (i, (x, y)) in sub_block_coords(flip, sub).iter().enumerate() {
            let k = x * 4 + y;
            let index = fit.indices[i] as u64;
            word |= (index >> 1) << (16 + k);
            word |= (index & 1) << k;
        }
    }
    word
}

fn pack_common(flip: bool, fits: [&SubBlockFit; 2]) -> u64 {
    (fits[0].table as u64) << 37
        | (fits[1].table as u64) << 34
        | (flip as u64) << FLIP_BIT
        | pack_indices(flip, fits)
}

fn pack_individual(bases: [[u8; 3]; 2], flip: bool, fits: [&SubBlockFit; 2]) -> u64 {
    let mut word = 0u64;
    for c in 0..3 {
        let shift = 60 - 8 * c as u32;
        word |= (bases[0][c] as u64) << shift;
        word |= (bases[1][c] as u64) << (shift - 4);
    }
    word | pack_common(flip, fits)
}

fn pack_differential(bases: [[u8; 3]; 2], flip: bool, fits: [&SubBlockFit; 2]) -> u64 {
    let mut word = 1u64 << DIFF_BIT;
    for c in 0..3 {
        let shift = 59 - 8 * c as u32;
        let delta = (bases[1][c] as i32 - bases[0][c] as i32) as u64 & 7;
        word |= (bases[0][c] as u64) << shift;
        word |= delta << (shift - 3);
    }
    word | pack_common(flip, fits)
}

fn delta_fits(a: [u8; 3], b: [u8; 3]) -> bool {
    (0..3).all(|c| (-4..=3).contains(&(b[c] as i32 - a[c] as i32)))
}

fn fits_for(pixels: &[[u8; 4]; 8], bases: &[[u8; 3]], bits: u32) -> Vec<SubBlockFit> {
    bases
        .iter()
        .map(|base| {
            let expanded = match bits {
                4 => base.map(expand4),
                _ => base.map(expand5),
            };
            fit_sub_block(pixels, expanded)
        })
        .collect()
}

/// Search ETC1 individual and differential modes.
pub(crate) fn encode_etc1(block: &PixelBlock, effort: Effort) -> Candidate {
    let mut best = Candidate::worst();

    for flip in [false, true] {
        let halves: [[[u8; 4]; 8]; 2] = [0, 1].map(|sub| {
            sub_block_coords(flip, sub).map(|(x, y)| block.pixel(x, y))
        });
        let averages = [mean_rgb(halves[0].iter()), mean_rgb(halves[1].iter())];

        // Differential mode
        let bases0 = base_candidates(averages[0], 5, effort);
        let mut bases1 = base_candidates(averages[1], 5, effort);
        let anchor = bases0[0];
        let pulled = [0, 1, 2].map(|c| {
            (bases1[0][c] as i32).clamp(anchor[c] as i32 - 4, anchor[c] as i32 + 3) as u8
        });
        bases1.push(pulled);

        let fits0 = fits_for(&halves[0], &bases0, 5);
        let fits1 = fits_for(&halves[1], &bases1, 5);
        let mut best_pair: Option<(usize, usize, u64)> = None;
        for (i, b0) in bases0.iter().enumerate() {
            for (j, b1) in bases1.iter().enumerate() {
                if !delta_fits(*b0, *b1) {
                    continue;
                }
                let error = fits0[i].error + fits1[j].error;
                if best_pair.map_or(true, |(_, _, e)| error < e) {
                    best_pair = Some((i, j, error));
                }
            }
        }
        if let Some((i, j, error)) = best_pair {
            let word = pack_differential([bases0[i], bases1[j]], flip, [&fits0[i], &fits1[j]]);
            best.keep_better(Candidate { word, error });
        }

        // Individual mode: halves are independent
        let mut picks: Vec<([u8; 3], SubBlockFit)> = Vec::with_capacity(2);
        for sub in 0..2 {
            let bases = base_candidates(averages[sub], 4, effort);
            let fits = fits_for(&halves[sub], &bases, 4);
            let mut pick = (bases[0], fits[0]);
            for (base, fit) in bases.iter().zip(fits.iter()).skip(1) {
                if fit.error < pick.1.error {
                    pick = (*base, *fit);
                }
            }
            picks.push(pick);
        }
        let error = picks[0].1.error + picks[1].1.error;
        let word = pack_individual([picks[0].0, picks[1].0], flip, [&picks[0].1, &picks[1].1]);
        best.keep_better(Candidate { word, error });

        if best.error == 0 {
            break;
        }
    }
    best
}

/// Decode the pixel indices of an individual/differential/T/H record.
#[inline]
pub(crate) fn pixel_index(word: u64, x: usize, y: usize) -> usize {
    let k = x * 4 + y;
    ((((word >> (16 + k)) & 1) << 1) | ((word >> k) & 1)) as usize
}

/// Decode a record in individual or differential mode.
///
/// Differential channels are not checked for overflow; ETC2 records
/// that use the overflow modes must be routed elsewhere first.
pub(crate) fn decode_etc1(word: u64) -> PixelBlock {
    let flip = (word >> FLIP_BIT) & 1 == 1;
    let differential = (word >> DIFF_BIT) & 1 == 1;

    let mut bases = [[0u8; 3]; 2];
    for c in 0..3 {
        if differential {
            let shift = 59 - 8 * c as u32;
            let base = ((word >> shift) & 0x1F) as i32;
            let delta = sign_extend3(word >> (shift - 3));
            bases[0][c] = expand5(base as u8);
            bases[1][c] = expand5(((base + delta) & 0x1F) as u8);
        } else {
            let shift = 60 - 8 * c as u32;
            bases[0][c] = expand4(((word >> shift) & 0xF) as u8);
            bases[1][c] = expand4(((word >> (shift - 4)) & 0xF) as u8);
        }
    }
    let tables = [((word >> 37) & 7) as usize, ((word >> 34) & 7) as usize];

    let mut block = PixelBlock::solid([0, 0, 0, 255]);
    for y in 0..4 {
        for x in 0..4 {
            let sub = sub_block_of(flip, x, y);
            let modifier = ETC_MODIFIERS[tables[sub]][pixel_index(word, x, y)];
            let base = bases[sub];
            block.set_pixel(
                x,
                y,
                [
                    clamp255(base[0] as i32 + modifier),
                    clamp255(base[1] as i32 + modifier),
                    clamp255(base[2] as i32 + modifier),
                    255,
                ],
            );
        }
    }
    block
}

/// Source block for the color record, after channel selection and dither.
pub(crate) fn color_source(block: &PixelBlock, channels: Channels, dither: bool) -> PixelBlock {
    match channels {
        Channels::Alpha => block.alpha_as_gray(),
        Channels::Rgb | Channels::Rgba if dither => dither_block(block, [5, 5, 5]),
        Channels::Rgb | Channels::Rgba => *block,
    }
}

/// ETC1 block codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Etc1Codec {
    effort: Effort,
}

impl Etc1Codec {
    pub fn new(effort: Effort) -> Self {
        Self { effort }
    }
}

impl BlockCodec for Etc1Codec {
    fn format(&self) -> Format {
        Format::Etc1
    }

    fn encode(&self, block: &PixelBlock, channels: Channels, dither: bool) -> CompressedBlock {
        let source = color_source(block, channels, dither);
        CompressedBlock::Color(encode_etc1(&source, self.effort).word)
    }

    fn decode(&self, block: &CompressedBlock) -> PixelBlock {
        assert_eq!(block.word_count(), 1, "ETC1 blocks hold a single record");
        decode_etc1(block.color())
    }
}
