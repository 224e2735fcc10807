//! ETC2 RGB and RGBA encoding.
//!
//! ETC2 reuses invalid differential-mode records: when a base channel plus
//! its delta leaves the 0..=31 range, the record selects a different mode.
//!
//! - red overflows: T mode
//! - green overflows: H mode
//! - blue overflows: planar mode
//!
//! The encoder builds each mode's payload and then sets the free bits so
//! the decoder sees exactly the intended overflow.

use super::alpha::{decode_alpha, encode_alpha};
use super::block::{CompressedBlock, PixelBlock};
use super::color::{clamp255, expand4, expand6, expand7, quantize, rgb_distance};
use super::etc1::{decode_etc1, encode_etc1, pixel_index, sign_extend3, Candidate};
use super::tables::ETC2_DISTANCES;
use super::{BlockCodec, Channels, Effort, Format};

const RED_BASE: u32 = 59;
const RED_DELTA: u32 = 56;
const GREEN_BASE: u32 = 51;
const GREEN_DELTA: u32 = 48;
const BLUE_BASE: u32 = 43;
const BLUE_DELTA: u32 = 40;
const DIFF_BIT: u32 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Etc1,
    T,
    H,
    Planar,
}

fn channel_overflows(word: u64, base_shift: u32, delta_shift: u32) -> bool {
    let base = ((word >> base_shift) & 0x1F) as i32;
    let sum = base + sign_extend3(word >> delta_shift);
    !(0..=31).contains(&sum)
}

fn mode_of(word: u64) -> Mode {
    if (word >> DIFF_BIT) & 1 == 0 {
        Mode::Etc1
    } else if channel_overflows(word, RED_BASE, RED_DELTA) {
        Mode::T
    } else if channel_overflows(word, GREEN_BASE, GREEN_DELTA) {
        Mode::H
    } else if channel_overflows(word, BLUE_BASE, BLUE_DELTA) {
        Mode::Planar
    } else {
        Mode::Etc1
    }
}

/// Set the three free high bits of a base field and the free sign bit of
/// its delta so that base + delta falls outside 0..=31.
fn force_overflow(word: u64, base_shift: u32, delta_shift: u32) -> u64 {
    let low_base = (word >> base_shift) & 3;
    let low_delta = (word >> delta_shift) & 3;
    let cleared = word & !(0b111u64 << (base_shift + 2)) & !(1u64 << (delta_shift + 2));
    if low_base + low_delta < 4 {
        cleared | (1u64 << (delta_shift + 2))
    } else {
        cleared | (0b111u64 << (base_shift + 2))
    }
}

/// Set the free high bit of a base field so that base + delta stays
/// inside 0..=31.
fn prevent_overflow(word: u64, base_shift: u32, delta_shift: u32) -> u64 {
    let low_base = ((word >> base_shift) & 0xF) as i32;
    let delta = sign_extend3(word >> delta_shift);
    let free = 1u64 << (base_shift + 4);
    if low_base + delta >= 0 {
        word & !free
    } else {
        word | free
    }
}

// =============================================================================
// T and H modes
// =============================================================================

fn pack_index_planes(indices: &[u8; 16]) -> u64 {
    let mut word = 0u64;
    for y in 0..4 {
        for x in 0..4 {
            let k = x * 4 + y;
            let index = indices[y * 4 + x] as u64;
            word |= (index >> 1) << (16 + k);
            word |= (index & 1) << k;
        }
    }
    word
}

/// Nearest paint color index for every pixel.
fn assign_paints(block: &PixelBlock, paints: &[[u8; 4]; 4]) -> [u8; 16] {
    let mut indices = [0u8; 16];
    for (i, pixel) in block.pixels().iter().enumerate() {
        let mut best = u32::MAX;
        for (p, paint) in paints.iter().enumerate() {
            let d = rgb_distance(*pixel, *paint);
            if d < best {
                best = d;
                indices[i] = p as u8;
            }
        }
    }
    indices
}

fn offset_color(base: [u8; 3], d: i32) -> [u8; 4] {
    [
        clamp255(base[0] as i32 + d),
        clamp255(base[1] as i32 + d),
        clamp255(base[2] as i32 + d),
        255,
    ]
}

fn t_paints(base1: [u8; 3], base2: [u8; 3], distance: i32) -> [[u8; 4]; 4] {
    [
        [base1[0], base1[1], base1[2], 255],
        offset_color(base2, distance),
        [base2[0], base2[1], base2[2], 255],
        offset_color(base2, -distance),
    ]
}

fn h_paints(base1: [u8; 3], base2: [u8; 3], distance: i32) -> [[u8; 4]; 4] {
    [
        offset_color(base1, distance),
        offset_color(base1, -distance),
        offset_color(base2, distance),
        offset_color(base2, -distance),
    ]
}

fn unpack_t_bases(word: u64) -> ([u8; 3], [u8; 3], usize) {
    let r1 = (((word >> 59) & 3) << 2 | ((word >> 56) & 3)) as u8;
    let base1 = [r1, ((word >> 52) & 0xF) as u8, ((word >> 48) & 0xF) as u8];
    let base2 = [
        ((word >> 44) & 0xF) as u8,
        ((word >> 40) & 0xF) as u8,
        ((word >> 36) & 0xF) as u8,
    ];
    let distance = (((word >> 34) & 3) << 1 | ((word >> 32) & 1)) as usize;
    (base1, base2, distance)
}

fn pack_t(base1: [u8; 3], base2: [u8; 3], distance: usize, indices: &[u8; 16]) -> u64 {
    let mut word = 1u64 << DIFF_BIT;
    word |= ((base1[0] as u64 >> 2) & 3) << 59;
    word |= (base1[0] as u64 & 3) << 56;
    word |= (base1[1] as u64) << 52;
    word |= (base1[2] as u64) << 48;
    word |= (base2[0] as u64) << 44;
    word |= (base2[1] as u64) << 40;
    word |= (base2[2] as u64) << 36;
    word |= ((distance as u64 >> 1) & 3) << 34;
    word |= (distance as u64 & 1) << 32;
    word |= pack_index_planes(indices);
    force_overflow(word, RED_BASE, RED_DELTA)
}

fn packed12(c: [u8; 3]) -> u32 {
    (c[0] as u32) << 8 | (c[1] as u32) << 4 | c[2] as u32
}

fn unpack_h_bases(word: u64) -> ([u8; 3], [u8; 3], usize) {
    let base1 = [
        ((word >> 59) & 0xF) as u8,
        (((word >> 56) & 7) << 1 | ((word >> 52) & 1)) as u8,
        (((word >> 51) & 1) << 3 | ((word >> 47) & 7)) as u8,
    ];
    let base2 = [
        ((word >> 43) & 0xF) as u8,
        ((word >> 39) & 0xF) as u8,
        ((word >> 35) & 0xF) as u8,
    ];
    let order = (packed12(base1) >= packed12(base2)) as u64;
    let distance = (((word >> 34) & 1) << 2 | ((word >> 32) & 1) << 1 | order) as usize;
    (base1, base2, distance)
}

fn pack_h(base1: [u8; 3], base2: [u8; 3], distance: usize, indices: &[u8; 16]) -> u64 {
    let mut word = 1u64 << DIFF_BIT;
    word |= (base1[0] as u64) << 59;
    word |= ((base1[1] as u64 >> 1) & 7) << 56;
    word |= (base1[1] as u64 & 1) << 52;
    word |= ((base1[2] as u64 >> 3) & 1) << 51;
    word |= (base1[2] as u64 & 7) << 47;
    word |= (base2[0] as u64) << 43;
    word |= (base2[1] as u64) << 39;
    word |= (base2[2] as u64) << 35;
    word |= ((distance as u64 >> 2) & 1) << 34;
    word |= ((distance as u64 >> 1) & 1) << 32;
    word |= pack_index_planes(indices);
    let word = prevent_overflow(word, RED_BASE, RED_DELTA);
    force_overflow(word, GREEN_BASE, GREEN_DELTA)
}

/// Split the block into two color clusters with a few rounds of 2-means.
fn two_clusters(block: &PixelBlock) -> [[f32; 3]; 2] {
    let luma = |p: &[u8; 4]| 299 * p[0] as u32 + 587 * p[1] as u32 + 114 * p[2] as u32;
    let pixels = block.pixels();
    let darkest = pixels.iter().min_by_key(|p| luma(p)).copied().unwrap_or([0; 4]);
    let farthest = pixels
        .iter()
        .max_by_key(|p| rgb_distance(**p, darkest))
        .copied()
        .unwrap_or([0; 4]);
    let mut centers = [darkest, farthest].map(|p| [p[0] as f32, p[1] as f32, p[2] as f32]);

    for _ in 0..4 {
        let mut sums = [[0f32; 3]; 2];
        let mut counts = [0f32; 2];
        for p in pixels {
            let dist = |c: &[f32; 3]| {
                (0..3)
                    .map(|i| (p[i] as f32 - c[i]).powi(2))
                    .sum::<f32>()
            };
            let cluster = (dist(&centers[1]) < dist(&centers[0])) as usize;
            for i in 0..3 {
                sums[cluster][i] += p[i] as f32;
            }
            counts[cluster] += 1.0;
        }
        for cluster in 0..2 {
            if counts[cluster] > 0.0 {
                centers[cluster] = sums[cluster].map(|s| s / counts[cluster]);
            }
        }
    }
    centers
}

fn decode_t_or_h(word: u64, mode: Mode) -> PixelBlock {
    let paints = if mode == Mode::T {
        let (base1, base2, distance) = unpack_t_bases(word);
        t_paints(base1.map(expand4), base2.map(expand4), ETC2_DISTANCES[distance])
    } else {
        let (base1, base2, distance) = unpack_h_bases(word);
        h_paints(base1.map(expand4), base2.map(expand4), ETC2_DISTANCES[distance])
    };
    let mut block = PixelBlock::solid([0, 0, 0, 255]);
    for y in 0..4 {
        for x in 0..4 {
            block.set_pixel(x, y, paints[pixel_index(word, x, y)]);
        }
    }
    block
}

fn search_t(block: &PixelBlock, clusters: [[u8; 3]; 2], best: &mut Candidate) {
    for (single, pair) in [(clusters[0], clusters[1]), (clusters[1], clusters[0])] {
        let (e1, e2) = (single.map(expand4), pair.map(expand4));
        for (distance, &d) in ETC2_DISTANCES.iter().enumerate() {
            let indices = assign_paints(block, &t_paints(e1, e2, d));
            let word = pack_t(single, pair, distance, &indices);
            let error = decode_etc2_color(word).rgb_error(block);
            best.keep_better(Candidate { word, error });
        }
    }
}

fn search_h(block: &PixelBlock, clusters: [[u8; 3]; 2], best: &mut Candidate) {
    for distance in 0..ETC2_DISTANCES.len() {
        let wants_first_larger = distance & 1 == 1;
        let first_larger = packed12(clusters[0]) >= packed12(clusters[1]);
        let (base1, base2) = if first_larger == wants_first_larger {
            (clusters[0], clusters[1])
        } else {
            (clusters[1], clusters[0])
        };
        // Equal bases always decode with the low distance bit set.
        if (packed12(base1) >= packed12(base2)) != wants_first_larger {
            continue;
        }
        let paints = h_paints(base1.map(expand4), base2.map(expand4), ETC2_DISTANCES[distance]);
        let indices = assign_paints(block, &paints);
        let word = pack_h(base1, base2, distance, &indices);
        let error = decode_etc2_color(word).rgb_error(block);
        best.keep_better(Candidate { word, error });
    }
}

// =============================================================================
// Planar mode
// =============================================================================

/// Quantized planar coefficients: origin, horizontal and vertical colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Plane {
    origin: [u8; 3],
    horizontal: [u8; 3],
    vertical: [u8; 3],
}

const PLANE_BITS: [u32; 3] = [6, 7, 6];

fn expand_plane_channel(c: usize, value: u8) -> u8 {
    if PLANE_BITS[c] == 7 {
        expand7(value)
    } else {
        expand6(value)
    }
}

#[inline]
fn plane_value(o: i32, h: i32, v: i32, x: i32, y: i32) -> u8 {
    clamp255((x * (h - o) + y * (v - o) + 4 * o + 2) >> 2)
}

fn plane_channel_error(block: &PixelBlock, c: usize, o: u8, h: u8, v: u8) -> u64 {
    let (o, h, v) = (
        expand_plane_channel(c, o) as i32,
        expand_plane_channel(c, h) as i32,
        expand_plane_channel(c, v) as i32,
    );
    let mut error = 0u64;
    for y in 0..4 {
        for x in 0..4 {
            let d = block.pixel(x, y)[c] as i32 - plane_value(o, h, v, x as i32, y as i32) as i32;
            error += (d * d) as u64;
        }
    }
    error
}

/// Least-squares fit of a plane through each channel.
fn fit_plane(block: &PixelBlock, effort: Effort) -> Plane {
    let mut plane = Plane {
        origin: [0; 3],
        horizontal: [0; 3],
        vertical: [0; 3],
    };
    for c in 0..3 {
        // c(x, y) = a + b*x + d*y over x, y in 0..4
        let mut sum = 0f32;
        let mut sum_x = 0f32;
        let mut sum_y = 0f32;
        for y in 0..4 {
            for x in 0..4 {
                let v = block.pixel(x, y)[c] as f32;
                sum += v;
                sum_x += v * x as f32;
                sum_y += v * y as f32;
            }
        }
        let mean = sum / 16.0;
        // Coordinates are centred at 1.5 with variance 1.25 per axis.
        let slope_x = (sum_x - 1.5 * sum) / 20.0;
        let slope_y = (sum_y - 1.5 * sum) / 20.0;
        let origin = mean - 1.5 * slope_x - 1.5 * slope_y;
        let bits = PLANE_BITS[c];
        let mut best = (
            quantize(origin, bits),
            quantize(origin + 4.0 * slope_x, bits),
            quantize(origin + 4.0 * slope_y, bits),
        );

        if effort == Effort::Thorough {
            let max = (1i32 << bits) - 1;
            let start = best;
            let mut best_error = plane_channel_error(block, c, best.0, best.1, best.2);
            for dof in -1..=1 {
                for dh in -1..=1 {
                    for dv in -1..=1 {
                        let o = start.0 as i32 + dof;
                        let h = start.1 as i32 + dh;
                        let v = start.2 as i32 + dv;
                        if [o, h, v].iter().any(|&q| !(0..=max).contains(&q)) {
                            continue;
                        }
                        let error = plane_channel_error(block, c, o as u8, h as u8, v as u8);
                        if error < best_error {
                            best_error = error;
                            best = (o as u8, h as u8, v as u8);
                        }
                    }
                }
            }
        }
        plane.origin[c] = best.0;
        plane.horizontal[c] = best.1;
        plane.vertical[c] = best.2;
    }
    plane
}

fn pack_planar(plane: &Plane) -> u64 {
    let [ro, go, bo] = plane.origin.map(|c| c as u64);
    let [rh, gh, bh] = plane.horizontal.map(|c| c as u64);
    let [rv, gv, bv] = plane.vertical.map(|c| c as u64);
    let mut word = 1u64 << DIFF_BIT;
    word |= ro << 57;
    word |= (go >> 6) << 56;
    word |= (go & 0x3F) << 49;
    word |= (bo >> 5) << 48;
    word |= ((bo >> 3) & 3) << 43;
    word |= (bo & 7) << 39;
    word |= (rh >> 1) << 34;
    word |= (rh & 1) << 32;
    word |= gh << 25;
    word |= bh << 19;
    word |= rv << 13;
    word |= gv << 6;
    word |= bv;
    let word = prevent_overflow(word, RED_BASE, RED_DELTA);
    let word = prevent_overflow(word, GREEN_BASE, GREEN_DELTA);
    force_overflow(word, BLUE_BASE, BLUE_DELTA)
}

fn unpack_planar(word: u64) -> Plane {
    let ro = (word >> 57) & 0x3F;
    let go = ((word >> 56) & 1) << 6 | ((word >> 49) & 0x3F);
    let bo = ((word >> 48) & 1) << 5 | ((word >> 43) & 3) << 3 | ((word >> 39) & 7);
    let rh = ((word >> 34) & 0x1F) << 1 | ((word >> 32) & 1);
    Plane {
        origin: [ro as u8, go as u8, bo as u8],
        horizontal: [
            rh as u8,
            ((word >> 25) & 0x7F) as u8,
            ((word >> 19) & 0x3F) as u8,
        ],
        vertical: [
            ((word >> 13) & 0x3F) as u8,
            ((word >> 6) & 0x7F) as u8,
            (word & 0x3F) as u8,
        ],
    }
}

fn decode_planar(word: u64) -> PixelBlock {
    let plane = unpack_planar(word);
    let mut block = PixelBlock::solid([0, 0, 0, 255]);
    for y in 0..4 {
        for x in 0..4 {
            let mut pixel = [0, 0, 0, 255];
            for (c, value) in pixel.iter_mut().take(3).enumerate() {
                *value = plane_value(
                    expand_plane_channel(c, plane.origin[c]) as i32,
                    expand_plane_channel(c, plane.horizontal[c]) as i32,
                    expand_plane_channel(c, plane.vertical[c]) as i32,
                    x as i32,
                    y as i32,
                );
            }
            block.set_pixel(x, y, pixel);
        }
    }
    block
}

// =============================================================================
// Color record
// =============================================================================

/// Decode an ETC2 color record in any mode.
pub(crate) fn decode_etc2_color(word: u64) -> PixelBlock {
    match mode_of(word) {
        Mode::Etc1 => decode_etc1(word),
        mode @ (Mode::T | Mode::H) => decode_t_or_h(word, mode),
        Mode::Planar => decode_planar(word),
    }
}

/// Search ETC1 modes, planar, T and H; keep the lowest error.
pub(crate) fn encode_etc2_color(block: &PixelBlock, effort: Effort) -> Candidate {
    let mut best = encode_etc1(block, effort);
    if best.error == 0 {
        return best;
    }

    let planar = pack_planar(&fit_plane(block, effort));
    best.keep_better(Candidate {
        word: planar,
        error: decode_etc2_color(planar).rgb_error(block),
    });

    let clusters = two_clusters(block).map(|c| c.map(|v| quantize(v, 4)));
    search_t(block, clusters, &mut best);
    search_h(block, clusters, &mut best);
    best
}

fn color_source(block: &PixelBlock, channels: Channels) -> PixelBlock {
    match channels {
        Channels::Alpha => block.alpha_as_gray(),
        Channels::Rgb | Channels::Rgba => *block,
    }
}

/// ETC2 RGB block codec. Dithering is never applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Etc2RgbCodec {
    effort: Effort,
}

impl Etc2RgbCodec {
    pub fn new(effort: Effort) -> Self {
        Self { effort }
    }
}

impl BlockCodec for Etc2RgbCodec {
    fn format(&self) -> Format {
        Format::Etc2Rgb
    }

    fn encode(&self, block: &PixelBlock, channels: Channels, _dither: bool) -> CompressedBlock {
        let source = color_source(block, channels);
        CompressedBlock::Color(encode_etc2_color(&source, self.effort).word)
    }

    fn decode(&self, block: &CompressedBlock) -> PixelBlock {
        assert_eq!(block.word_count(), 1, "ETC2 RGB blocks hold a single record");
        decode_etc2_color(block.color())
    }
}

/// ETC2 RGBA block codec: ETC2 color record plus EAC alpha record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Etc2RgbaCodec {
    effort: Effort,
}

impl Etc2RgbaCodec {
    pub fn new(effort: Effort) -> Self {
        Self { effort }
    }
}

impl BlockCodec for Etc2RgbaCodec {
    fn format(&self) -> Format {
        Format::Etc2Rgba
    }

    fn encode(&self, block: &PixelBlock, channels: Channels, _dither: bool) -> CompressedBlock {
        let source = color_source(block, channels);
        let alpha = match channels {
            Channels::Rgb => encode_alpha(&PixelBlock::solid([0, 0, 0, 255])),
            Channels::Rgba | Channels::Alpha => encode_alpha(block),
        };
        CompressedBlock::ColorAlpha {
            alpha,
            color: encode_etc2_color(&source, self.effort).word,
        }
    }

    fn decode(&self, block: &CompressedBlock) -> PixelBlock {
        match block {
            CompressedBlock::ColorAlpha { alpha, color } => {
                let mut pixels = decode_etc2_color(*color);
                decode_alpha(*alpha, &mut pixels);
                pixels
            }
            CompressedBlock::Color(_) => panic!("ETC2 RGBA blocks hold two records"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::etc1::Etc1Codec;
    use proptest::prelude::*;

    fn gradient_block() -> PixelBlock {
        let mut block = PixelBlock::solid([0, 0, 0, 255]);
        for y in 0..4 {
            for x in 0..4 {
                block.set_pixel(
                    x,
                    y,
                    [(20 + x * 40) as u8, (30 + y * 45) as u8, (200 - x * 20 - y * 20) as u8, 255],
                );
            }
        }
        block
    }

    fn two_color_block(a: [u8; 4], b: [u8; 4]) -> PixelBlock {
        let mut block = PixelBlock::solid(a);
        for (x, y) in [(1, 1), (2, 2), (0, 3), (3, 0), (2, 1)] {
            block.set_pixel(x, y, b);
        }
        block
    }

    #[test]
    fn test_force_overflow_always_overflows() {
        for low in 0..16u64 {
            let word = (low & 3) << RED_BASE | (low >> 2) << RED_DELTA;
            let forced = force_overflow(word, RED_BASE, RED_DELTA);
            assert!(channel_overflows(forced, RED_BASE, RED_DELTA), "low bits {}", low);
            assert_eq!(forced & (3 << RED_BASE), word & (3 << RED_BASE));
        }
    }

    #[test]
    fn test_prevent_overflow_keeps_range() {
        for low in 0..16u64 {
            for delta in 0..8u64 {
                let word = low << GREEN_BASE | delta << GREEN_DELTA;
                let fixed = prevent_overflow(word, GREEN_BASE, GREEN_DELTA);
                assert!(!channel_overflows(fixed, GREEN_BASE, GREEN_DELTA));
            }
        }
    }

    #[test]
    fn test_t_mode_round_trip_layout() {
        let indices = [0, 1, 2, 3, 3, 2, 1, 0, 0, 0, 1, 1, 2, 2, 3, 3];
        let word = pack_t([13, 2, 7], [4, 9, 15], 5, &indices);
        assert_eq!(mode_of(word), Mode::T);
        assert_eq!(unpack_t_bases(word), ([13, 2, 7], [4, 9, 15], 5));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(pixel_index(word, x, y), indices[y * 4 + x] as usize);
            }
        }
    }

    #[test]
    fn test_h_mode_round_trip_layout() {
        let indices = [3; 16];
        // 12-bit value of first base is larger, so the order bit is 1.
        let word = pack_h([9, 11, 13], [2, 3, 4], 3, &indices);
        assert_eq!(mode_of(word), Mode::H);
        assert_eq!(unpack_h_bases(word), ([9, 11, 13], [2, 3, 4], 3));
    }

    #[test]
    fn test_planar_round_trip_layout() {
        let plane = Plane {
            origin: [63, 127, 33],
            horizontal: [21, 64, 1],
            vertical: [0, 99, 62],
        };
        let word = pack_planar(&plane);
        assert_eq!(mode_of(word), Mode::Planar);
        assert_eq!(unpack_planar(word), plane);
    }

    #[test]
    fn test_planar_decode_formula() {
        let plane = Plane {
            origin: [0, 0, 0],
            horizontal: [63, 0, 0],
            vertical: [0, 127, 0],
        };
        let block = decode_planar(pack_planar(&plane));
        assert_eq!(block.pixel(0, 0), [0, 0, 0, 255]);
        // (1 * 255 + 2) >> 2 = 64
        assert_eq!(block.pixel(1, 0), [64, 0, 0, 255]);
        assert_eq!(block.pixel(0, 2), [0, 128, 0, 255]);
    }

    #[test]
    fn test_gradient_prefers_better_mode_than_etc1() {
        let block = gradient_block();
        let etc1 = encode_etc1(&block, Effort::Fast);
        let etc2 = encode_etc2_color(&block, Effort::Fast);
        assert!(etc2.error < etc1.error);
        assert_eq!(etc2.error, decode_etc2_color(etc2.word).rgb_error(&block));
    }

    #[test]
    fn test_etc1_records_decode_identically() {
        let block = two_color_block([10, 200, 30, 255], [90, 20, 240, 255]);
        let word = encode_etc1(&block, Effort::Fast).word;
        let etc1 = Etc1Codec::default().decode(&CompressedBlock::Color(word));
        assert_eq!(decode_etc2_color(word), etc1);
    }

    #[test]
    fn test_rgba_codec_keeps_alpha() {
        let codec = Etc2RgbaCodec::new(Effort::Fast);
        let mut block = PixelBlock::solid([40, 80, 120, 255]);
        block.set_pixel(0, 0, [40, 80, 120, 64]);
        let decoded = codec.decode(&codec.encode(&block, Channels::Rgba, false));
        assert!(decoded.max_alpha_error(&block) <= 8);
        assert!(decoded.max_channel_error(&block) <= 8);
    }

    #[test]
    fn test_rgba_codec_with_rgb_channels_is_opaque() {
        let codec = Etc2RgbaCodec::new(Effort::Fast);
        let block = PixelBlock::solid([40, 80, 120, 10]);
        let decoded = codec.decode(&codec.encode(&block, Channels::Rgb, false));
        assert!(decoded.pixels().iter().all(|p| p[3] == 255));
    }

    fn arb_block() -> impl Strategy<Value = PixelBlock> {
        prop::array::uniform16(prop::array::uniform4(any::<u8>())).prop_map(PixelBlock::new)
    }

    proptest! {
        #[test]
        fn prop_etc2_never_worse_than_etc1(block in arb_block()) {
            for effort in [Effort::Fast, Effort::Thorough] {
                let etc1 = encode_etc1(&block, effort);
                let etc2 = encode_etc2_color(&block, effort);
                prop_assert!(etc2.error <= etc1.error);
            }
        }

        #[test]
        fn prop_thorough_never_worse(block in arb_block()) {
            let fast = encode_etc2_color(&block, Effort::Fast);
            let thorough = encode_etc2_color(&block, Effort::Thorough);
            prop_assert!(thorough.error <= fast.error);
        }

        #[test]
        fn prop_reported_error_matches_decode(block in arb_block()) {
            let candidate = encode_etc2_color(&block, Effort::Fast);
            prop_assert_eq!(candidate.error, decode_etc2_color(candidate.word).rgb_error(&block));
        }

        #[test]
        fn prop_two_color_blocks_are_close(a in prop::array::uniform3(any::<u8>()), b in prop::array::uniform3(any::<u8>())) {
            let block = two_color_block([a[0], a[1], a[2], 255], [b[0], b[1], b[2], 255]);
            let decoded = decode_etc2_color(encode_etc2_color(&block, Effort::Fast).word);
            // T mode alone reaches 4-bit precision for both colors
            prop_assert!(decoded.rgb_error(&block) <= 16 * 3 * 64);
        }
    }
}
