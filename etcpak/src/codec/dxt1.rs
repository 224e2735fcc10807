//! DXT1 (BC1) block compression.
//!
//! A DXT1 block stores two RGB565 endpoints and sixteen 2-bit indices:
//! - bits 0-15: color0
//! - bits 16-31: color1
//! - bits 32-63: index of pixel `y*4 + x` at bit `32 + 2*(y*4 + x)`
//!
//! When color0 > color1 the palette holds color0, color1 and the colors at
//! 1/3 and 2/3 between them. Otherwise index 2 is the midpoint and index 3
//! is transparent black.

use super::block::{CompressedBlock, PixelBlock};
use super::color::{pack_rgb565, rgb_distance, unpack_rgb565};
use super::dither::dither_block;
use super::{BlockCodec, Channels, Effort, Format};

const TRANSPARENT: u8 = 3;

/// Decoded 4-entry palette for an endpoint pair.
fn palette(c0: u16, c1: u16) -> [[u8; 4]; 4] {
    let a = unpack_rgb565(c0);
    let b = unpack_rgb565(c1);
    let mix = |wa: u16, wb: u16, div: u16| {
        [0, 1, 2].map(|c| ((wa * a[c] as u16 + wb * b[c] as u16) / div) as u8)
    };
    if c0 > c1 {
        let [r2, g2, b2] = mix(2, 1, 3);
        let [r3, g3, b3] = mix(1, 2, 3);
        [a, b, [r2, g2, b2, 255], [r3, g3, b3, 255]]
    } else {
        let [r2, g2, b2] = mix(1, 1, 2);
        [a, b, [r2, g2, b2, 255], [0, 0, 0, 0]]
    }
}

#[derive(Debug, Clone, Copy)]
struct Encoded {
    word: u64,
    error: u64,
}

/// Index every pixel against the palette of (`c0`, `c1`).
///
/// `keyed` pixels take the transparent index; the pair must then already
/// be in 3-color order.
fn encode_with(pixels: &[[u8; 4]; 16], c0: u16, c1: u16, keyed: &[bool; 16]) -> Encoded {
    let colors = palette(c0, c1);
    let opaque_entries = if c0 > c1 { 4 } else { 3 };
    let mut indices = 0u64;
    let mut error = 0u64;
    for (i, pixel) in pixels.iter().enumerate() {
        let index = if keyed[i] {
            TRANSPARENT
        } else {
            let mut best = u32::MAX;
            let mut best_index = 0u8;
            for (idx, color) in colors.iter().take(opaque_entries).enumerate() {
                let d = rgb_distance(*pixel, *color);
                if d < best {
                    best = d;
                    best_index = idx as u8;
                }
            }
            error += best as u64;
            best_index
        };
        indices |= (index as u64) << (2 * i);
    }
    Encoded {
        word: c0 as u64 | (c1 as u64) << 16 | indices << 32,
        error,
    }
}

/// Bounding-box endpoints over the selected pixels.
fn bounding_box(pixels: &[[u8; 4]; 16], selected: &[bool; 16]) -> ([f32; 3], [f32; 3]) {
    let mut min = [255f32; 3];
    let mut max = [0f32; 3];
    for (pixel, _) in pixels.iter().zip(selected).filter(|&(_, &s)| s) {
        for c in 0..3 {
            min[c] = min[c].min(pixel[c] as f32);
            max[c] = max[c].max(pixel[c] as f32);
        }
    }
    (max, min)
}

/// Endpoints along the principal axis of the selected pixels.
fn principal_axis(
    pixels: &[[u8; 4]; 16],
    selected: &[bool; 16],
) -> Option<([f32; 3], [f32; 3])> {
    let chosen: Vec<[f32; 3]> = pixels
        .iter()
        .zip(selected)
        .filter(|&(_, &s)| s)
        .map(|(p, _)| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect();
    if chosen.is_empty() {
        return None;
    }
    let n = chosen.len() as f32;
    let mut mean = [0f32; 3];
    for p in &chosen {
        for c in 0..3 {
            mean[c] += p[c] / n;
        }
    }
    let mut cov = [[0f32; 3]; 3];
    for p in &chosen {
        let d = [p[0] - mean[0], p[1] - mean[1], p[2] - mean[2]];
        for i in 0..3 {
            for j in 0..3 {
                cov[i][j] += d[i] * d[j];
            }
        }
    }

    let mut axis = [1f32, 1.0, 1.0];
    for _ in 0..8 {
        let next = [0, 1, 2].map(|i| (0..3).map(|j| cov[i][j] * axis[j]).sum::<f32>());
        let len = next.iter().map(|v| v * v).sum::<f32>().sqrt();
        if len < 1e-6 {
            return None;
        }
        axis = next.map(|v| v / len);
    }

    let project = |p: &[f32; 3]| (0..3).map(|c| (p[c] - mean[c]) * axis[c]).sum::<f32>();
    let (mut lo, mut hi) = (f32::MAX, f32::MIN);
    for p in &chosen {
        let t = project(p);
        lo = lo.min(t);
        hi = hi.max(t);
    }
    let at = |t: f32| [0, 1, 2].map(|c| mean[c] + axis[c] * t);
    Some((at(hi), at(lo)))
}

fn encode_dxt1(block: &PixelBlock, keyed_mode: bool, effort: Effort) -> Encoded {
    let pixels = block.pixels();
    let keyed: [bool; 16] = std::array::from_fn(|i| keyed_mode && pixels[i][3] == 0);
    let selected: [bool; 16] = std::array::from_fn(|i| !keyed[i]);
    let any_keyed = keyed.iter().any(|&k| k);

    if selected.iter().all(|&s| !s) {
        return encode_with(pixels, 0, 0, &keyed);
    }

    let mut endpoints = vec![bounding_box(pixels, &selected)];
    if effort == Effort::Thorough {
        endpoints.extend(principal_axis(pixels, &selected));
    }

    let mut best: Option<Encoded> = None;
    for (high, low) in endpoints {
        let a = pack_rgb565(high);
        let b = pack_rgb565(low);
        // 3-color order when transparency is needed, 4-color order otherwise
        let (c0, c1) = if any_keyed {
            (a.min(b), a.max(b))
        } else {
            (a.max(b), a.min(b))
        };
        let candidate = encode_with(pixels, c0, c1, &keyed);
        if best.map_or(true, |current| candidate.error < current.error) {
            best = Some(candidate);
        }
    }
    best.unwrap_or_else(|| encode_with(pixels, 0, 0, &keyed))
}

fn decode_dxt1(word: u64) -> PixelBlock {
    let c0 = (word & 0xFFFF) as u16;
    let c1 = ((word >> 16) & 0xFFFF) as u16;
    let colors = palette(c0, c1);
    let mut block = PixelBlock::solid([0, 0, 0, 255]);
    for y in 0..4 {
        for x in 0..4 {
            let i = y * 4 + x;
            let index = ((word >> (32 + 2 * i)) & 3) as usize;
            block.set_pixel(x, y, colors[index]);
        }
    }
    block
}

/// DXT1 block codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dxt1Codec {
    effort: Effort,
}

impl Dxt1Codec {
    pub fn new(effort: Effort) -> Self {
        Self { effort }
    }
}

impl BlockCodec for Dxt1Codec {
    fn format(&self) -> Format {
        Format::Dxt1
    }

    fn encode(&self, block: &PixelBlock, channels: Channels, dither: bool) -> CompressedBlock {
        let encoded = match channels {
            Channels::Alpha => encode_dxt1(&block.alpha_as_gray(), false, self.effort),
            Channels::Rgb | Channels::Rgba => {
                let source = if dither {
                    dither_block(block, [5, 6, 5])
                } else {
                    *block
                };
                // Dithering leaves alpha alone, so keying still sees the source alpha.
                encode_dxt1(&source, channels == Channels::Rgba, self.effort)
            }
        };
        CompressedBlock::Color(encoded.word)
    }

    fn decode(&self, block: &CompressedBlock) -> PixelBlock {
        assert_eq!(block.word_count(), 1, "DXT1 blocks hold a single record");
        decode_dxt1(block.color())
    }
}
