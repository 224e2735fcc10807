//! Ordered dithering applied before quantization.

use super::block::PixelBlock;
use super::color::clamp255;
use super::tables::BAYER_4X4;

/// Apply a 4×4 ordered dither to the color channels.
///
/// `bits` is the quantization precision of r, g and b in the target
/// format. The dither amplitude spans one quantization step of each
/// channel. Alpha is untouched.
pub fn dither_block(block: &PixelBlock, bits: [u32; 3]) -> PixelBlock {
    let mut out = *block;
    for y in 0..4 {
        for x in 0..4 {
            let mut pixel = block.pixel(x, y);
            let threshold = BAYER_4X4[y][x];
            for c in 0..3 {
                let step = 256 >> bits[c];
                let offset = (threshold * 2 - 15) * step / 32;
                pixel[c] = clamp255(pixel[c] as i32 + offset);
            }
            out.set_pixel(x, y, pixel);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dither_keeps_alpha() {
        let block = PixelBlock::solid([100, 100, 100, 42]);
        let dithered = dither_block(&block, [5, 6, 5]);
        assert!(dithered.pixels().iter().all(|p| p[3] == 42));
    }

    #[test]
    fn test_dither_amplitude_within_step() {
        let block = PixelBlock::solid([128, 128, 128, 255]);
        let dithered = dither_block(&block, [5, 5, 5]);
        assert!(dithered.max_channel_error(&block) <= 4);
        assert_ne!(dithered, block);
    }

    #[test]
    fn test_dither_saturates() {
        let block = PixelBlock::solid([255, 0, 255, 255]);
        let dithered = dither_block(&block, [5, 6, 5]);
        for p in dithered.pixels() {
            assert!(p[0] >= 250 && p[1] <= 4);
        }
    }
}
