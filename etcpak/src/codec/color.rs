//! Color quantization helpers shared by the block encoders.

/// Expand a 4-bit channel to 8 bits by bit replication.
#[inline]
pub fn expand4(c: u8) -> u8 {
    (c << 4) | c
}

/// Expand a 5-bit channel to 8 bits by bit replication.
#[inline]
pub fn expand5(c: u8) -> u8 {
    (c << 3) | (c >> 2)
}

/// Expand a 6-bit channel to 8 bits by bit replication.
#[inline]
pub fn expand6(c: u8) -> u8 {
    (c << 2) | (c >> 4)
}

/// Expand a 7-bit channel to 8 bits by bit replication.
#[inline]
pub fn expand7(c: u8) -> u8 {
    (c << 1) | (c >> 6)
}

/// Quantize an 8-bit value (possibly fractional) to `bits` bits, rounding
/// to the nearest representable level.
#[inline]
pub fn quantize(value: f32, bits: u32) -> u8 {
    let max = ((1u32 << bits) - 1) as f32;
    (value.clamp(0.0, 255.0) * max / 255.0).round() as u8
}

/// Clamp a signed intermediate value to the 8-bit range.
#[inline]
pub fn clamp255(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Squared r, g, b distance between two pixels; alpha is ignored.
#[inline]
pub fn rgb_distance(a: [u8; 4], b: [u8; 4]) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Pack an RGB888 color into RGB565 with rounding.
///
/// - Bits 15-11: red (5 bits)
/// - Bits 10-5: green (6 bits)
/// - Bits 4-0: blue (5 bits)
pub fn pack_rgb565(rgb: [f32; 3]) -> u16 {
    let r = quantize(rgb[0], 5) as u16;
    let g = quantize(rgb[1], 6) as u16;
    let b = quantize(rgb[2], 5) as u16;
    (r << 11) | (g << 5) | b
}

/// Unpack RGB565 to an opaque RGBA pixel.
pub fn unpack_rgb565(color: u16) -> [u8; 4] {
    [
        expand5(((color >> 11) & 0x1F) as u8),
        expand6(((color >> 5) & 0x3F) as u8),
        expand5((color & 0x1F) as u8),
        255,
    ]
}

/// Mean r, g, b of a set of pixels.
pub fn mean_rgb<'a>(pixels: impl IntoIterator<Item = &'a [u8; 4]>) -> [f32; 3] {
    let mut sum = [0f32; 3];
    let mut count = 0f32;
    for p in pixels {
        for c in 0..3 {
            sum[c] += p[c] as f32;
        }
        count += 1.0;
    }
    if count == 0.0 {
        return sum;
    }
    sum.map(|s| s / count)
}
