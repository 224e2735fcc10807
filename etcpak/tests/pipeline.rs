//! Integration tests for the compression pipeline.
//!
//! These tests drive the public API end to end:
//! - image → partitioner → scheduler → texture
//! - texture → container file → texture → decoded image
//! - decoded image → quality report
//!
//! Run with: `cargo test --test pipeline`

use std::collections::HashSet;
use std::sync::Arc;

use etcpak::codec::{Channels, Effort, Format};
use etcpak::compress::{CompressError, Compressor};
use etcpak::config::CompressionConfig;
use etcpak::container::{load_container, save_container};
use etcpak::log::NoOpLogger;
use etcpak::partition::{PartitionError, WorkPartitioner};
use etcpak::quality::QualityReport;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Helper Functions
// ============================================================================

fn compressor(config: CompressionConfig) -> Compressor {
    Compressor::new(config, Arc::new(NoOpLogger)).unwrap()
}

/// Smooth image with a little noise, closer to real content than pure noise.
fn photo_like(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbaImage::from_fn(width, height, |x, y| {
        let noise = rng.random_range(0..16u32);
        Rgba([
            ((x * 255 / width) + noise).min(255) as u8,
            ((y * 255 / height) + noise).min(255) as u8,
            (((x + y) * 127 / (width + height)) + 64 + noise).min(255) as u8,
            255,
        ])
    })
}

fn random_image(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbaImage::from_fn(width, height, |_, _| {
        Rgba([rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>(), 255])
    })
}

fn psnr(format: Format, effort: Effort, image: &RgbaImage) -> f64 {
    let config = CompressionConfig::new(format).with_effort(effort);
    let texture = compressor(config).compress_image(image.clone()).unwrap();
    QualityReport::compare(image, &texture.decode()).unwrap().psnr
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_solid_red_etc1() {
    let image = RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255]));
    let texture = compressor(CompressionConfig::new(Format::Etc1))
        .compress_image(image.clone())
        .unwrap();

    let decoded = texture.decode();
    for pixel in decoded.pixels() {
        assert!(pixel[0] >= 247, "red channel too low: {:?}", pixel);
        assert!(pixel[1] <= 8 && pixel[2] <= 8, "unexpected color: {:?}", pixel);
    }
}

#[test]
fn test_every_format_reaches_reasonable_quality() {
    let image = photo_like(64, 32, 1);
    for format in [Format::Etc1, Format::Etc2Rgb, Format::Etc2Rgba, Format::Dxt1] {
        let value = psnr(format, Effort::Fast, &image);
        assert!(value > 28.0, "{} PSNR {:.2} too low", format, value);
    }
}

#[test]
fn test_etc2_rgba_preserves_alpha() {
    let image = RgbaImage::from_fn(32, 32, |x, y| Rgba([120, 80, 40, ((x + y) * 4) as u8]));
    let texture = compressor(CompressionConfig::new(Format::Etc2Rgba))
        .compress_image(image.clone())
        .unwrap();

    let decoded = texture.decode();
    for (original, restored) in image.pixels().zip(decoded.pixels()) {
        let diff = (i16::from(original[3]) - i16::from(restored[3])).abs();
        assert!(diff <= 12, "alpha {} decoded as {}", original[3], restored[3]);
    }
}

#[test]
fn test_container_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("texture.pvr");
    let config = CompressionConfig::new(Format::Etc2Rgb).with_mipmaps(true);
    let texture = compressor(config).compress_image(photo_like(32, 16, 2)).unwrap();

    save_container(&path, &texture).unwrap();
    let loaded = load_container(&path).unwrap();

    assert_eq!(loaded.format(), Format::Etc2Rgb);
    assert_eq!(loaded.level_count(), texture.level_count());
    assert_eq!(loaded.to_bytes(), texture.to_bytes());
    assert_eq!(loaded.decode(), texture.decode());
}

// ============================================================================
// Effort
// ============================================================================

#[test]
fn test_thorough_never_worse_than_fast() {
    for (seed, format) in [(3, Format::Etc1), (4, Format::Etc2Rgb), (5, Format::Dxt1)] {
        let image = random_image(16, 16, seed);
        let fast = psnr(format, Effort::Fast, &image);
        let thorough = psnr(format, Effort::Thorough, &image);
        assert!(
            thorough >= fast - 1e-9,
            "{}: thorough {:.3} below fast {:.3}",
            format,
            thorough,
            fast
        );
    }
}

#[test]
fn test_etc2_never_worse_than_etc1() {
    let image = random_image(32, 32, 6);
    assert!(psnr(Format::Etc2Rgb, Effort::Fast, &image) >= psnr(Format::Etc1, Effort::Fast, &image));
}

// ============================================================================
// Partitioning and scheduling
// ============================================================================

#[test]
fn test_partition_covers_every_block_once() {
    let mut partitioner = WorkPartitioner::new(photo_like(128, 64, 7), true, 4).unwrap();
    let total: usize = partitioner.levels().iter().map(|l| l.block_count()).sum();

    let mut seen = HashSet::new();
    while let Some(unit) = partitioner.next_part() {
        for index in unit.block_range() {
            assert!(seen.insert(index), "block {} assigned twice", index);
        }
    }
    assert_eq!(seen.len(), total);
    assert_eq!(seen.iter().max().copied(), Some(total - 1));
}

#[test]
fn test_every_block_is_written() {
    let image = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 255]));
    let config = CompressionConfig::new(Format::Etc1)
        .with_mipmaps(true)
        .with_workers(3);
    let texture = compressor(config).compress_image(image).unwrap();

    let expected = texture.block(0);
    for index in 0..texture.block_count() {
        // A flat image encodes to the same record at every level.
        assert_eq!(texture.block(index), expected, "block {} differs", index);
    }
}

#[test]
fn test_worker_count_does_not_change_output() {
    let image = photo_like(64, 64, 8);
    let single = compressor(CompressionConfig::new(Format::Dxt1).with_workers(1).with_mipmaps(true))
        .compress_image(image.clone())
        .unwrap();
    let many = compressor(CompressionConfig::new(Format::Dxt1).with_workers(8).with_mipmaps(true))
        .compress_image(image)
        .unwrap();
    assert_eq!(single.to_bytes(), many.to_bytes());
}

#[test]
fn test_worker_count_does_not_change_translucent_output() {
    let mut rng = StdRng::seed_from_u64(10);
    let image = RgbaImage::from_fn(64, 32, |x, y| {
        Rgba([(x * 4) as u8, (y * 8) as u8, 90, rng.random::<u8>()])
    });
    for workers in [2, 5, 8] {
        let single = compressor(CompressionConfig::new(Format::Etc2Rgba).with_workers(1).with_mipmaps(true))
            .compress_image(image.clone())
            .unwrap();
        let many = compressor(CompressionConfig::new(Format::Etc2Rgba).with_workers(workers).with_mipmaps(true))
            .compress_image(image.clone())
            .unwrap();
        assert_eq!(single.to_bytes(), many.to_bytes(), "{} workers", workers);
    }
}

#[test]
fn test_worker_count_does_not_change_dithered_output() {
    let image = photo_like(64, 64, 11);
    let config = |workers| {
        CompressionConfig::new(Format::Etc1)
            .with_workers(workers)
            .with_mipmaps(true)
            .with_dither(true)
    };
    let single = compressor(config(1)).compress_image(image.clone()).unwrap();
    let many = compressor(config(6)).compress_image(image).unwrap();
    assert_eq!(single.to_bytes(), many.to_bytes());
}

#[test]
fn test_compressor_is_reusable() {
    let compressor = compressor(CompressionConfig::new(Format::Etc1).with_workers(2));
    let mut partitioner = compressor.partition(photo_like(32, 32, 9)).unwrap();
    let first = compressor.compress(&mut partitioner).unwrap();
    let second = compressor.compress(&mut partitioner).unwrap();
    assert_eq!(first.to_bytes(), second.to_bytes());
}

#[test]
fn test_separate_alpha_texture() {
    let image = RgbaImage::from_fn(16, 16, |x, _| Rgba([200, 100, 50, (x * 16) as u8]));
    let compressor = compressor(CompressionConfig::new(Format::Etc1));
    let mut partitioner = compressor.partition(image.clone()).unwrap();
    assert!(partitioner.has_alpha());

    let (color, alpha) = compressor.compress_with_alpha(&mut partitioner).unwrap();
    let alone = compressor.compress_channels(&mut partitioner, Channels::Alpha).unwrap();
    assert_eq!(alpha.to_bytes(), alone.to_bytes());

    let decoded = alpha.decode();
    for (original, gray) in image.pixels().zip(decoded.pixels()) {
        let diff = (i16::from(original[3]) - i16::from(gray[0])).abs();
        assert!(diff <= 16, "alpha {} decoded as {}", original[3], gray[0]);
    }
    assert_eq!(color.format(), Format::Etc1);
}

#[test]
fn test_rejects_unaligned_image() {
    let err = compressor(CompressionConfig::default())
        .compress_image(RgbaImage::new(30, 16))
        .unwrap_err();
    assert!(matches!(
        err,
        CompressError::Partition(PartitionError::NotBlockAligned { width: 30, height: 16 })
    ));
}
