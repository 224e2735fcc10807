//! Timing runs for compression and decoding.
//!
//! Nothing is written to disk. Each benchmark repeats its measured step
//! [`BENCHMARK_RUNS`] times and reports the median.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use etcpak::codec::{Channels, Effort};
use etcpak::compress::Compressor;
use etcpak::config::CompressionConfig;
use etcpak::container::load_container;
use etcpak::image_io::load_image;
use etcpak::log::{Logger, NoOpLogger};

use super::common::{median, megapixels_per_second, millis, FormatFlags, BENCHMARK_RUNS};
use crate::error::CliError;

/// Settings for the compression benchmark.
#[derive(Debug)]
pub struct BenchmarkOptions<'a> {
    pub input: &'a Path,
    pub flags: FormatFlags,
    pub dither: bool,
    pub effort: Effort,
    /// Benchmark the alpha-only pass instead of the color pass.
    pub alpha_only: bool,
}

/// Time image loading once, then compression of the base level.
pub fn run_compress(options: &BenchmarkOptions<'_>) -> Result<(), CliError> {
    let start = Instant::now();
    let image = load_image(options.input)?;
    println!("Image load time: {:.3} ms", millis(start.elapsed()));

    let format = options.flags.requested();
    let config = CompressionConfig::new(format)
        .with_dither(options.dither)
        .with_effort(options.effort);
    let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
    let compressor = Compressor::new(config, logger)?;
    let pixels = u64::from(image.width()) * u64::from(image.height());
    let mut partitioner = compressor.partition(image)?;

    let alpha_pass = options.alpha_only && !format.has_alpha();
    let mut timings = Vec::with_capacity(BENCHMARK_RUNS);
    for _ in 0..BENCHMARK_RUNS {
        let start = Instant::now();
        if alpha_pass {
            compressor.compress_channels(&mut partitioner, Channels::Alpha)?;
        } else {
            compressor.compress(&mut partitioner)?;
        }
        timings.push(start.elapsed());
    }
    let elapsed = median(timings);

    println!(
        "Median compression time for {} runs: {:.3} ms ({:.3} Mpx/s)",
        BENCHMARK_RUNS,
        millis(elapsed),
        megapixels_per_second(pixels, elapsed)
    );
    Ok(())
}

/// Time decoding of a container's base level.
pub fn run_decode(input: &Path) -> Result<(), CliError> {
    let texture = load_container(input)?;
    let pixels = u64::from(texture.width()) * u64::from(texture.height());

    let timings = (0..BENCHMARK_RUNS)
        .map(|_| {
            let start = Instant::now();
            let _ = texture.decode();
            start.elapsed()
        })
        .collect();
    let elapsed = median(timings);

    println!(
        "Median decode time for {} runs: {:.3} ms ({:.3} Mpx/s)",
        BENCHMARK_RUNS,
        millis(elapsed),
        megapixels_per_second(pixels, elapsed)
    );
    Ok(())
}
