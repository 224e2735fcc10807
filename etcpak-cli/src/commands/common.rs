//! Common types and utilities shared across CLI commands.

use std::time::Duration;

use etcpak::codec::{Effort, Format};

/// Number of timed runs per benchmark.
pub const BENCHMARK_RUNS: usize = 9;

/// Format switches as given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub etc2: bool,
    pub rgba: bool,
    pub dxt1: bool,
}

impl FormatFlags {
    /// `--rgba` implies `--etc2`.
    pub fn etc2(&self) -> bool {
        self.etc2 || self.rgba
    }

    /// Format used when compressing a source image.
    ///
    /// ETC2 wins over DXT1. RGBA mode only applies when the source
    /// actually has translucent pixels.
    pub fn select(&self, source_has_alpha: bool) -> Format {
        if self.etc2() {
            if self.rgba && source_has_alpha {
                Format::Etc2Rgba
            } else {
                Format::Etc2Rgb
            }
        } else if self.dxt1 {
            Format::Dxt1
        } else {
            Format::Etc1
        }
    }

    /// Format used by the compression benchmark, regardless of source alpha.
    pub fn requested(&self) -> Format {
        self.select(true)
    }
}

/// Search effort for the `--thorough` switch.
pub fn effort(thorough: bool) -> Effort {
    if thorough {
        Effort::Thorough
    } else {
        Effort::Fast
    }
}

/// Median of a set of timings. Empty input yields zero.
pub fn median(mut timings: Vec<Duration>) -> Duration {
    if timings.is_empty() {
        return Duration::ZERO;
    }
    timings.sort();
    timings[timings.len() / 2]
}

/// Throughput in megapixels per second.
pub fn megapixels_per_second(pixels: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds == 0.0 {
        return f64::INFINITY;
    }
    pixels as f64 / seconds / 1_000_000.0
}

/// Milliseconds with fractional part, for reports.
pub fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
