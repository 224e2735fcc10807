//! Compression settings.

use crate::codec::{Effort, Format};
use crate::executor::default_worker_count;
use crate::log::Logger;
use crate::log_warn;

/// Settings for one compression run.
///
/// ```
/// use etcpak::codec::{Effort, Format};
/// use etcpak::config::CompressionConfig;
///
/// let config = CompressionConfig::new(Format::Dxt1)
///     .with_mipmaps(true)
///     .with_effort(Effort::Thorough)
///     .with_workers(2);
/// assert_eq!(config.workers, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Output block format.
    pub format: Format,
    /// Generate the full mip chain.
    pub mipmaps: bool,
    /// Apply ordered dithering before quantization.
    pub dither: bool,
    /// Encoder search effort.
    pub effort: Effort,
    /// Worker thread count.
    pub workers: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            format: Format::Etc1,
            mipmaps: false,
            dither: false,
            effort: Effort::Fast,
            workers: default_worker_count(),
        }
    }
}

impl CompressionConfig {
    /// Default settings for `format`.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    pub fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.effort = effort;
        self
    }

    /// Set the worker count (values below 1 are raised to 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Apply cross-field rules.
    ///
    /// Dithering is switched off for ETC2 formats, with a warning.
    pub fn resolved(mut self, logger: &dyn Logger) -> Self {
        if self.dither && !self.format.supports_dither() {
            log_warn!(
                logger,
                "Dithering disabled for {}: it degrades image quality",
                self.format
            );
            self.dither = false;
        }
        self.workers = self.workers.max(1);
        self
    }
}
