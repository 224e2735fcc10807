//! Block codecs for ETC1, ETC2 and DXT1.
//!
//! Every supported format works on fixed 4×4 pixel blocks. A block encodes
//! to a 64-bit record (ETC1, ETC2 RGB, DXT1) or to a pair of records
//! (ETC2 RGBA: an EAC alpha record followed by an ETC2 color record).
//!
//! # Architecture
//!
//! The [`BlockCodec`] trait is the seam between the compression pipeline
//! and the per-format encoders. The pipeline selects one codec per texture
//! with [`codec_for`] and hands it to every worker as an
//! `Arc<dyn BlockCodec>`.
//!
//! ```text
//! ┌─────────────────────┐
//! │     Compressor      │
//! │                     │
//! │ Arc<dyn BlockCodec> │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │     BlockCodec      │ (trait)
//! └──────────┬──────────┘
//!            │
//!   ┌────────┼─────────┬──────────┐
//!   ▼        ▼         ▼          ▼
//! ┌──────┐ ┌────────┐ ┌─────────┐ ┌──────┐
//! │ ETC1 │ │ETC2 RGB│ │ETC2 RGBA│ │ DXT1 │
//! └──────┘ └────────┘ └─────────┘ └──────┘
//! ```
//!
//! # Example
//!
//! ```
//! use etcpak::codec::{codec_for, Channels, Effort, Format, PixelBlock};
//!
//! let codec = codec_for(Format::Etc1, Effort::Fast);
//! let block = PixelBlock::solid([200, 40, 40, 255]);
//!
//! let record = codec.encode(&block, Channels::Rgb, false);
//! let decoded = codec.decode(&record);
//! assert!(decoded.max_channel_error(&block) <= 8);
//! ```

mod alpha;
mod block;
mod color;
mod dither;
mod dxt1;
mod etc1;
mod etc2;
mod tables;

pub use block::{CompressedBlock, PixelBlock};
pub use dither::dither_block;
pub use dxt1::Dxt1Codec;
pub use etc1::Etc1Codec;
pub use etc2::{Etc2RgbCodec, Etc2RgbaCodec};

use std::fmt;
use std::sync::Arc;

/// Compressed texture formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// ETC1 RGB, 8 bytes per block.
    Etc1,
    /// ETC2 RGB (ETC1 plus T, H and planar modes), 8 bytes per block.
    Etc2Rgb,
    /// ETC2 RGBA: EAC alpha record followed by an ETC2 color record.
    Etc2Rgba,
    /// DXT1 (BC1), 8 bytes per block.
    Dxt1,
}

impl Format {
    /// Returns the number of bytes one encoded block occupies.
    pub fn bytes_per_block(self) -> usize {
        match self {
            Format::Etc2Rgba => 16,
            Format::Etc1 | Format::Etc2Rgb | Format::Dxt1 => 8,
        }
    }

    /// Returns the number of 64-bit records per block.
    pub fn words_per_block(self) -> usize {
        self.bytes_per_block() / 8
    }

    /// Returns true for the ETC2 family.
    pub fn is_etc2(self) -> bool {
        matches!(self, Format::Etc2Rgb | Format::Etc2Rgba)
    }

    /// Returns true if the format stores an alpha record.
    pub fn has_alpha(self) -> bool {
        matches!(self, Format::Etc2Rgba)
    }

    /// Returns true if dithering may be applied before encoding.
    pub fn supports_dither(self) -> bool {
        !self.is_etc2()
    }

    /// Human-readable format name.
    pub fn name(self) -> &'static str {
        match self {
            Format::Etc1 => "ETC1",
            Format::Etc2Rgb => "ETC2 RGB",
            Format::Etc2Rgba => "ETC2 RGBA",
            Format::Dxt1 => "DXT1",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which channels of the source pixels feed the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channels {
    /// Color only; alpha is ignored.
    #[default]
    Rgb,
    /// Color plus alpha. ETC2 RGBA encodes alpha as an EAC record; DXT1
    /// maps fully transparent pixels to the transparent index.
    Rgba,
    /// Alpha only, encoded as a gray block with r = g = b = alpha.
    Alpha,
}

/// Encoder search effort.
///
/// `Thorough` evaluates every candidate `Fast` does plus more, so its
/// block error is never higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Effort {
    #[default]
    Fast,
    Thorough,
}

/// Encodes and decodes single 4×4 blocks of one [`Format`].
///
/// Implementations are stateless apart from their configuration and are
/// shared between worker threads.
pub trait BlockCodec: Send + Sync {
    /// The format this codec produces.
    fn format(&self) -> Format;

    /// Encode one block.
    ///
    /// `dither` requests ordered dithering of the color channels before
    /// quantization; formats that do not support it ignore the flag.
    fn encode(&self, block: &PixelBlock, channels: Channels, dither: bool) -> CompressedBlock;

    /// Decode one block.
    ///
    /// # Panics
    ///
    /// Panics if the record shape does not match [`BlockCodec::format`].
    fn decode(&self, block: &CompressedBlock) -> PixelBlock;
}

/// Returns the codec for `format` at the given search effort.
pub fn codec_for(format: Format, effort: Effort) -> Arc<dyn BlockCodec> {
    match format {
        Format::Etc1 => Arc::new(Etc1Codec::new(effort)),
        Format::Etc2Rgb => Arc::new(Etc2RgbCodec::new(effort)),
        Format::Etc2Rgba => Arc::new(Etc2RgbaCodec::new(effort)),
        Format::Dxt1 => Arc::new(Dxt1Codec::new(effort)),
    }
}
