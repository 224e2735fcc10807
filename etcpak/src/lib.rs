//! etcpak - fast ETC1/ETC2/DXT1 texture compression
//!
//! This library compresses RGBA images into GPU block formats, optionally
//! with a full mip chain, spreading the work over a pool of worker threads.
//!
//! ```
//! use etcpak::codec::Format;
//! use etcpak::compress::Compressor;
//! use etcpak::config::CompressionConfig;
//! use etcpak::log::NoOpLogger;
//! use etcpak::quality::QualityReport;
//! use image::{Rgba, RgbaImage};
//! use std::sync::Arc;
//!
//! let image = RgbaImage::from_pixel(16, 16, Rgba([90, 140, 200, 255]));
//! let config = CompressionConfig::new(Format::Etc2Rgb).with_mipmaps(true);
//! let compressor = Compressor::new(config, Arc::new(NoOpLogger)).unwrap();
//!
//! let texture = compressor.compress_image(image.clone()).unwrap();
//! let report = QualityReport::compare(&image, &texture.decode()).unwrap();
//! assert!(report.psnr > 30.0);
//! ```

pub mod codec;
pub mod compress;
pub mod config;
pub mod container;
pub mod executor;
pub mod image_io;
pub mod log;
pub mod logging;
pub mod mipmap;
pub mod partition;
pub mod quality;
pub mod texture;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
