//! Compress an image into a PVR container.

use std::path::Path;
use std::sync::Arc;

use etcpak::codec::Effort;
use etcpak::compress::Compressor;
use etcpak::config::CompressionConfig;
use etcpak::container::save_container;
use etcpak::image_io::load_image;
use etcpak::log::{Logger, TracingLogger};
use etcpak::mipmap::has_alpha;
use etcpak::quality::QualityReport;
use tracing::info;

use super::common::FormatFlags;
use crate::error::CliError;

/// Settings for one compression run.
#[derive(Debug)]
pub struct CompressOptions<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    /// Separate alpha texture destination.
    pub alpha: Option<&'a Path>,
    pub flags: FormatFlags,
    pub mipmaps: bool,
    pub dither: bool,
    pub effort: Effort,
    pub stats: bool,
}

/// Run the compress command.
pub fn run(options: &CompressOptions<'_>) -> Result<(), CliError> {
    let image = load_image(options.input)?;
    let format = options.flags.select(has_alpha(&image));

    let config = CompressionConfig::new(format)
        .with_mipmaps(options.mipmaps)
        .with_dither(options.dither)
        .with_effort(options.effort);
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    let compressor = Compressor::new(config, logger)?;
    let mut partitioner = compressor.partition(image)?;

    let alpha_output = options
        .alpha
        .filter(|_| partitioner.has_alpha() && !options.flags.rgba);

    let texture = match alpha_output {
        Some(path) => {
            let (color, alpha) = compressor.compress_with_alpha(&mut partitioner)?;
            save_container(path, &alpha)?;
            info!(path = %path.display(), "Wrote alpha texture");
            color
        }
        None => compressor.compress(&mut partitioner)?,
    };

    save_container(options.output, &texture)?;
    info!(
        path = %options.output.display(),
        format = %format,
        bytes = texture.byte_size(),
        "Wrote texture"
    );

    if options.stats {
        let report = QualityReport::compare(partitioner.mip_chain().base(), &texture.decode())?;
        println!("RGB data");
        println!("  RMSE: {:.6}", report.rmse);
        println!("  PSNR: {:.6}", report.psnr);
    }

    Ok(())
}
