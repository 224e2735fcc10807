//! The compression pipeline: partition, schedule, encode, sync.
//!
//! ```text
//! RgbaImage ─▶ WorkPartitioner ─▶ WorkUnit ─▶ Scheduler ─▶ Texture
//!                 (mip chain)      per band     workers    (atomic blocks)
//! ```
//!
//! One task is queued per work unit and per output texture. Each task
//! extracts its blocks from the unit's mip level, encodes them with the
//! shared codec and stores them at the unit's destination offset.

use crate::codec::{codec_for, BlockCodec, Channels, Format, PixelBlock};
use crate::config::CompressionConfig;
use crate::executor::{Scheduler, SchedulerError};
use crate::log::Logger;
use crate::mipmap::MipChain;
use crate::partition::{PartitionError, WorkPartitioner, WorkUnit};
use crate::texture::Texture;
use crate::{log_debug, log_error, log_info};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors raised by the compression pipeline.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("{count} encode task(s) panicked; the texture is incomplete")]
    TaskPanicked { count: u64 },
}

/// One output texture of a dispatch.
struct Pass {
    texture: Arc<Texture>,
    channels: Channels,
    dither: bool,
}

/// Encode every block of one work unit into `texture`.
fn encode_unit(
    codec: &dyn BlockCodec,
    chain: &MipChain,
    texture: &Texture,
    unit: WorkUnit,
    channels: Channels,
    dither: bool,
) {
    let image = chain.level(unit.level);
    for row in 0..unit.rows {
        let by = unit.first_row + row;
        for bx in 0..unit.width {
            let block = PixelBlock::from_image(image, bx, by);
            let index = unit.block_offset + (row * unit.width + bx) as usize;
            texture.store_block(index, codec.encode(&block, channels, dither));
        }
    }
}

fn into_texture(texture: Arc<Texture>) -> Texture {
    Arc::try_unwrap(texture).unwrap_or_else(|shared| (*shared).clone())
}

/// Compresses images with a fixed configuration and worker pool.
pub struct Compressor {
    config: CompressionConfig,
    codec: Arc<dyn BlockCodec>,
    scheduler: Scheduler,
    logger: Arc<dyn Logger>,
}

impl Compressor {
    /// Resolve `config` and start its worker pool.
    pub fn new(config: CompressionConfig, logger: Arc<dyn Logger>) -> Result<Self, CompressError> {
        let codec = codec_for(config.format, config.effort);
        Self::with_codec(config, codec, logger)
    }

    /// Like [`Compressor::new`] but encoding with a caller-supplied codec.
    ///
    /// The configured format is replaced by the codec's format.
    pub fn with_codec(
        mut config: CompressionConfig,
        codec: Arc<dyn BlockCodec>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, CompressError> {
        config.format = codec.format();
        let config = config.resolved(logger.as_ref());
        let scheduler = Scheduler::new(config.workers, Arc::clone(&logger))?;
        Ok(Self {
            config,
            codec,
            scheduler,
            logger,
        })
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn format(&self) -> Format {
        self.config.format
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Build the mip chain and work units for `image`.
    pub fn partition(&self, image: RgbaImage) -> Result<WorkPartitioner, CompressError> {
        Ok(WorkPartitioner::new(
            image,
            self.config.mipmaps,
            self.config.workers,
        )?)
    }

    /// Channels the color pass reads for this format.
    fn color_channels(&self) -> Channels {
        if self.config.format.has_alpha() {
            Channels::Rgba
        } else {
            Channels::Rgb
        }
    }

    /// Compress the color texture.
    pub fn compress(&self, partitioner: &mut WorkPartitioner) -> Result<Texture, CompressError> {
        self.compress_channels(partitioner, self.color_channels())
    }

    /// Compress one texture reading the given channels.
    ///
    /// With DXT1, `Channels::Rgba` keys fully transparent pixels to the
    /// transparent index.
    pub fn compress_channels(
        &self,
        partitioner: &mut WorkPartitioner,
        channels: Channels,
    ) -> Result<Texture, CompressError> {
        let texture = self.new_texture(partitioner);
        self.dispatch(
            partitioner,
            &[Pass {
                texture: Arc::clone(&texture),
                channels,
                dither: self.config.dither && channels != Channels::Alpha,
            }],
        )?;
        Ok(into_texture(texture))
    }

    /// Compress the color texture and a second texture holding the alpha
    /// channel as gray, in one dispatch.
    pub fn compress_with_alpha(
        &self,
        partitioner: &mut WorkPartitioner,
    ) -> Result<(Texture, Texture), CompressError> {
        let color = self.new_texture(partitioner);
        let alpha = self.new_texture(partitioner);
        self.dispatch(
            partitioner,
            &[
                Pass {
                    texture: Arc::clone(&color),
                    channels: self.color_channels(),
                    dither: self.config.dither,
                },
                Pass {
                    texture: Arc::clone(&alpha),
                    channels: Channels::Alpha,
                    dither: false,
                },
            ],
        )?;
        Ok((into_texture(color), into_texture(alpha)))
    }

    /// Partition and compress `image` in one call.
    pub fn compress_image(&self, image: RgbaImage) -> Result<Texture, CompressError> {
        let mut partitioner = self.partition(image)?;
        self.compress(&mut partitioner)
    }

    fn new_texture(&self, partitioner: &WorkPartitioner) -> Arc<Texture> {
        Arc::new(Texture::new(
            self.config.format,
            partitioner.width(),
            partitioner.height(),
            partitioner.is_mipmapped(),
        ))
    }

    /// Queue every unit of every pass, then wait for all of them.
    ///
    /// Fails if any task panicked, since its blocks were never stored.
    fn dispatch(&self, partitioner: &mut WorkPartitioner, passes: &[Pass]) -> Result<(), CompressError> {
        let started = Instant::now();
        let panicked_before = self.scheduler.tasks_panicked();
        partitioner.rewind();
        let mut queued = 0usize;
        while let Some(unit) = partitioner.next_part() {
            for pass in passes {
                let codec = Arc::clone(&self.codec);
                let chain = Arc::clone(partitioner.mip_chain());
                let texture = Arc::clone(&pass.texture);
                let (channels, dither) = (pass.channels, pass.dither);
                self.scheduler.queue(move || {
                    encode_unit(codec.as_ref(), &chain, &texture, unit, channels, dither);
                });
                queued += 1;
            }
        }
        log_debug!(self.logger, "Queued {} tasks", queued);

        self.scheduler.sync();

        let count = self.scheduler.tasks_panicked() - panicked_before;
        if count > 0 {
            log_error!(self.logger, "{} of {} encode tasks panicked", count, queued);
            return Err(CompressError::TaskPanicked { count });
        }

        log_info!(
            self.logger,
            "Compressed {}x{} to {} ({} levels, {} units) in {:.2?}",
            partitioner.width(),
            partitioner.height(),
            self.config.format,
            partitioner.levels().len(),
            partitioner.number_of_parts(),
            started.elapsed()
        );
        Ok(())
    }
}

impl std::fmt::Debug for Compressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compressor")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
