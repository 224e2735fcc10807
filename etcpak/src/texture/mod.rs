//! Compressed texture storage.
//!
//! A [`Texture`] is the destination of a compression run: one encoded
//! record per block for every mip level, laid out level by level, largest
//! level first, blocks in raster order within a level.
//!
//! # Architecture
//!
//! Storage is preallocated from the image dimensions before any work is
//! scheduled. Workers receive an `Arc<Texture>` and write disjoint block
//! ranges through [`Texture::store_block`]; the scheduler's sync is the
//! only point where the finished texture is read back.
//!
//! ```text
//! ┌──────────────┐   WorkUnit    ┌──────────────┐
//! │ Partitioner  │ ────────────▶ │   Worker N   │
//! └──────────────┘               └──────┬───────┘
//!                                       │ store_block(index, record)
//!                                       ▼
//! ┌────────────────────────────────────────────────────────┐
//! │ Texture: level 0 blocks │ level 1 blocks │ ... │ 1×1   │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use etcpak::codec::{CompressedBlock, Format};
//! use etcpak::texture::Texture;
//!
//! let texture = Texture::new(Format::Etc1, 8, 8, true);
//! assert_eq!(texture.level_count(), 4);
//! assert_eq!(texture.block_count(), 4 + 1 + 1 + 1);
//!
//! texture.store_block(0, CompressedBlock::Color(0xDEAD_BEEF));
//! assert_eq!(texture.block(0), CompressedBlock::Color(0xDEAD_BEEF));
//! ```

mod error;
mod layout;
mod storage;

pub use error::TextureError;
pub use layout::{level_layouts, LevelLayout};
pub use storage::Texture;
