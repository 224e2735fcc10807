//! PVR v3 texture container.
//!
//! Layout (all header fields little-endian):
//!
//! | Offset | Size | Field                                 |
//! |--------|------|---------------------------------------|
//! | 0      | 4    | version `0x03525650`                  |
//! | 4      | 4    | flags (0)                             |
//! | 8      | 8    | pixel format                          |
//! | 16     | 4    | colour space (0, linear)              |
//! | 20     | 4    | channel type (0, unsigned byte norm.) |
//! | 24     | 4    | height                                |
//! | 28     | 4    | width                                 |
//! | 32     | 4    | depth (1)                             |
//! | 36     | 4    | surfaces (1)                          |
//! | 40     | 4    | faces (1)                             |
//! | 44     | 4    | mip map count                         |
//! | 48     | 4    | metadata size                         |
//!
//! Level payloads follow the header and metadata, largest level first.

use crate::codec::Format;
use crate::texture::{Texture, TextureError};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// PVR v3 version tag ("PVR\x03" little-endian).
pub const PVR_VERSION: u32 = 0x0352_5650;
/// Size of the fixed PVR v3 header.
pub const PVR_HEADER_SIZE: usize = 52;
/// Largest width or height accepted when reading a container.
pub const MAX_DIMENSION: u32 = 65_535;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a PVR v3 file (version tag {0:#010x})")]
    BadMagic(u32),

    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(u64),

    #[error("invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("mip map count {found} does not match {width}×{height} (expected {expected})")]
    MipCountMismatch {
        width: u32,
        height: u32,
        found: u32,
        expected: u32,
    },

    #[error("truncated payload: {0}")]
    Truncated(#[source] io::Error),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// PVR v3 pixel format code for `format`.
pub fn pixel_format_code(format: Format) -> u64 {
    match format {
        Format::Etc1 => 6,
        Format::Dxt1 => 7,
        Format::Etc2Rgb => 22,
        Format::Etc2Rgba => 23,
    }
}

/// Inverse of [`pixel_format_code`].
pub fn format_from_code(code: u64) -> Option<Format> {
    match code {
        6 => Some(Format::Etc1),
        7 => Some(Format::Dxt1),
        22 => Some(Format::Etc2Rgb),
        23 => Some(Format::Etc2Rgba),
        _ => None,
    }
}

fn header(texture: &Texture) -> [u8; PVR_HEADER_SIZE] {
    let mut out = [0u8; PVR_HEADER_SIZE];
    let mut put = |offset: usize, bytes: &[u8]| {
        out[offset..offset + bytes.len()].copy_from_slice(bytes);
    };
    put(0, &PVR_VERSION.to_le_bytes());
    put(4, &0u32.to_le_bytes());
    put(8, &pixel_format_code(texture.format()).to_le_bytes());
    put(16, &0u32.to_le_bytes());
    put(20, &0u32.to_le_bytes());
    put(24, &texture.height().to_le_bytes());
    put(28, &texture.width().to_le_bytes());
    put(32, &1u32.to_le_bytes());
    put(36, &1u32.to_le_bytes());
    put(40, &1u32.to_le_bytes());
    put(44, &(texture.level_count() as u32).to_le_bytes());
    put(48, &0u32.to_le_bytes());
    out
}

/// Write `texture` as a PVR v3 stream.
pub fn write_container<W: Write>(mut writer: W, texture: &Texture) -> Result<(), ContainerError> {
    writer.write_all(&header(texture))?;
    writer.write_all(&texture.to_bytes())?;
    writer.flush()?;
    Ok(())
}

fn read_u32(header: &[u8; PVR_HEADER_SIZE], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&header[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

/// Byte size of every level's blocks, or `None` on overflow.
fn payload_size(format: Format, width: u32, height: u32, mipmapped: bool) -> Option<usize> {
    crate::mipmap::level_dimensions(width, height, mipmapped)
        .into_iter()
        .try_fold(0usize, |total, (w, h)| {
            let blocks = (w.div_ceil(4) as usize).checked_mul(h.div_ceil(4) as usize)?;
            total.checked_add(blocks.checked_mul(format.bytes_per_block())?)
        })
}

/// Read a PVR v3 stream written by [`write_container`].
pub fn read_container<R: Read>(mut reader: R) -> Result<Texture, ContainerError> {
    let mut header = [0u8; PVR_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let version = read_u32(&header, 0);
    if version != PVR_VERSION {
        return Err(ContainerError::BadMagic(version));
    }
    let mut raw_format = [0u8; 8];
    raw_format.copy_from_slice(&header[8..16]);
    let code = u64::from_le_bytes(raw_format);
    let format = format_from_code(code).ok_or(ContainerError::UnsupportedFormat(code))?;

    let height = read_u32(&header, 24);
    let width = read_u32(&header, 28);
    let mip_count = read_u32(&header, 44);
    let metadata_size = read_u32(&header, 48);

    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ContainerError::InvalidDimensions { width, height });
    }

    let mipmapped = mip_count > 1;
    let expected = crate::mipmap::level_dimensions(width, height, mipmapped).len() as u32;
    if mip_count.max(1) != expected {
        return Err(ContainerError::MipCountMismatch {
            width,
            height,
            found: mip_count,
            expected,
        });
    }

    io::copy(&mut (&mut reader).take(metadata_size as u64), &mut io::sink())?;

    let size = payload_size(format, width, height, mipmapped)
        .ok_or(ContainerError::InvalidDimensions { width, height })?;
    // Grows with the bytes actually present, not with the header's claim.
    let mut payload = Vec::new();
    (&mut reader).take(size as u64).read_to_end(&mut payload)?;
    if payload.len() != size {
        return Err(ContainerError::Truncated(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} payload bytes, found {}", size, payload.len()),
        )));
    }

    Ok(Texture::from_bytes(format, width, height, mipmapped, &payload)?)
}

/// Write `texture` to a file.
pub fn save_container(path: &Path, texture: &Texture) -> Result<(), ContainerError> {
    write_container(BufWriter::new(File::create(path)?), texture)
}

/// Read a texture from a file.
pub fn load_container(path: &Path) -> Result<Texture, ContainerError> {
    read_container(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CompressedBlock;
    use std::io::Cursor;

    fn sample_texture(format: Format, mipmapped: bool) -> Texture {
        let texture = Texture::new(format, 16, 8, mipmapped);
        for index in 0..texture.block_count() {
            let block = if format.has_alpha() {
                CompressedBlock::ColorAlpha {
                    alpha: index as u64,
                    color: !(index as u64),
                }
            } else {
                CompressedBlock::Color(0x0101_0101 * (index as u64 + 1))
            };
            texture.store_block(index, block);
        }
        texture
    }

    #[test]
    fn test_header_layout() {
        let texture = sample_texture(Format::Etc2Rgb, true);
        let mut out = Vec::new();
        write_container(&mut out, &texture).unwrap();

        assert_eq!(&out[0..4], &[0x50, 0x56, 0x52, 0x03]);
        assert_eq!(out[8], 22);
        assert_eq!(read_u32(out[..PVR_HEADER_SIZE].try_into().unwrap(), 24), 8);
        assert_eq!(read_u32(out[..PVR_HEADER_SIZE].try_into().unwrap(), 28), 16);
        assert_eq!(read_u32(out[..PVR_HEADER_SIZE].try_into().unwrap(), 44), 5);
        assert_eq!(out.len(), PVR_HEADER_SIZE + texture.byte_size());
    }

    #[test]
    fn test_round_trip_all_formats() {
        for format in [Format::Etc1, Format::Etc2Rgb, Format::Etc2Rgba, Format::Dxt1] {
            for mipmapped in [false, true] {
                let texture = sample_texture(format, mipmapped);
                let mut out = Vec::new();
                write_container(&mut out, &texture).unwrap();
                let restored = read_container(Cursor::new(out)).unwrap();
                assert_eq!(restored.format(), format);
                assert_eq!(restored.dimensions(), (16, 8));
                assert_eq!(restored.level_count(), texture.level_count());
                assert_eq!(restored.to_bytes(), texture.to_bytes());
            }
        }
    }

    #[test]
    fn test_bad_magic() {
        let err = read_container(Cursor::new(vec![0u8; PVR_HEADER_SIZE])).unwrap_err();
        assert!(matches!(err, ContainerError::BadMagic(0)));
    }

    #[test]
    fn test_unsupported_format() {
        let mut out = Vec::new();
        write_container(&mut out, &sample_texture(Format::Etc1, false)).unwrap();
        out[8] = 99;
        let err = read_container(Cursor::new(out)).unwrap_err();
        assert!(matches!(err, ContainerError::UnsupportedFormat(99)));
    }

    #[test]
    fn test_truncated_payload() {
        let mut out = Vec::new();
        write_container(&mut out, &sample_texture(Format::Dxt1, false)).unwrap();
        out.truncate(out.len() - 3);
        let err = read_container(Cursor::new(out)).unwrap_err();
        assert!(matches!(err, ContainerError::Truncated(_)));
    }

    #[test]
    fn test_mip_count_mismatch() {
        let mut out = Vec::new();
        write_container(&mut out, &sample_texture(Format::Etc1, true)).unwrap();
        out[44] = 2;
        let err = read_container(Cursor::new(out)).unwrap_err();
        assert!(matches!(err, ContainerError::MipCountMismatch { found: 2, expected: 5, .. }));
    }

    fn header_with_dimensions(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        write_container(&mut out, &sample_texture(Format::Etc1, false)).unwrap();
        out.truncate(PVR_HEADER_SIZE);
        out[24..28].copy_from_slice(&height.to_le_bytes());
        out[28..32].copy_from_slice(&width.to_le_bytes());
        out
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let err = read_container(Cursor::new(header_with_dimensions(u32::MAX, u32::MAX))).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::InvalidDimensions {
                width: u32::MAX,
                height: u32::MAX
            }
        ));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = read_container(Cursor::new(header_with_dimensions(0, 8))).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidDimensions { width: 0, height: 8 }));
    }

    #[test]
    fn test_large_header_without_payload_is_truncated() {
        // The header claims a 2 GiB payload that is not there.
        let err = read_container(Cursor::new(header_with_dimensions(MAX_DIMENSION, MAX_DIMENSION)))
            .unwrap_err();
        assert!(matches!(err, ContainerError::Truncated(_)));
    }

    #[test]
    fn test_payload_size_matches_texture() {
        for format in [Format::Etc1, Format::Etc2Rgba] {
            for mipmapped in [false, true] {
                let texture = Texture::new(format, 16, 8, mipmapped);
                assert_eq!(payload_size(format, 16, 8, mipmapped), Some(texture.byte_size()));
            }
        }
    }

    #[test]
    fn test_metadata_is_skipped() {
        let texture = sample_texture(Format::Etc1, false);
        let mut out = Vec::new();
        write_container(&mut out, &texture).unwrap();
        out[48] = 4;
        let removed: Vec<u8> = out.splice(PVR_HEADER_SIZE..PVR_HEADER_SIZE, [9u8, 9, 9, 9]).collect();
        assert!(removed.is_empty());
        let restored = read_container(Cursor::new(out)).unwrap();
        assert_eq!(restored.to_bytes(), texture.to_bytes());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("texture.pvr");
        let texture = sample_texture(Format::Etc2Rgba, true);
        save_container(&path, &texture).unwrap();
        let restored = load_container(&path).unwrap();
        assert_eq!(restored.to_bytes(), texture.to_bytes());
    }

    #[test]
    fn test_format_codes_round_trip() {
        for format in [Format::Etc1, Format::Etc2Rgb, Format::Etc2Rgba, Format::Dxt1] {
            assert_eq!(format_from_code(pixel_format_code(format)), Some(format));
        }
        assert_eq!(format_from_code(0), None);
    }
}
