//! Reconstruction quality metrics.

use image::RgbaImage;
use thiserror::Error;

/// Peak value of an 8-bit channel.
const PEAK: f64 = 255.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QualityError {
    #[error("image dimensions differ: {original:?} vs {reconstructed:?}")]
    DimensionMismatch {
        original: (u32, u32),
        reconstructed: (u32, u32),
    },
}

/// Error statistics of a reconstruction, over the r, g and b channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    /// Mean squared error per channel sample.
    pub mse: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Peak signal-to-noise ratio in dB; infinite for identical images.
    pub psnr: f64,
}

impl QualityReport {
    /// Derive RMSE and PSNR from a mean squared error.
    pub fn from_mse(mse: f64) -> Self {
        let psnr = if mse == 0.0 {
            f64::INFINITY
        } else {
            20.0 * PEAK.log10() - 10.0 * mse.log10()
        };
        Self {
            mse,
            rmse: mse.sqrt(),
            psnr,
        }
    }

    /// Compare two images of equal size. Alpha is ignored.
    pub fn compare(original: &RgbaImage, reconstructed: &RgbaImage) -> Result<Self, QualityError> {
        Ok(Self::from_mse(mse_rgb(original, reconstructed)?))
    }
}

/// Mean squared error over the r, g and b samples of two images.
pub fn mse_rgb(original: &RgbaImage, reconstructed: &RgbaImage) -> Result<f64, QualityError> {
    if original.dimensions() != reconstructed.dimensions() {
        return Err(QualityError::DimensionMismatch {
            original: original.dimensions(),
            reconstructed: reconstructed.dimensions(),
        });
    }
    let samples = original.width() as u64 * original.height() as u64 * 3;
    if samples == 0 {
        return Ok(0.0);
    }
    let total: u64 = original
        .pixels()
        .zip(reconstructed.pixels())
        .map(|(a, b)| {
            (0..3)
                .map(|c| {
                    let d = a[c] as i64 - b[c] as i64;
                    (d * d) as u64
                })
                .sum::<u64>()
        })
        .sum();
    Ok(total as f64 / samples as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_identical_images() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 4]));
        let report = QualityReport::compare(&image, &image).unwrap();
        assert_eq!(report.mse, 0.0);
        assert_eq!(report.rmse, 0.0);
        assert!(report.psnr.is_infinite());
    }

    #[test]
    fn test_known_error() {
        let a = RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        let b = RgbaImage::from_pixel(4, 4, Rgba([12, 10, 10, 0]));
        let report = QualityReport::compare(&a, &b).unwrap();
        // One channel off by 2 out of three: 4 / 3
        assert!((report.mse - 4.0 / 3.0).abs() < 1e-12);
        assert!((report.rmse - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
        let expected_psnr = 20.0 * 255f64.log10() - 10.0 * (4.0f64 / 3.0).log10();
        assert!((report.psnr - expected_psnr).abs() < 1e-9);
    }

    #[test]
    fn test_psnr_for_unit_mse() {
        let report = QualityReport::from_mse(1.0);
        assert!((report.psnr - 48.1308).abs() < 1e-3);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = RgbaImage::new(4, 4);
        let b = RgbaImage::new(8, 4);
        let err = QualityReport::compare(&a, &b).unwrap_err();
        assert_eq!(
            err,
            QualityError::DimensionMismatch {
                original: (4, 4),
                reconstructed: (8, 4)
            }
        );
    }

    #[test]
    fn test_psnr_decreases_with_error() {
        let low = QualityReport::from_mse(2.0);
        let high = QualityReport::from_mse(20.0);
        assert!(low.psnr > high.psnr);
        assert!((low.psnr - high.psnr - 10.0).abs() < 1e-9);
    }
}
