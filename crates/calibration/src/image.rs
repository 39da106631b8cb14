//! Grayscale eye-region images and the binarization used for pupil isolation.

use crate::error::{CalibrationError, CalibrationResult};

/// An 8-bit grayscale image of one eye region, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EyeImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl EyeImage {
    /// Wrap a pixel buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> CalibrationResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(CalibrationError::ImageSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// One pass of 3x3 grayscale erosion (minimum filter).
    ///
    /// Neighbors outside the image are ignored.
    pub fn erode(&self) -> EyeImage {
        let (w, h) = (self.width as i64, self.height as i64);
        EyeImage::from_fn(self.width, self.height, |x, y| {
            let mut min = u8::MAX;
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx >= 0 && ny >= 0 && nx < w && ny < h {
                        min = min.min(self.pixel(nx as u32, ny as u32));
                    }
                }
            }
            min
        })
    }

    /// Apply `iterations` erosion passes.
    pub fn eroded(&self, iterations: u32) -> EyeImage {
        let mut image = self.clone();
        for _ in 0..iterations {
            image = image.erode();
        }
        image
    }

    /// Binary threshold: pixels brighter than `threshold` become 255, the rest 0.
    pub fn threshold(&self, threshold: u8) -> EyeImage {
        EyeImage {
            width: self.width,
            height: self.height,
            pixels: self
                .pixels
                .iter()
                .map(|&p| if p > threshold { u8::MAX } else { 0 })
                .collect(),
        }
    }

    /// Erode then threshold, isolating the pupil as the dark blob.
    pub fn binarize(&self, threshold: u8, erode_iterations: u32) -> EyeImage {
        self.eroded(erode_iterations).threshold(threshold)
    }

    /// Fraction of zero-valued pixels, ignoring a `margin`-pixel border.
    ///
    /// On a binarized image this is the iris ratio.
    pub fn dark_ratio(&self, margin: u32) -> CalibrationResult<f64> {
        let too_small = CalibrationError::ImageTooSmall {
            width: self.width,
            height: self.height,
            margin,
        };
        if self.width <= margin.saturating_mul(2) || self.height <= margin.saturating_mul(2) {
            return Err(too_small);
        }

        let mut total = 0usize;
        let mut dark = 0usize;
        for y in margin..self.height - margin {
            for x in margin..self.width - margin {
                total += 1;
                if self.pixel(x, y) == 0 {
                    dark += 1;
                }
            }
        }
        Ok(dark as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_buffer_length() {
        let err = EyeImage::new(4, 4, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::ImageSize {
                expected: 16,
                actual: 15
            }
        );
        assert!(EyeImage::new(4, 4, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let image = EyeImage::new(3, 1, vec![9, 10, 11]).unwrap();
        assert_eq!(image.threshold(10).pixels(), &[0, 0, 255]);
    }

    #[test]
    fn test_erode_spreads_dark_pixels() {
        let image = EyeImage::from_fn(5, 5, |x, y| if x == 2 && y == 2 { 0 } else { 200 });
        let eroded = image.erode();
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(eroded.pixel(x, y), 0);
            }
        }
        assert_eq!(eroded.pixel(0, 0), 200);
        assert_eq!(eroded.pixel(4, 4), 200);
    }

    #[test]
    fn test_dark_ratio_ignores_border() {
        // Dark border, bright 2x2 interior once a 1px margin is dropped.
        let image = EyeImage::from_fn(4, 4, |x, y| {
            if x == 0 || y == 0 || x == 3 || y == 3 {
                0
            } else {
                255
            }
        });
        assert_eq!(image.dark_ratio(0).unwrap(), 12.0 / 16.0);
        assert_eq!(image.dark_ratio(1).unwrap(), 0.0);
    }

    #[test]
    fn test_dark_ratio_rejects_tiny_images() {
        let image = EyeImage::from_fn(10, 20, |_, _| 0);
        assert!(matches!(
            image.dark_ratio(5),
            Err(CalibrationError::ImageTooSmall { .. })
        ));
    }
}
