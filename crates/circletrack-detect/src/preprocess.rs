//! Intensity conversion and smoothing.

use image::{GrayImage, RgbImage};

/// Convert a color frame to single-channel intensity.
pub fn to_intensity(frame: &RgbImage) -> GrayImage {
    image::imageops::grayscale(frame)
}

/// Gaussian smoothing used before circle detection to suppress texture.
///
/// A non-positive sigma returns the input unchanged.
pub fn smooth(gray: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 || gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    imageproc::filter::gaussian_blur_f32(gray, sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn intensity_keeps_dimensions() {
        let frame = RgbImage::from_pixel(7, 5, Rgb([200, 200, 200]));
        let gray = to_intensity(&frame);
        assert_eq!(gray.dimensions(), (7, 5));
        assert_eq!(gray.get_pixel(3, 2)[0], 200);
    }

    #[test]
    fn smoothing_spreads_a_spike() {
        let mut gray = GrayImage::new(21, 21);
        gray.put_pixel(10, 10, Luma([255]));
        let out = smooth(&gray, 2.0);
        assert!(out.get_pixel(10, 10)[0] < 255);
        assert!(out.get_pixel(11, 10)[0] > 0);
    }

    #[test]
    fn zero_sigma_is_identity() {
        let gray = GrayImage::from_pixel(4, 4, Luma([9]));
        assert_eq!(smooth(&gray, 0.0), gray);
    }
}
