// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Turns one decoded image into the normalised CHW float buffer
// the network expects. This is the standard ImageNet
// validation transform:
//
//   1. Convert to RGB (or luma for single-channel networks)
//   2. Resize so the SHORTER side equals
//        ceil(input_height / resize_inv_factor)
//      keeping the aspect ratio (bilinear)
//   3. Center crop to input_size
//   4. Scale pixels to [0, 1]
//   5. Normalise each channel: (x - mean) / std
//
// With the defaults (224, 0.875) the short side becomes 256
// and the central 224x224 window is kept.
//
// Reference: image crate (imageops::resize / crop_imm)

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::domain::error::EvalError;

/// ImageNet channel statistics (RGB order)
const RGB_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const RGB_STD:  [f32; 3] = [0.229, 0.224, 0.225];

/// Single-channel statistics: the average of the RGB ones
const LUMA_MEAN: f32 = 0.449;
const LUMA_STD:  f32 = 0.226;

#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// (height, width) of the network input
    input_size:  (u32, u32),
    /// Target length of the shorter side before cropping
    resize:      u32,
    in_channels: usize,
}

impl ImagePreprocessor {
    /// Validates the geometry flags and precomputes the resize target.
    pub fn new(
        input_size:        (usize, usize),
        resize_inv_factor: f64,
        in_channels:       usize,
    ) -> Result<Self, EvalError> {
        if !(resize_inv_factor > 0.0 && resize_inv_factor <= 1.0) {
            return Err(EvalError::InvalidArgument {
                flag:    "resize-inv-factor".to_string(),
                value:   resize_inv_factor.to_string(),
                message: "must be in (0, 1]".to_string(),
            });
        }
        if in_channels != 1 && in_channels != 3 {
            return Err(EvalError::InvalidArgument {
                flag:    "in-channels".to_string(),
                value:   in_channels.to_string(),
                message: "only 1 (grayscale) or 3 (RGB) channels are supported".to_string(),
            });
        }
        if input_size.0 == 0 || input_size.1 == 0 {
            return Err(EvalError::InvalidArgument {
                flag:    "input-size".to_string(),
                value:   format!("{}x{}", input_size.0, input_size.1),
                message: "must be positive".to_string(),
            });
        }

        let resize = (input_size.0 as f64 / resize_inv_factor).ceil() as u32;

        Ok(Self {
            input_size: (input_size.0 as u32, input_size.1 as u32),
            resize,
            in_channels,
        })
    }

    pub fn resize_target(&self) -> u32 {
        self.resize
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// (height, width) of every output image
    pub fn output_size(&self) -> (usize, usize) {
        (self.input_size.0 as usize, self.input_size.1 as usize)
    }

    /// Decode a file from disk and preprocess it
    pub fn load(&self, path: &Path) -> Result<Vec<f32>, image::ImageError> {
        let img = image::open(path)?;
        Ok(self.process(&img))
    }

    /// Preprocess an already decoded image into a CHW buffer
    pub fn process(&self, img: &DynamicImage) -> Vec<f32> {
        let (w, h)           = img.dimensions();
        let (new_w, new_h)   = self.resized_dims(w, h);
        let resized          = img.resize_exact(new_w, new_h, FilterType::Triangle);
        let (crop_h, crop_w) = self.input_size;
        let x                = (new_w - crop_w) / 2;
        let y                = (new_h - crop_h) / 2;
        let cropped          = resized.crop_imm(x, y, crop_w, crop_h);

        let plane = (crop_h * crop_w) as usize;
        let mut out = vec![0.0f32; self.in_channels * plane];

        if self.in_channels == 1 {
            let luma = cropped.to_luma8();
            for (i, p) in luma.pixels().enumerate() {
                out[i] = (p.0[0] as f32 / 255.0 - LUMA_MEAN) / LUMA_STD;
            }
        } else {
            let rgb = cropped.to_rgb8();
            // HWC → CHW while normalising
            for (i, p) in rgb.pixels().enumerate() {
                for c in 0..3 {
                    out[c * plane + i] = (p.0[c] as f32 / 255.0 - RGB_MEAN[c]) / RGB_STD[c];
                }
            }
        }

        out
    }

    /// Size after the aspect-preserving resize. The shorter side
    /// becomes `resize`; both sides are kept at least as large as
    /// the crop window so the crop never runs off the image.
    fn resized_dims(&self, w: u32, h: u32) -> (u32, u32) {
        let (crop_h, crop_w) = self.input_size;
        let short = w.min(h).max(1) as f64;
        let scale = (self.resize as f64 / short)
            .max(crop_w as f64 / w.max(1) as f64)
            .max(crop_h as f64 / h.max(1) as f64);
        let new_w = ((w as f64 * scale).round() as u32).max(crop_w);
        let new_h = ((h as f64 * scale).round() as u32).max(crop_h);
        (new_w, new_h)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_default_resize_target_is_256() {
        let p = ImagePreprocessor::new((224, 224), 0.875, 3).unwrap();
        assert_eq!(p.resize_target(), 256);
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let p = ImagePreprocessor::new((224, 224), 0.875, 3).unwrap();
        // landscape 512x384 → short side 384 → 256, long side 341
        assert_eq!(p.resized_dims(512, 384), (341, 256));
        // portrait
        assert_eq!(p.resized_dims(300, 600), (256, 512));
    }

    #[test]
    fn test_tiny_image_is_upscaled_past_crop() {
        let p = ImagePreprocessor::new((224, 160), 1.0, 3).unwrap();
        let (w, h) = p.resized_dims(10, 10);
        assert!(w >= 160 && h >= 224);
    }

    #[test]
    fn test_output_shape_and_normalisation() {
        let p   = ImagePreprocessor::new((8, 8), 0.5, 3).unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([255, 0, 128])));
        let out = p.process(&img);
        assert_eq!(p.output_size(), (8, 8));
        assert_eq!(p.in_channels(), 3);
        assert_eq!(out.len(), 3 * 8 * 8);

        let plane = 64;
        let r = (1.0 - RGB_MEAN[0]) / RGB_STD[0];
        let g = (0.0 - RGB_MEAN[1]) / RGB_STD[1];
        assert!((out[0] - r).abs() < 0.02);
        assert!((out[plane] - g).abs() < 0.02);
    }

    #[test]
    fn test_grayscale_output() {
        let p   = ImagePreprocessor::new((4, 4), 1.0, 1).unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let out = p.process(&img);
        assert_eq!(out.len(), 16);
        assert!((out[0] - (-LUMA_MEAN / LUMA_STD)).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(ImagePreprocessor::new((224, 224), 0.0, 3).is_err());
        assert!(ImagePreprocessor::new((224, 224), 1.5, 3).is_err());
        assert!(ImagePreprocessor::new((224, 224), 0.875, 4).is_err());
        assert!(ImagePreprocessor::new((0, 224), 0.875, 3).is_err());
    }
}
