// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack ImageItems into one
// [N, C, H, W] float tensor on the loader's device.
//
// Labels stay on the host: they are only needed for the metric
// update, which also runs on the host.
//
// Unreadable images are replaced with zeros and reported in
// `unreadable`, so the validation loop can fail with the path
// instead of silently skewing the error rates.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};
use std::path::PathBuf;

use crate::data::dataset::ImageItem;

#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Shape: [batch_size, channels, height, width]
    pub images:     Tensor<B, 4>,
    /// Ground truth class index per sample
    pub labels:     Vec<usize>,
    /// (path, decode error) of every sample that could not be read
    pub unreadable: Vec<(PathBuf, String)>,
}

impl<B: Backend> ImageBatch<B> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Knows the per-image geometry so it can lay out the flat buffer
#[derive(Clone, Debug)]
pub struct ImageBatcher {
    channels: usize,
    height:   usize,
    width:    usize,
}

impl ImageBatcher {
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self { channels, height, width }
    }

    fn image_len(&self) -> usize {
        self.channels * self.height * self.width
    }
}

impl<B: Backend> Batcher<B, ImageItem, ImageBatch<B>> for ImageBatcher {
    fn batch(&self, items: Vec<ImageItem>, device: &B::Device) -> ImageBatch<B> {
        let batch_size = items.len();
        let image_len  = self.image_len();

        let mut flat       = Vec::with_capacity(batch_size * image_len);
        let mut labels     = Vec::with_capacity(batch_size);
        let mut unreadable = Vec::new();

        for item in items {
            match item.pixels {
                Ok(pixels) if pixels.len() == image_len => flat.extend_from_slice(&pixels),
                Ok(pixels) => {
                    unreadable.push((
                        item.path,
                        format!("expected {} values, got {}", image_len, pixels.len()),
                    ));
                    flat.resize(flat.len() + image_len, 0.0);
                }
                Err(message) => {
                    unreadable.push((item.path, message));
                    flat.resize(flat.len() + image_len, 0.0);
                }
            }
            labels.push(item.label);
        }

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(flat, [batch_size, self.channels, self.height, self.width]),
            device,
        );

        ImageBatch { images, labels, unreadable }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    fn item(value: f32, label: usize) -> ImageItem {
        ImageItem {
            pixels: Ok(vec![value; 2 * 3 * 3]),
            label,
            path:   PathBuf::from(format!("img{label}.png")),
        }
    }

    #[test]
    fn test_stacks_items_in_order() {
        let batcher = ImageBatcher::new(2, 3, 3);
        let device  = Default::default();
        let batch: ImageBatch<B> = batcher.batch(vec![item(1.0, 3), item(2.0, 5)], &device);

        assert_eq!(batch.images.dims(), [2, 2, 3, 3]);
        assert_eq!(batch.labels, vec![3, 5]);
        assert!(batch.unreadable.is_empty());

        let values = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[18], 2.0);
    }

    #[test]
    fn test_unreadable_items_are_zero_filled_and_reported() {
        let batcher = ImageBatcher::new(2, 3, 3);
        let device  = Default::default();
        let broken  = ImageItem {
            pixels: Err("bad header".to_string()),
            label:  9,
            path:   PathBuf::from("broken.jpg"),
        };
        let batch: ImageBatch<B> = batcher.batch(vec![broken, item(1.0, 1)], &device);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.unreadable.len(), 1);
        assert_eq!(batch.unreadable[0].0, PathBuf::from("broken.jpg"));

        let values = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values[0], 0.0);
        assert_eq!(values[18], 1.0);
    }
}
