// ============================================================
// Layer 4 — Batch Splitter
// ============================================================
// The batch function: splits one loaded batch along the sample
// axis into one shard per device, then moves each shard to its
// device. With a single device this is a no-op move.
//
// Shard sizes follow the non-even split rule: every shard gets
// floor(N / n) samples and the last one also takes the
// remainder. If there are fewer samples than devices, only the
// first N devices receive a sample each.
//
//   N = 10, n = 3  →  [0..3] [3..6] [6..10]

use burn::prelude::*;
use std::ops::Range;

use crate::data::batcher::ImageBatch;

/// A slice of a batch living on one device
#[derive(Debug, Clone)]
pub struct Shard<B: Backend> {
    pub images: Tensor<B, 4>,
    pub labels: Vec<usize>,
    /// Index into the device list
    pub device: usize,
}

/// Signature of the batch function handed to the validation loop
pub type BatchFn<B> = fn(ImageBatch<B>, &[<B as Backend>::Device]) -> Vec<Shard<B>>;

/// Index ranges of each shard
pub fn split_ranges(size: usize, num_slice: usize) -> Vec<Range<usize>> {
    if size == 0 || num_slice == 0 {
        return Vec::new();
    }
    let num_slice = num_slice.min(size);
    let step      = size / num_slice;

    (0..num_slice)
        .map(|i| {
            let start = i * step;
            let end   = if i + 1 == num_slice { size } else { start + step };
            start..end
        })
        .collect()
}

/// Split a batch across `devices` and move each part there
pub fn split_batch<B: Backend>(batch: ImageBatch<B>, devices: &[B::Device]) -> Vec<Shard<B>> {
    let ranges = split_ranges(batch.len(), devices.len());

    if ranges.len() == 1 {
        return vec![Shard {
            images: batch.images.to_device(&devices[0]),
            labels: batch.labels,
            device: 0,
        }];
    }

    ranges
        .into_iter()
        .enumerate()
        .map(|(i, r)| Shard {
            images: batch
                .images
                .clone()
                .narrow(0, r.start, r.end - r.start)
                .to_device(&devices[i]),
            labels: batch.labels[r].to_vec(),
            device: i,
        })
        .collect()
}
