// ============================================================
// Layer 5 — Validation Loop
// ============================================================
// One pass over the validation data:
//
//   for batch in loader:
//       shards = batch_fn(batch, devices)
//       for shard: logits = net[device].forward(shard.images)
//                  top1.update(labels, logits)
//                  top5.update(labels, logits)
//
// The network is built on a plain (non-autodiff) backend, so
// batch norm uses its running statistics and nothing records
// gradients.
//
// Reference: Burn Book §5 (Inference)

use anyhow::{anyhow, Result};
use burn::{data::dataloader::DataLoader, prelude::*};
use std::{path::PathBuf, time::Instant};

use crate::data::{batcher::ImageBatch, splitter::BatchFn};
use crate::domain::{error::EvalError, metrics::TopKAccuracy, precision::DType, report::EvalReport};
use crate::ml::model::ResNet;

/// Switches for one evaluation run
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Where the validation samples come from, for error messages
    pub source:                  PathBuf,
    /// Whether the source must be rewound before the pass.
    /// Burn loaders hand out a fresh iterator per pass, so this
    /// is informational only.
    pub data_source_needs_reset: bool,
    pub dtype:                   DType,
    pub num_classes:             usize,
    pub calc_weight_count:       bool,
    pub extended_log:            bool,
}

/// Run the full pass and return (top-1 error, top-5 error)
pub fn validate<B: Backend>(
    acc_top1: &mut TopKAccuracy,
    acc_top5: &mut TopKAccuracy,
    net:      &ResNet<B>,
    val_data: &dyn DataLoader<B, ImageBatch<B>>,
    batch_fn: BatchFn<B>,
    devices:  &[B::Device],
    num_classes: usize,
) -> Result<(f64, f64)> {
    acc_top1.reset();
    acc_top5.reset();

    // One replica per device; device 0 uses `net` itself
    let replicas: Vec<ResNet<B>> = devices
        .iter()
        .enumerate()
        .map(|(i, d)| if i == 0 { net.clone() } else { net.clone().fork(d) })
        .collect();

    for batch in val_data.iter() {
        if batch.is_empty() {
            continue;
        }
        if let Some((path, message)) = batch.unreadable.first() {
            return Err(EvalError::UnreadableImage {
                path:    path.clone(),
                message: message.clone(),
            }
            .into());
        }

        for shard in batch_fn(batch, devices) {
            let logits = replicas[shard.device].forward(shard.images);
            let scores = logits
                .into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read network output: {e:?}"))?;

            acc_top1.update(&shard.labels, &scores, num_classes);
            acc_top5.update(&shard.labels, &scores, num_classes);
        }

        tracing::debug!(
            "Validated {} samples (running err-top1={:.4})",
            acc_top1.num_inst(),
            acc_top1.error()
        );
    }

    Ok((acc_top1.error(), acc_top5.error()))
}

/// Evaluate `net` once over `val_data` and log the outcome:
/// parameter count (optional), error rates and elapsed time.
pub fn evaluate<B: Backend>(
    net:      &ResNet<B>,
    val_data: &dyn DataLoader<B, ImageBatch<B>>,
    batch_fn: BatchFn<B>,
    devices:  &[B::Device],
    options:  EvalOptions,
) -> Result<EvalReport> {
    let mut acc_top1 = TopKAccuracy::new(1);
    let mut acc_top5 = TopKAccuracy::new(5);

    tracing::debug!(
        "Evaluating in {} on {} device(s), reset needed: {}",
        options.dtype,
        devices.len(),
        options.data_source_needs_reset
    );

    let tic = Instant::now();
    let (err_top1, err_top5) = validate(
        &mut acc_top1,
        &mut acc_top5,
        net,
        val_data,
        batch_fn,
        devices,
        options.num_classes,
    )?;

    if acc_top1.num_inst() == 0 {
        return Err(EvalError::EmptyDataSource { path: options.source }.into());
    }

    let report = EvalReport {
        err_top1,
        err_top5,
        num_samples:  acc_top1.num_inst(),
        weight_count: options.calc_weight_count.then(|| net.num_trainable_params()),
        elapsed:      tic.elapsed(),
    };

    tracing::debug!(
        "{}={:.4}, {}={:.4} over {} samples",
        acc_top1.name(),
        acc_top1.get(),
        acc_top5.name(),
        acc_top5.get(),
        report.num_samples
    );
    if let Some(line) = report.weight_count_line() {
        tracing::info!("{}", line);
    }
    tracing::info!("{}", report.error_line(options.extended_log));
    tracing::info!("{}", report.time_line());

    Ok(report)
}
