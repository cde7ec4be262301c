// ============================================================
// Layer 2 — EvalUseCase
// ============================================================
// Orchestrates one evaluation run in order:
//
//   Step 1: Check a weights source was given  (Layer 3 - domain)
//   Step 2: Parse dtype, prepare context      (Layer 5 - ml)
//   Step 3: Pick the Burn backend             (Layer 5 - ml)
//   Step 4: Build the model, load weights     (Layer 5 + 6)
//   Step 5: Build the validation data source  (Layer 4 - data)
//   Step 6: Run the validation pass and log   (Layer 5 - ml)
//
// Burn fixes the float element type at compile time, so step 3
// is a match that instantiates the generic pipeline once per
// (device kind, dtype) pair.

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, NdArray, Wgpu},
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
    tensor::f16,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::ImageNetValDataset,
    loader::ImageFolderLoader,
    preprocessor::ImagePreprocessor,
    splitter::split_batch,
};
use crate::domain::{error::EvalError, precision::DType, report::EvalReport};
use crate::infra::checkpoint::{load_weights, ModelStore};
use crate::ml::{
    context::{prepare_context, ComputeContext},
    evaluator::{evaluate, EvalOptions},
    model::ResNet,
    zoo::{self, ModelSpec},
};

/// Subdirectory of --data-dir holding the validation images
const VAL_SUBDIR: &str = "val";

// ─── Evaluation Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub model:             String,
    pub use_pretrained:    bool,
    pub dtype:             String,
    pub resume:            String,
    pub input_size:        usize,
    pub resize_inv_factor: f64,
    pub num_classes:       usize,
    pub in_channels:       usize,
    pub num_gpus:          usize,
    pub num_workers:       usize,
    pub batch_size:        usize,
    pub data_dir:          String,
    pub model_store:       String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            model:             String::new(),
            use_pretrained:    false,
            dtype:             "float32".to_string(),
            resume:            String::new(),
            input_size:        224,
            resize_inv_factor: 0.875,
            num_classes:       1000,
            in_channels:       3,
            num_gpus:          0,
            num_workers:       4,
            batch_size:        512,
            data_dir:          "../imgclsmob_data/imagenet".to_string(),
            model_store:       "pretrained".to_string(),
        }
    }
}

impl EvalConfig {
    /// Trimmed --resume path, None when blank
    pub fn resume_path(&self) -> Option<PathBuf> {
        let trimmed = self.resume.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    /// There must be something to load weights from
    pub fn check_weights_source(&self) -> Result<(), EvalError> {
        if self.use_pretrained || self.resume_path().is_some() {
            Ok(())
        } else {
            Err(EvalError::MissingWeightsSource)
        }
    }

    pub fn val_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(VAL_SUBDIR)
    }
}

// ─── EvalUseCase ─────────────────────────────────────────────────────────────
pub struct EvalUseCase {
    config: EvalConfig,
}

impl EvalUseCase {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        let cfg = &self.config;

        // ── Step 1: Nothing to evaluate without weights ───────────────────────
        cfg.check_weights_source()?;

        // ── Step 2: Precision and device context ──────────────────────────────
        let dtype: DType       = cfg.dtype.parse()?;
        let (ctx, batch_size)  = prepare_context(cfg.num_gpus, cfg.batch_size);
        ctx.check_dtype(dtype)?;
        tracing::info!("Context: {}, batch size: {}", ctx.describe(), batch_size);

        // ── Step 3: Backend selection ─────────────────────────────────────────
        match (&ctx, dtype) {
            (ComputeContext::Cpu, _) => {
                self.run::<NdArray<f32>>(vec![NdArrayDevice::Cpu], batch_size, dtype)
            }
            (ComputeContext::Gpu { .. }, DType::Float32) => {
                self.run::<Wgpu<f32, i32>>(ctx.wgpu_devices(), batch_size, dtype)
            }
            (ComputeContext::Gpu { .. }, DType::Float16) => {
                self.run::<Wgpu<f16, i32>>(ctx.wgpu_devices(), batch_size, dtype)
            }
        }
    }

    fn run<B: Backend>(
        &self,
        devices:    Vec<B::Device>,
        batch_size: usize,
        dtype:      DType,
    ) -> Result<EvalReport> {
        let cfg     = &self.config;
        let primary = devices[0].clone();

        // ── Step 4: Model ─────────────────────────────────────────────────────
        let spec = zoo::find(&cfg.model)?;
        let net  = self.prepare_model::<B>(spec, &primary)?;

        // ── Step 5: Validation data ───────────────────────────────────────────
        let input_size = spec.input_size(cfg.input_size);
        let val_data   = self.get_val_data_source::<B>(batch_size, input_size, &primary)?;

        // ── Step 6: One pass, then log ────────────────────────────────────────
        evaluate(
            &net,
            val_data.as_ref(),
            split_batch::<B>,
            &devices,
            EvalOptions {
                source:                  cfg.val_dir(),
                data_source_needs_reset: false,
                dtype,
                num_classes:             cfg.num_classes,
                calc_weight_count:       true,
                extended_log:            true,
            },
        )
    }

    /// Build the network and load pretrained and/or resumed weights
    fn prepare_model<B: Backend>(&self, spec: &ModelSpec, device: &B::Device) -> Result<ResNet<B>> {
        let cfg = &self.config;
        let mut net: ResNet<B> = spec
            .config(cfg.num_classes, cfg.in_channels)
            .init(device);

        if cfg.use_pretrained {
            net = ModelStore::new(&cfg.model_store).load_pretrained(spec.name, net, device)?;
        }
        if let Some(path) = cfg.resume_path() {
            tracing::info!("Loading model: {}", path.display());
            net = load_weights(&path, net, device)?;
        }

        tracing::info!("Model {} ready ({} classes)", spec.name, cfg.num_classes);
        Ok(net)
    }

    fn get_val_data_source<B: Backend>(
        &self,
        batch_size: usize,
        input_size: (usize, usize),
        device:     &B::Device,
    ) -> Result<Arc<dyn DataLoader<B, ImageBatch<B>>>> {
        let cfg = &self.config;
        let preprocessor = ImagePreprocessor::new(input_size, cfg.resize_inv_factor, cfg.in_channels)?;

        let val_dir            = cfg.val_dir();
        let (classes, records) = ImageFolderLoader::new(&val_dir).load_all()?;
        if records.is_empty() {
            return Err(EvalError::EmptyDataSource { path: val_dir }.into());
        }
        if classes.len() != cfg.num_classes {
            tracing::warn!(
                "Found {} class directories in '{}' but --num-classes is {}",
                classes.len(),
                val_dir.display(),
                cfg.num_classes
            );
        }
        tracing::info!(
            "Validation set: {} images, {} classes, input {}x{} (resize {})",
            records.len(),
            classes.len(),
            input_size.0,
            input_size.1,
            preprocessor.resize_target()
        );

        let (height, width) = preprocessor.output_size();
        let batcher = ImageBatcher::new(preprocessor.in_channels(), height, width);
        let dataset = ImageNetValDataset::new(records, preprocessor);

        Ok(DataLoaderBuilder::<B, _, _>::new(batcher)
            .batch_size(batch_size)
            .num_workers(cfg.num_workers.max(1))
            .set_device(device.clone())
            .build(dataset))
    }
}
