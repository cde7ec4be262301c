// ============================================================
// Layer 6 — Weight Loading
// ============================================================
// Restores network parameters with Burn's CompactRecorder.
//
// Two sources, applied in this order:
//   1. Pretrained: the model store holds one file per zoo name
//        pretrained/
//          resnet18.mpk
//          resnet50.mpk
//   2. --resume: an explicit file, loaded last so it wins over
//      the pretrained weights
//
// The recorder is type-safe: loading fails if the file was saved
// from a different architecture (layer count, widths, classes).
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::path::{Path, PathBuf};

use crate::domain::error::EvalError;
use crate::ml::model::ResNet;

/// Extension CompactRecorder gives its files
const WEIGHTS_EXTENSION: &str = "mpk";

/// Directory of pretrained weights keyed by model name
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where the pretrained file for `model_name` is expected
    pub fn path_for(&self, model_name: &str) -> PathBuf {
        self.dir
            .join(model_name)
            .with_extension(WEIGHTS_EXTENSION)
    }

    pub fn load_pretrained<B: Backend>(
        &self,
        model_name: &str,
        model:      ResNet<B>,
        device:     &B::Device,
    ) -> Result<ResNet<B>> {
        let path = self.path_for(model_name);
        if !path.exists() {
            anyhow::bail!(
                "No pretrained weights for '{}' in model store '{}' (expected '{}')",
                model_name,
                self.dir.display(),
                path.display()
            );
        }
        tracing::info!("Loading pretrained weights from '{}'", path.display());
        load_weights(&path, model, device)
    }
}

/// Load parameters from a record file into `model`.
///
/// The recorder swaps any extension for `.mpk`, so a file named
/// otherwise would be silently replaced by its `.mpk` sibling.
pub fn load_weights<B: Backend>(
    path:   &Path,
    model:  ResNet<B>,
    device: &B::Device,
) -> Result<ResNet<B>> {
    if path.extension().and_then(|e| e.to_str()) != Some(WEIGHTS_EXTENSION) {
        return Err(EvalError::InvalidArgument {
            flag:    "resume".to_string(),
            value:   path.display().to_string(),
            message: format!("weight files must have the .{WEIGHTS_EXTENSION} extension"),
        }
        .into());
    }
    if !path.is_file() {
        anyhow::bail!("Weights file '{}' does not exist", path.display());
    }

    let record = CompactRecorder::new()
        .load(path.to_path_buf(), device)
        .with_context(|| {
            format!(
                "Cannot load weights from '{}'. Does it match the selected model?",
                path.display()
            )
        })?;

    Ok(model.load_record(record))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::scratch_dir;
    use crate::ml::model::ResNetConfig;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    fn save_weights(path: &Path, model: &ResNet<B>) {
        CompactRecorder::new()
            .record(model.clone().into_record(), path.to_path_buf())
            .unwrap();
    }

    fn net() -> ResNet<B> {
        ResNetConfig::new(vec![1, 1, 1, 1], false, 3, 3)
            .with_width_scale(0.125)
            .init(&Default::default())
    }

    #[test]
    fn test_store_path_uses_model_name() {
        let store = ModelStore::new("pretrained");
        assert_eq!(store.path_for("resnet18"), PathBuf::from("pretrained/resnet18.mpk"));
    }

    #[test]
    fn test_missing_pretrained_file_is_an_error() {
        let store = ModelStore::new(scratch_dir("store-empty"));
        let err   = store.load_pretrained("resnet10", net(), &Default::default());
        assert!(err.is_err());
    }

    #[test]
    fn test_pretrained_weights_are_restored() {
        let dir    = scratch_dir("store-roundtrip");
        let device = Default::default();
        let saved  = net();
        save_weights(&dir.join("resnet10"), &saved);

        let store    = ModelStore::new(&dir);
        let restored = store.load_pretrained("resnet10", net(), &device).unwrap();

        let a = saved.output.weight.val().into_data().to_vec::<f32>().unwrap();
        let b = restored.output.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(&b) {
            // CompactRecorder stores half precision
            assert!((p - q).abs() < 1e-3);
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_weights_without_mpk_extension_are_rejected() {
        let dir = scratch_dir("weights-extension");
        save_weights(&dir.join("weights"), &net());
        std::fs::write(dir.join("weights.v2"), b"garbage").unwrap();

        let err = load_weights(&dir.join("weights.v2"), net(), &Default::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvalError>(),
            Some(EvalError::InvalidArgument { flag, .. }) if flag == "resume"
        ));
        assert!(load_weights(&dir.join("weights.mpk"), net(), &Default::default()).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_weights_file_is_an_error() {
        let dir = scratch_dir("weights-missing");
        let err = load_weights(&dir.join("nothing.mpk"), net(), &Default::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
