// ============================================================
// Layer 5 — Model Zoo
// ============================================================
// The catalogue of networks `--model` can name. Each entry says
// how to build the architecture; weights come separately from
// the model store or a --resume file.
//
// Width-scaled variants follow the usual suffixes:
//   _wd4  → 1/4 width,  _wd2 → 1/2 width,  _w3d4 → 3/4 width

use crate::domain::error::EvalError;
use crate::ml::model::ResNetConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub name:        &'static str,
    pub layers:      [usize; 4],
    pub bottleneck:  bool,
    pub width_scale: f64,
    /// Fixed (height, width) input; None means --input-size decides
    pub in_size:     Option<(usize, usize)>,
}

impl ModelSpec {
    const fn resnet(name: &'static str, layers: [usize; 4], bottleneck: bool, width_scale: f64) -> Self {
        Self { name, layers, bottleneck, width_scale, in_size: None }
    }

    pub fn config(&self, num_classes: usize, in_channels: usize) -> ResNetConfig {
        ResNetConfig::new(self.layers.to_vec(), self.bottleneck, num_classes, in_channels)
            .with_width_scale(self.width_scale)
    }

    /// Network input size: the model's own if it has one
    pub fn input_size(&self, requested: usize) -> (usize, usize) {
        self.in_size.unwrap_or((requested, requested))
    }
}

pub const MODELS: &[ModelSpec] = &[
    ModelSpec::resnet("resnet10",      [1, 1, 1, 1],  false, 1.0),
    ModelSpec::resnet("resnet12",      [2, 1, 1, 1],  false, 1.0),
    ModelSpec::resnet("resnet14",      [2, 2, 1, 1],  false, 1.0),
    ModelSpec::resnet("resnet16",      [2, 2, 2, 1],  false, 1.0),
    ModelSpec::resnet("resnet18_wd4",  [2, 2, 2, 2],  false, 0.25),
    ModelSpec::resnet("resnet18_wd2",  [2, 2, 2, 2],  false, 0.5),
    ModelSpec::resnet("resnet18_w3d4", [2, 2, 2, 2],  false, 0.75),
    ModelSpec::resnet("resnet18",      [2, 2, 2, 2],  false, 1.0),
    ModelSpec::resnet("resnet26",      [3, 3, 3, 3],  false, 1.0),
    ModelSpec::resnet("resnet34",      [3, 4, 6, 3],  false, 1.0),
    ModelSpec::resnet("resnet50",      [3, 4, 6, 3],  true,  1.0),
    ModelSpec::resnet("resnet101",     [3, 4, 23, 3], true,  1.0),
    ModelSpec::resnet("resnet152",     [3, 8, 36, 3], true,  1.0),
];

/// Look a model up by name (case-insensitive)
pub fn find(name: &str) -> Result<&'static ModelSpec, EvalError> {
    let wanted = name.trim().to_ascii_lowercase();
    MODELS
        .iter()
        .find(|m| m.name == wanted)
        .ok_or(EvalError::UnknownModel { name: name.to_string() })
}
