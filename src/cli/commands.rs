// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `eval` and `models`, and all the
// evaluation flags. Flag names match the usual ImageNet
// evaluation scripts so existing command lines keep working.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::eval_use_case::EvalConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a model on the ImageNet-1K validation set
    Eval(EvalArgs),

    /// List the models --model accepts
    Models,
}

/// All arguments for the `eval` command.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Type of model to use, see the `models` command for options
    #[arg(long)]
    pub model: String,

    /// Load pretrained weights from the model store
    #[arg(long)]
    pub use_pretrained: bool,

    /// Data type for evaluation (float32 or float16)
    #[arg(long, default_value = "float32")]
    pub dtype: String,

    /// Load parameters from this file (after any pretrained ones)
    #[arg(long, default_value = "")]
    pub resume: String,

    /// Size of the input for the model
    #[arg(long, default_value_t = 224)]
    pub input_size: usize,

    /// Inverted ratio for the input image crop
    #[arg(long, default_value_t = 0.875)]
    pub resize_inv_factor: f64,

    /// Number of classes
    #[arg(long, default_value_t = 1000)]
    pub num_classes: usize,

    /// Number of input channels
    #[arg(long, default_value_t = 3)]
    pub in_channels: usize,

    /// Number of GPUs to use, 0 runs on the CPU
    #[arg(long, default_value_t = 0)]
    pub num_gpus: usize,

    /// Number of preprocessing workers
    #[arg(short = 'j', long = "num-data-workers", default_value_t = 4)]
    pub num_workers: usize,

    /// Batch size per device (CPU/GPU)
    #[arg(long, default_value_t = 512)]
    pub batch_size: usize,

    /// Directory for log files, empty disables file logging
    #[arg(long, default_value = "")]
    pub save_dir: String,

    /// Filename of the log inside --save-dir
    #[arg(long, default_value = "train.log")]
    pub logging_file_name: String,

    /// Comma separated packages whose versions are logged
    #[arg(long, default_value = "imagenet-eval")]
    pub log_packages: String,

    /// Comma separated external packages to note in the log
    #[arg(long, default_value = "")]
    pub log_pip_packages: String,

    /// Dataset root; images are read from <data-dir>/val
    #[arg(long, default_value = "../imgclsmob_data/imagenet")]
    pub data_dir: String,

    /// Directory with pretrained <model>.mpk files
    #[arg(long, default_value = "pretrained")]
    pub model_store: String,
}

/// The application layer never sees clap types.
impl From<&EvalArgs> for EvalConfig {
    fn from(a: &EvalArgs) -> Self {
        EvalConfig {
            model:             a.model.clone(),
            use_pretrained:    a.use_pretrained,
            dtype:             a.dtype.clone(),
            resume:            a.resume.clone(),
            input_size:        a.input_size,
            resize_inv_factor: a.resize_inv_factor,
            num_classes:       a.num_classes,
            in_channels:       a.in_channels,
            num_gpus:          a.num_gpus,
            num_workers:       a.num_workers,
            batch_size:        a.batch_size,
            data_dir:          a.data_dir.clone(),
            model_store:       a.model_store.clone(),
        }
    }
}
