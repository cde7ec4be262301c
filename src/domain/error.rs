// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Failures the harness itself detects. Everything else (I/O,
// checkpoint decoding, device setup) travels as anyhow errors
// with context attached where it happens.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("Either --use-pretrained or --resume must be given, otherwise there are no weights to evaluate")]
    MissingWeightsSource,

    #[error("Unknown model \"{name}\"\n\tRun the `models` command to list available models")]
    UnknownModel { name: String },

    #[error("Data type \"{dtype}\" is not supported on {context}")]
    UnsupportedDType { dtype: String, context: String },

    #[error("Invalid value for --{flag}: {value}\n\tMessage: {message}")]
    InvalidArgument {
        flag:    String,
        value:   String,
        message: String,
    },

    #[error("Validation data source '{path}' yielded no samples")]
    EmptyDataSource { path: PathBuf },

    #[error("Cannot read image '{path}'\n\tMessage: {message}")]
    UnreadableImage { path: PathBuf, message: String },
}
