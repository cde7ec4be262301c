// ============================================================
// Layer 3 — Numeric Precision
// ============================================================
// The element type the network runs in. Burn fixes the float
// element type at compile time through the backend type, so the
// application layer matches on this tag to pick a backend.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Float32,
    Float16,
}

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float16 => "float16",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "float32" | "f32" => Ok(DType::Float32),
            "float16" | "f16" => Ok(DType::Float16),
            other => Err(EvalError::InvalidArgument {
                flag:    "dtype".to_string(),
                value:   other.to_string(),
                message: "expected float32 or float16".to_string(),
            }),
        }
    }
}
