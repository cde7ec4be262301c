// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that touches Burn modules and backends:
//
//   model.rs     — ResNet family (basic and bottleneck units,
//                  optional width scaling)
//
//   zoo.rs       — Named architectures selectable with --model
//
//   context.rs   — CPU / GPU device selection and the effective
//                  batch size
//
//   evaluator.rs — The validation pass and result logging

/// ResNet architecture
pub mod model;

/// Model catalogue
pub mod zoo;

/// Device context
pub mod context;

/// Validation loop
pub mod evaluator;
