// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by every other layer: the running
// accuracy metric, the precision tag, the final report and the
// error enum. No burn types and no file I/O live here, so all
// of it is testable without a device.

/// Running top-k accuracy accumulator
pub mod metrics;

/// float32 / float16 selection
pub mod precision;

/// Result of one validation pass
pub mod report;

/// Failures detected by the harness itself
pub mod error;
