// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns with side effects on the outside world:
//
//   checkpoint.rs — Loading network weights
//                   Uses Burn's CompactRecorder for both the
//                   pretrained model store and --resume files.
//
//   logging.rs    — Global tracing subscriber
//                   Console output plus an appended log file
//                   under --save-dir, and the run header.

/// Pretrained model store and weight file loading
pub mod checkpoint;

/// Console / file logging initialisation
pub mod logging;
