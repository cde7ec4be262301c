// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From a directory of JPEGs to device-resident tensor shards:
//
//   ImageFolderLoader   → lists <class>/<image> files, assigns labels
//       │
//       ▼
//   ImageNetValDataset  → implements Burn's Dataset trait,
//       │                 decodes + preprocesses on get()
//       ▼
//   ImageBatcher        → stacks samples into [N, C, H, W]
//       │
//       ▼
//   DataLoader          → burn, runs the batcher on worker threads
//       │
//       ▼
//   split_batch         → one shard per compute device

/// Lists validation images and their class labels
pub mod loader;

/// Resize / center-crop / normalise transform
pub mod preprocessor;

/// Implements Burn's Dataset trait for validation images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Splits a batch across compute devices
pub mod splitter;
