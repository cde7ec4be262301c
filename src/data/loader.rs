// ============================================================
// Layer 4 — ImageNet Folder Loader
// ============================================================
// Discovers the validation images on disk. The expected layout
// is one directory per class:
//
//   <data-dir>/val/
//     n01440764/ ILSVRC2012_val_00000293.JPEG ...
//     n01443537/ ...
//
// Class directories are sorted by name and numbered from 0,
// which reproduces the usual 1000-class label order.
//
// Only the listing happens here; pixels are decoded lazily by
// the dataset so the data loader workers share the work.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File extensions treated as images (compared lowercase)
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// One image file and its class index
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub path:  PathBuf,
    pub label: usize,
}

/// Lists class directories and their images
pub struct ImageFolderLoader {
    root: PathBuf,
}

impl ImageFolderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns (class names, records). Records are ordered by class,
    /// then by file name.
    pub fn load_all(&self) -> Result<(Vec<String>, Vec<ImageRecord>)> {
        let mut classes: Vec<(String, PathBuf)> = Vec::new();

        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Cannot read validation directory '{}'", self.root.display()))?
        {
            let entry = entry?;
            let path  = entry.path();
            if path.is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                classes.push((name, path));
            }
        }
        classes.sort_by(|a, b| a.0.cmp(&b.0));

        let mut records = Vec::new();
        for (label, (_, dir)) in classes.iter().enumerate() {
            let mut files: Vec<PathBuf> = fs::read_dir(dir)
                .with_context(|| format!("Cannot read class directory '{}'", dir.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| is_image(p))
                .collect();
            files.sort();
            records.extend(files.into_iter().map(|path| ImageRecord { path, label }));
        }

        tracing::debug!(
            "Found {} images in {} classes under '{}'",
            records.len(),
            classes.len(),
            self.root.display()
        );

        Ok((classes.into_iter().map(|(name, _)| name).collect(), records))
    }
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}
