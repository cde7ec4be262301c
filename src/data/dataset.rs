use burn::data::dataset::Dataset;
use std::path::PathBuf;

use crate::data::{loader::ImageRecord, preprocessor::ImagePreprocessor};

/// One preprocessed validation sample.
///
/// Decoding failures are carried in `pixels` instead of being
/// dropped: a `None` from `Dataset::get` would end the pass early.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub pixels: Result<Vec<f32>, String>,
    pub label:  usize,
    pub path:   PathBuf,
}

pub struct ImageNetValDataset {
    records:      Vec<ImageRecord>,
    preprocessor: ImagePreprocessor,
}

impl ImageNetValDataset {
    pub fn new(records: Vec<ImageRecord>, preprocessor: ImagePreprocessor) -> Self {
        Self { records, preprocessor }
    }
}

impl Dataset<ImageItem> for ImageNetValDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        let record = self.records.get(index)?;
        let pixels = self
            .preprocessor
            .load(&record.path)
            .map_err(|e| e.to_string());
        Some(ImageItem {
            pixels,
            label: record.label,
            path:  record.path.clone(),
        })
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::scratch_dir;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_get_decodes_and_reports_failures() {
        let root = scratch_dir("dataset-get");
        let good = root.join("good.png");
        let bad  = root.join("bad.png");
        RgbImage::from_pixel(12, 12, Rgb([10, 20, 30])).save(&good).unwrap();
        std::fs::write(&bad, b"not a png").unwrap();

        let pre     = ImagePreprocessor::new((8, 8), 1.0, 3).unwrap();
        let dataset = ImageNetValDataset::new(
            vec![
                ImageRecord { path: good, label: 4 },
                ImageRecord { path: bad,  label: 7 },
            ],
            pre,
        );

        assert_eq!(dataset.len(), 2);
        let first = dataset.get(0).unwrap();
        assert_eq!(first.label, 4);
        assert_eq!(first.pixels.unwrap().len(), 3 * 8 * 8);

        let second = dataset.get(1).unwrap();
        assert_eq!(second.label, 7);
        assert!(second.pixels.is_err());

        assert!(dataset.get(2).is_none());
        std::fs::remove_dir_all(&root).ok();
    }
}
