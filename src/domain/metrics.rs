// ============================================================
// Layer 3 — Top-k Accuracy
// ============================================================
// Running classification accuracy over a stream of batches.
//
// A sample is "correct at k" when its true label is among the
// k highest-scoring classes. We don't sort the score row; we
// count how many classes score strictly higher than the true
// label. If that count is below k, the label made the top k.
//
//   scores: [0.1, 0.7, 0.2]   label = 2
//   higher than 0.2 → { 0.7 } → rank 1
//   k = 1 → wrong,  k = 2 → correct
//
// Ties are resolved in favour of the true label.
//
// The error rate reported by the harness is 1 - accuracy.

/// Accumulates top-k accuracy across batches.
#[derive(Debug, Clone)]
pub struct TopKAccuracy {
    k:           usize,
    num_correct: usize,
    num_inst:    usize,
}

impl TopKAccuracy {
    /// Create an empty accumulator for the given k (k >= 1)
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "top-k accuracy needs k >= 1 (got {k})");
        Self { k, num_correct: 0, num_inst: 0 }
    }

    /// Metric name in the `top_k_accuracy_5` style, `accuracy` for k = 1
    pub fn name(&self) -> String {
        if self.k == 1 {
            "accuracy".to_string()
        } else {
            format!("top_k_accuracy_{}", self.k)
        }
    }

    /// Update with one batch.
    ///
    /// `scores` is row-major `[labels.len(), num_classes]`.
    pub fn update(&mut self, labels: &[usize], scores: &[f32], num_classes: usize) {
        assert_eq!(
            scores.len(),
            labels.len() * num_classes,
            "score buffer does not match {} samples x {} classes",
            labels.len(),
            num_classes
        );

        for (row, &label) in scores.chunks(num_classes.max(1)).zip(labels) {
            self.num_inst += 1;
            if label >= num_classes {
                continue;
            }
            let target = row[label];
            let rank   = row.iter().filter(|&&s| s > target).count();
            if rank < self.k {
                self.num_correct += 1;
            }
        }
    }

    /// Fraction of correct samples, NaN when nothing was seen yet
    pub fn get(&self) -> f64 {
        if self.num_inst == 0 {
            return f64::NAN;
        }
        self.num_correct as f64 / self.num_inst as f64
    }

    /// Error rate = 1 - accuracy
    pub fn error(&self) -> f64 {
        1.0 - self.get()
    }

    pub fn num_inst(&self) -> usize {
        self.num_inst
    }

    pub fn reset(&mut self) {
        self.num_correct = 0;
        self.num_inst    = 0;
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top1_counts_argmax_hits() {
        let mut acc = TopKAccuracy::new(1);
        let scores  = [
            0.1, 0.7, 0.2, // argmax 1
            0.9, 0.05, 0.05, // argmax 0
        ];
        acc.update(&[1, 2], &scores, 3);
        assert_eq!(acc.num_inst(), 2);
        assert!((acc.get() - 0.5).abs() < 1e-12);
        assert!((acc.error() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_top5_accepts_lower_ranks() {
        let mut top1 = TopKAccuracy::new(1);
        let mut top5 = TopKAccuracy::new(5);
        // label 3 is ranked 4th
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3];
        top1.update(&[3], &scores, 7);
        top5.update(&[3], &scores, 7);
        assert_eq!(top1.get(), 0.0);
        assert_eq!(top5.get(), 1.0);
    }

    #[test]
    fn test_rank_six_misses_top5() {
        let mut top5 = TopKAccuracy::new(5);
        let scores   = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3];
        top5.update(&[5], &scores, 7);
        assert_eq!(top5.get(), 0.0);
    }

    #[test]
    fn test_k_above_num_classes_is_always_correct() {
        let mut top5 = TopKAccuracy::new(5);
        top5.update(&[0, 1], &[0.1, 0.9, 0.3, 0.2], 2);
        assert_eq!(top5.get(), 1.0);
    }

    #[test]
    fn test_out_of_range_label_is_a_miss() {
        let mut acc = TopKAccuracy::new(5);
        acc.update(&[7], &[0.5, 0.5], 2);
        assert_eq!(acc.num_inst(), 1);
        assert_eq!(acc.get(), 0.0);
    }

    #[test]
    fn test_ties_favour_true_label() {
        let mut acc = TopKAccuracy::new(1);
        acc.update(&[2], &[0.5, 0.5, 0.5], 3);
        assert_eq!(acc.get(), 1.0);
    }

    #[test]
    fn test_error_stays_in_unit_interval() {
        let mut acc = TopKAccuracy::new(1);
        for i in 0..10 {
            let label  = i % 4;
            let scores = [0.25, 0.1, 0.4, 0.25];
            acc.update(&[label], &scores, 4);
        }
        let err = acc.error();
        assert!((0.0..=1.0).contains(&err));
    }

    #[test]
    fn test_empty_accumulator_is_nan_and_reset_clears() {
        let mut acc = TopKAccuracy::new(1);
        assert!(acc.get().is_nan());
        acc.update(&[0], &[1.0, 0.0], 2);
        acc.reset();
        assert!(acc.get().is_nan());
    }

    #[test]
    fn test_names() {
        assert_eq!(TopKAccuracy::new(1).name(), "accuracy");
        assert_eq!(TopKAccuracy::new(5).name(), "top_k_accuracy_5");
    }
}
