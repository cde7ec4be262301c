// ============================================================
// Layer 3 — Evaluation Report
// ============================================================
// What one validation pass produced. The log lines printed at
// the end of a run are rendered from this struct so that tests
// can check the exact wording without a logger.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// 1 - top-1 accuracy
    pub err_top1:     f64,
    /// 1 - top-5 accuracy
    pub err_top5:     f64,
    pub num_samples:  usize,
    /// Trainable parameter count, if it was requested
    pub weight_count: Option<usize>,
    pub elapsed:      Duration,
}

impl EvalReport {
    /// `Test: err-top1=0.2345 (0.23451)	err-top5=...` when extended,
    /// otherwise only the 4-digit rounding.
    pub fn error_line(&self, extended: bool) -> String {
        if extended {
            format!(
                "Test: err-top1={top1:.4} ({top1})\terr-top5={top5:.4} ({top5})",
                top1 = self.err_top1,
                top5 = self.err_top5,
            )
        } else {
            format!(
                "Test: err-top1={top1:.4}\terr-top5={top5:.4}",
                top1 = self.err_top1,
                top5 = self.err_top5,
            )
        }
    }

    pub fn weight_count_line(&self) -> Option<String> {
        self.weight_count
            .map(|n| format!("Model: {n} trainable parameters"))
    }

    pub fn time_line(&self) -> String {
        format!("Time cost: {:.4} sec", self.elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> EvalReport {
        EvalReport {
            err_top1:     0.25,
            err_top5:     0.0625,
            num_samples:  16,
            weight_count: Some(11_689_512),
            elapsed:      Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_short_error_line() {
        assert_eq!(report().error_line(false), "Test: err-top1=0.2500\terr-top5=0.0625");
    }

    #[test]
    fn test_extended_error_line_shows_full_value() {
        assert_eq!(
            report().error_line(true),
            "Test: err-top1=0.2500 (0.25)\terr-top5=0.0625 (0.0625)"
        );
    }

    #[test]
    fn test_weight_count_and_time_lines() {
        let r = report();
        assert_eq!(r.weight_count_line().as_deref(), Some("Model: 11689512 trainable parameters"));
        assert_eq!(r.time_line(), "Time cost: 1.5000 sec");
    }

    #[test]
    fn test_no_weight_count_line_when_not_requested() {
        let mut r = report();
        r.weight_count = None;
        assert!(r.weight_count_line().is_none());
    }
}
