// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: this layer calls into data, ml
// and infra in the right order but holds no tensor math and
// prints nothing itself.

// The evaluation workflow
pub mod eval_use_case;
