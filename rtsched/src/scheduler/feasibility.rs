/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Closed-form sufficient tests for fixed-priority scheduling.
//!
//! # Theory
//! **Liu & Layland (1973)**: under Rate Monotonic scheduling (shorter period →
//! higher priority), a set of `n` independent periodic tasks with implicit
//! deadlines is **guaranteed** schedulable on one CPU if:
//!
//! $$U = \sum_{i=1}^{n} \frac{C_i}{T_i} \leq n \left(2^{1/n} - 1\right)$$
//!
//! The bound tightens as `n` grows, converging to `ln(2) ≈ 0.693`.
//!
//! | n | Bound |
//! |---|---|
//! | 1 | 1.000 |
//! | 2 | 0.828 |
//! | 3 | 0.780 |
//! | 5 | 0.743 |
//! | ∞ | ln(2) ≈ 0.693 |
//!
//! **Hyperbolic bound (Bini, Buttazzo 2001)**: the same guarantee holds if
//!
//! $$\prod_{i=1}^{n} (U_i + 1) \leq 2$$
//!
//! which dominates Liu & Layland.  Failing both says nothing: Response-Time
//! Analysis decides.

use crate::analysis::approx_le;
use crate::analysis::metrics::total_utilization;
use crate::task::Task;

// ── Public API ────────────────────────────────────────────────────────────────

/// Compute the Liu & Layland utilisation upper bound for `n` tasks.
///
/// `U_bound(n) = n × (2^(1/n) − 1)`
///
/// Returns `1.0` for `n = 1` (a single task always fits if `U ≤ 1`),
/// and `0.0` for `n = 0`.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// `Π (U_i + 1)`; `1.0` for an empty set.
pub fn hyperbolic_product(tasks: &[Task]) -> f64 {
    tasks.iter().map(|t| t.utilization() + 1.0).product()
}

/// Total utilisation within the Liu & Layland bound for `tasks.len()`.
pub fn check_liu_layland(tasks: &[Task]) -> bool {
    approx_le(total_utilization(tasks), liu_layland_bound(tasks.len()))
}

/// Hyperbolic product `<= 2`.
pub fn check_hyperbolic(tasks: &[Task]) -> bool {
    approx_le(hyperbolic_product(tasks), 2.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
