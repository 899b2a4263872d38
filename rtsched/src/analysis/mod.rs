/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedulability analyses shared by the scheduling policies.
//!
//! ```text
//! analysis/
//! ├── metrics           – utilisation, hyperperiod, min/max accessors
//! ├── rta               – response-time fixed point (RM, DM)
//! ├── pdc               – processor-demand criterion (EDF)
//! └── secondary_period  – valid frame sizes (cyclic)
//! ```
//!
//! # Numeric tolerance
//! Periods and deadlines are integers; only `compute_time` is real.  Every
//! comparison of a real quantity against a bound goes through
//! [`approx_le`] / [`approx_eq`], which allow an error of [`EPSILON`]
//! scaled by the magnitude of the operands.  A utilisation that lands on a
//! bound exactly (`0.1 + 0.2` vs `0.3`) therefore passes.

pub mod metrics;
pub mod pdc;
pub mod rta;
pub mod secondary_period;

/// Absolute tolerance for real-valued boundary comparisons, scaled by
/// `max(1, |a|, |b|)`.
pub const EPSILON: f64 = 1e-9;

fn tolerance(a: f64, b: f64) -> f64 {
    EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// `a <= b` within [`EPSILON`].
pub fn approx_le(a: f64, b: f64) -> bool {
    a <= b + tolerance(a, b)
}

/// `a == b` within [`EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= tolerance(a, b)
}

/// `ceil(numerator / denominator)` that ignores float noise just above an
/// integer.  Never negative.
pub fn ceil_ratio(numerator: f64, denominator: f64) -> f64 {
    let q = numerator / denominator;
    let r = q.round();
    if approx_eq(q, r) {
        r.max(0.0)
    } else {
        q.ceil().max(0.0)
    }
}
