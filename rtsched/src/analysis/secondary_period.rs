/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Frame-size search for cyclic scheduling.
//!
//! A frame size `ts` is valid when every task's worst release-to-frame skew
//! still leaves a whole frame before its deadline:
//! `2·ts − gcd(ts, T) <= D` for every task.  Candidates lie between
//! `min(D)` and `ceil(max(C))` and must divide the hyperperiod.

use tracing::debug;

use super::ceil_ratio;
use super::metrics::{max_compute_time, min_deadline};
use crate::hyperperiod::math::{divisors, gcd};
use crate::scheduler::SchedulerError;
use crate::task::Task;

/// `2·ts − gcd(ts, period)`.
pub fn compute_time_slot(ts: u64, period: u64) -> u64 {
    (2 * ts).saturating_sub(gcd(ts, period))
}

/// `true` if `ts` satisfies the frame constraint for every task.
pub fn check_time_slot(ts: u64, tasks: &[Task]) -> bool {
    ts > 0 && tasks.iter().all(|t| compute_time_slot(ts, t.period) <= t.deadline)
}

/// Divisors of `hyperperiod` inside the search range, ascending.
///
/// # Errors
/// [`SchedulerError::DegenerateInput`] on an empty task set.
pub fn candidate_time_slots(tasks: &[Task], hyperperiod: u64) -> Result<Vec<u64>, SchedulerError> {
    let a = min_deadline(tasks)?;
    let b = ceil_ratio(max_compute_time(tasks)?, 1.0) as u64;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let lo = lo.max(1);

    Ok(divisors(hyperperiod)
        .into_iter()
        .filter(|d| (lo..=hi).contains(d))
        .collect())
}

/// Candidates that pass [`check_time_slot`], ascending.
pub fn valid_time_slots(tasks: &[Task], hyperperiod: u64) -> Result<Vec<u64>, SchedulerError> {
    let valid: Vec<u64> = candidate_time_slots(tasks, hyperperiod)?
        .into_iter()
        .filter(|&ts| check_time_slot(ts, tasks))
        .collect();
    debug!(hyperperiod, ?valid, "valid frame sizes");
    Ok(valid)
}
