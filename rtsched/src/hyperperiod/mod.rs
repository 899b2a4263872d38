//! Hyperperiod calculation.
//!
//! The hyperperiod of a periodic task set is the LCM of all periods: the
//! smallest window after which the combined release pattern repeats.  Every
//! timeline this crate builds spans exactly one hyperperiod, so its size is
//! also the cost driver of schedule construction.
//!
//! | Failure | Variant |
//! |---|---|
//! | empty set, or a task with period `0` | [`HyperperiodError::NoValidPeriods`] |
//! | LCM does not fit `u64` | [`HyperperiodError::Overflow`] |
//! | LCM above the configured ceiling | [`HyperperiodError::TooLarge`] |

pub mod math;

use serde::Serialize;
use tracing::{debug, warn};

use crate::task::Task;
use math::lcm_of_slice;

/// Default ceiling on the hyperperiod, in ticks.
///
/// Building a timeline is linear in the hyperperiod, so sets whose periods
/// are pairwise coprime are rejected early instead of hanging the caller.
pub const DEFAULT_HYPERPERIOD_LIMIT: u64 = 10_000_000;

// ── Error type ────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum HyperperiodError {
    /// The task slice was empty, or some task has `period == 0`.
    NoValidPeriods,

    /// LCM overflowed `u64` while folding in `b`.
    Overflow { a: u64, b: u64 },

    /// The hyperperiod exceeds the configured ceiling.
    TooLarge { value: u64, limit: u64 },
}

impl std::fmt::Display for HyperperiodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperperiodError::NoValidPeriods => {
                write!(f, "hyperperiod needs at least one task and only positive periods")
            }
            HyperperiodError::Overflow { a, b } => {
                write!(f, "LCM overflow computing lcm({a}, {b})")
            }
            HyperperiodError::TooLarge { value, limit } => {
                write!(f, "hyperperiod {value} exceeds limit {limit}")
            }
        }
    }
}

impl std::error::Error for HyperperiodError {}

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

/// Hyperperiod of one task set plus the data it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HyperperiodInfo {
    pub hyperperiod: u64,

    /// Distinct periods, sorted ascending.
    pub unique_periods: Vec<u64>,

    pub task_count: usize,
}

/// Unbounded hyperperiod of `tasks`.
pub fn hyperperiod(tasks: &[Task]) -> Result<u64, HyperperiodError> {
    calculate(tasks, u64::MAX).map(|info| info.hyperperiod)
}

/// Hyperperiod of `tasks`, rejected when it exceeds `limit`.
pub fn calculate(tasks: &[Task], limit: u64) -> Result<HyperperiodInfo, HyperperiodError> {
    if tasks.is_empty() || tasks.iter().any(|t| t.period == 0) {
        return Err(HyperperiodError::NoValidPeriods);
    }

    let unique_periods: Vec<u64> = {
        let mut v: Vec<u64> = tasks.iter().map(|t| t.period).collect();
        v.sort_unstable();
        v.dedup();
        v
    };

    let value = lcm_of_slice(&unique_periods)?;

    if value > limit {
        warn!(hyperperiod = value, limit, "Hyperperiod exceeds configured limit");
        return Err(HyperperiodError::TooLarge { value, limit });
    }

    debug!(
        hyperperiod = value,
        unique = ?unique_periods,
        task_count = tasks.len(),
        "Calculated hyperperiod"
    );

    Ok(HyperperiodInfo {
        hyperperiod: value,
        unique_periods,
        task_count: tasks.len(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(period: u64) -> Task {
        Task {
            compute_time: 1.0,
            deadline: period,
            period,
            ..Default::default()
        }
    }

    #[test]
    fn hyperperiod_of_harmonic_and_non_harmonic_sets() {
        assert_eq!(hyperperiod(&[make_task(4), make_task(6), make_task(12)]).unwrap(), 12);
        assert_eq!(hyperperiod(&[make_task(10), make_task(20)]).unwrap(), 20);
        assert_eq!(hyperperiod(&[make_task(7)]).unwrap(), 7);
    }

    #[test]
    fn empty_set_has_no_hyperperiod() {
        assert_eq!(hyperperiod(&[]).unwrap_err(), HyperperiodError::NoValidPeriods);
    }

    #[test]
    fn zero_period_is_rejected_not_skipped() {
        let tasks = vec![make_task(4), make_task(0)];
        assert_eq!(hyperperiod(&tasks).unwrap_err(), HyperperiodError::NoValidPeriods);
    }

    #[test]
    fn limit_is_inclusive() {
        let tasks = vec![make_task(5), make_task(7)];
        assert_eq!(calculate(&tasks, 35).unwrap().hyperperiod, 35);
        assert_eq!(
            calculate(&tasks, 34).unwrap_err(),
            HyperperiodError::TooLarge { value: 35, limit: 34 }
        );
    }

    #[test]
    fn unique_periods_are_sorted_and_deduped() {
        let tasks = vec![make_task(6), make_task(4), make_task(6)];
        let info = calculate(&tasks, DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.unique_periods, vec![4, 6]);
        assert_eq!(info.task_count, 3);
    }
}
