/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Processor-Demand Criterion: exact EDF feasibility for arbitrary
//! deadlines.
//!
//! The demand of a task set in `[t1, t2]` is the work of every job released
//! at or after `t1` with an absolute deadline at or before `t2`.  EDF meets
//! every deadline iff `demand(0, t) <= t` at every absolute deadline `t` up
//! to
//!
//! ```text
//! L* = Σ (T(i) − D(i)) · U(i) / (1 − U)
//! ```
//!
//! or the largest relative deadline, whichever is later (capped at the
//! hyperperiod).  Beyond that point the inequality holds for every `t`, so
//! the check-point list is finite.  `L*` goes negative when some `D > T`;
//! the largest deadline keeps the early check points in that case.  `L*` is undefined at `U >= 1`;
//! the criterion then reports "does not hold" and EDF falls back to its
//! utilisation condition.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::metrics::total_utilization;
use super::{approx_le, ceil_ratio};
use crate::scheduler::SchedulerError;
use crate::task::Task;

/// One row of the demand table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandCheck {
    pub time: u64,
    pub demand: f64,
    pub holds: bool,
}

/// Full outcome of the criterion for one task set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandAnalysis {
    /// `None` when total utilisation is `>= 1`.
    pub l_star: Option<f64>,
    pub max_time: Option<u64>,
    pub checks: Vec<DemandCheck>,
    pub holds: bool,
}

/// `L*`, or `None` when `1 − U` is not positive.
pub fn l_star(tasks: &[Task]) -> Option<f64> {
    let u = total_utilization(tasks);
    if approx_le(1.0, u) {
        return None;
    }
    let weighted: f64 = tasks
        .iter()
        .map(|t| (t.period as f64 - t.deadline as f64) * t.utilization())
        .sum();
    Some(weighted / (1.0 - u))
}

/// `min(hyperperiod, max(max deadline, ceil(L*)))`.
pub fn max_time_slot(tasks: &[Task], hyperperiod: u64) -> Option<u64> {
    let l = l_star(tasks)?;
    let max_deadline = tasks.iter().map(|t| t.deadline).max().unwrap_or(0);
    let bound = (ceil_ratio(l, 1.0) as u64).max(max_deadline);
    Some(bound.min(hyperperiod))
}

/// `k · period + deadline`.
pub fn absolute_deadline(task: &Task, k: u64) -> u64 {
    task.period.saturating_mul(k).saturating_add(task.deadline)
}

/// Every absolute deadline `<= max_time`, sorted and deduplicated.
pub fn time_slots(tasks: &[Task], max_time: u64) -> Vec<u64> {
    let mut slots = BTreeSet::new();
    for task in tasks.iter().filter(|t| t.period > 0) {
        let mut k = 0;
        loop {
            let d = absolute_deadline(task, k);
            if d > max_time {
                break;
            }
            slots.insert(d);
            k += 1;
        }
    }
    slots.into_iter().collect()
}

/// Work `task` must complete inside `[t1, t2]`:
/// `max(0, floor((t2 + T − D) / T) − ceil(t1 / T)) · C`.
pub fn contribution(task: &Task, t1: u64, t2: u64) -> f64 {
    let p = i128::from(task.period);
    let completed = (i128::from(t2) + p - i128::from(task.deadline)).div_euclid(p);
    let released_before = (i128::from(t1) + p - 1).div_euclid(p);
    (completed - released_before).max(0) as f64 * task.compute_time
}

/// Processor demand of `tasks` in `[t1, t2]`.
///
/// # Errors
/// [`SchedulerError::DegenerateInput`] when `t1 > t2`.
pub fn demand(tasks: &[Task], t1: u64, t2: u64) -> Result<f64, SchedulerError> {
    if t1 > t2 {
        return Err(SchedulerError::DegenerateInput(
            "demand interval starts after it ends",
        ));
    }
    Ok(tasks.iter().map(|t| contribution(t, t1, t2)).sum())
}

/// `demand(0, t) <= t` at every check point, or `None` when `L*` is
/// undefined.
pub fn demand_table(tasks: &[Task], hyperperiod: u64) -> Option<Vec<DemandCheck>> {
    let max_time = max_time_slot(tasks, hyperperiod)?;
    let rows = time_slots(tasks, max_time)
        .into_iter()
        .map(|time| {
            let demand: f64 = tasks.iter().map(|t| contribution(t, 0, time)).sum();
            let holds = approx_le(demand, time as f64);
            debug!(time, demand, holds, "PDC check point");
            DemandCheck { time, demand, holds }
        })
        .collect();
    Some(rows)
}

/// Run the whole criterion.
pub fn analyze(tasks: &[Task], hyperperiod: u64) -> DemandAnalysis {
    let Some(checks) = demand_table(tasks, hyperperiod) else {
        debug!("PDC skipped: total utilisation >= 1, L* undefined");
        return DemandAnalysis {
            l_star: None,
            max_time: None,
            checks: Vec::new(),
            holds: false,
        };
    };
    let holds = checks.iter().all(|c| c.holds);
    DemandAnalysis {
        l_star: l_star(tasks),
        max_time: max_time_slot(tasks, hyperperiod),
        checks,
        holds,
    }
}

/// `true` if the criterion holds at every check point.
pub fn check(tasks: &[Task], hyperperiod: u64) -> bool {
    analyze(tasks, hyperperiod).holds
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(compute_time: f64, deadline: u64, period: u64) -> Task {
        Task {
            compute_time,
            deadline,
            period,
            ..Default::default()
        }
    }

    #[test]
    fn l_star_for_constrained_deadlines() {
        // (2·0.5 + 3·(2/6)) / (1 − 5/6) = 2 / (1/6) = 12
        let tasks = vec![make_task(2.0, 2, 4), make_task(2.0, 3, 6)];
        assert!((l_star(&tasks).unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(max_time_slot(&tasks, 12), Some(12));
        assert_eq!(max_time_slot(&tasks, 6), Some(6));
    }

    #[test]
    fn l_star_is_undefined_at_full_utilization() {
        let tasks = vec![make_task(2.0, 4, 4), make_task(3.0, 5, 6)];
        assert_eq!(l_star(&tasks), None);
        assert_eq!(demand_table(&tasks, 12), None);
        let a = analyze(&tasks, 12);
        assert!(!a.holds);
        assert!(a.checks.is_empty());
    }

    #[test]
    fn time_slots_are_sorted_absolute_deadlines() {
        let tasks = vec![make_task(1.0, 2, 4), make_task(1.0, 3, 6)];
        assert_eq!(time_slots(&tasks, 10), vec![2, 3, 6, 9, 10]);
    }

    #[test]
    fn contribution_counts_only_jobs_inside_the_window() {
        let t = make_task(2.0, 3, 5);
        // jobs with deadlines 3, 8, 13
        assert_eq!(contribution(&t, 0, 2), 0.0);
        assert_eq!(contribution(&t, 0, 3), 2.0);
        assert_eq!(contribution(&t, 0, 8), 4.0);
        // jobs released at 5 and 10 both fall inside [1, 13]
        assert_eq!(contribution(&t, 1, 13), 4.0);
        assert_eq!(contribution(&t, 6, 13), 2.0);
    }

    #[test]
    fn contribution_handles_deadline_past_window_plus_period() {
        let t = make_task(1.0, 20, 5);
        assert_eq!(contribution(&t, 0, 3), 0.0);
    }

    #[test]
    fn demand_rejects_inverted_interval() {
        let tasks = vec![make_task(1.0, 2, 4)];
        assert!(matches!(
            demand(&tasks, 5, 3),
            Err(SchedulerError::DegenerateInput(_))
        ));
        assert_eq!(demand(&tasks, 0, 6).unwrap(), 2.0);
    }

    #[test]
    fn feasible_constrained_set_holds() {
        let tasks = vec![make_task(1.0, 2, 4), make_task(2.0, 4, 6)];
        // L* = 2.8, but the largest deadline (4) is later
        let a = analyze(&tasks, 12);
        assert_eq!(a.max_time, Some(4));
        let times: Vec<u64> = a.checks.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![2, 4]);
        assert!(a.holds);
    }

    #[test]
    fn negative_l_star_still_checks_up_to_the_largest_deadline() {
        // D > T on the third task drives L* to -41.75
        let tasks = vec![make_task(2.0, 2, 4), make_task(1.0, 2, 100), make_task(0.5, 50, 2)];
        assert!(l_star(&tasks).unwrap() < 0.0);
        assert_eq!(max_time_slot(&tasks, 100), Some(50));

        // demand(0, 2) = 2 + 1 = 3 > 2
        let a = analyze(&tasks, 100);
        assert!(!a.holds);
        assert_eq!(a.checks[0].time, 2);
        assert!(!a.checks[0].holds);
    }

    #[test]
    fn overloaded_window_fails() {
        // demand(0, 3) = 2 + 2 = 4 > 3
        let tasks = vec![make_task(2.0, 2, 4), make_task(2.0, 3, 6)];
        let a = analyze(&tasks, 12);
        assert!(!a.holds);
        let failing: Vec<u64> = a.checks.iter().filter(|c| !c.holds).map(|c| c.time).collect();
        assert!(failing.contains(&3));
        assert!(!check(&tasks, 12));
    }
}
