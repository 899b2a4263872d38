/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Rate Monotonic and Deadline Monotonic priority assignment and tests.
//!
//! Both policies sort the set by a static key and hand out priorities
//! `N, N-1, .., 1` in that order, so the shortest period (RM) or the
//! shortest deadline (DM) ends up numerically highest.

use tracing::debug;

use super::feasibility::{check_hyperbolic, check_liu_layland};
use crate::analysis::rta;
use crate::scheduler::{Condition, SchedulerError};
use crate::task::Task;

/// Sort by ascending period and assign `priority = N − index`.
pub fn assign_rate_monotonic(tasks: &mut [Task]) {
    assign_by_key(tasks, |t| t.period);
}

/// Sort by ascending deadline and assign `priority = N − index`.
pub fn assign_deadline_monotonic(tasks: &mut [Task]) {
    assign_by_key(tasks, |t| t.deadline);
}

fn assign_by_key(tasks: &mut [Task], key: impl Fn(&Task) -> u64) {
    tasks.sort_by_key(|t| key(t));
    let n = tasks.len();
    for (index, task) in tasks.iter_mut().enumerate() {
        task.priority = i32::try_from(n - index).unwrap_or(i32::MAX);
        debug!(task_id = task.task_id, priority = task.priority, "priority assigned");
    }
}

/// Liu & Layland, hyperbolic bound, and exact response-time analysis.
pub fn rate_monotonic_conditions(tasks: &[Task], max_iterations: usize) -> Result<Vec<Condition>, SchedulerError> {
    Ok(vec![
        Condition::new("liu_layland_bound", check_liu_layland(tasks)),
        Condition::new("hyperbolic_bound", check_hyperbolic(tasks)),
        Condition::new("response_time_analysis", rta::check_response_time(tasks, max_iterations)?),
    ])
}

/// Both closed-form bounds together suffice; otherwise RTA decides.
pub fn rate_monotonic_is_schedulable(tasks: &[Task], max_iterations: usize) -> Result<bool, SchedulerError> {
    if check_liu_layland(tasks) && check_hyperbolic(tasks) {
        debug!("both sufficient bounds hold, skipping response-time analysis");
        return Ok(true);
    }
    rta::check_response_time(tasks, max_iterations)
}

/// Deadline Monotonic relies on response-time analysis alone.
pub fn deadline_monotonic_conditions(tasks: &[Task], max_iterations: usize) -> Result<Vec<Condition>, SchedulerError> {
    Ok(vec![Condition::new(
        "response_time_analysis",
        rta::check_response_time(tasks, max_iterations)?,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rta::DEFAULT_RTA_ITERATION_LIMIT;

    fn make_task(task_id: u32, compute_time: f64, deadline: u64, period: u64) -> Task {
        Task {
            compute_time,
            deadline,
            period,
            task_id,
            priority: 0,
        }
    }

    #[test]
    fn rate_monotonic_gives_shortest_period_highest_priority() {
        let mut tasks = vec![make_task(3, 3.0, 12, 12), make_task(1, 1.0, 4, 4), make_task(2, 2.0, 6, 6)];
        assign_rate_monotonic(&mut tasks);
        let got: Vec<(u32, i32)> = tasks.iter().map(|t| (t.task_id, t.priority)).collect();
        assert_eq!(got, vec![(1, 3), (2, 2), (3, 1)]);
    }

    #[test]
    fn deadline_monotonic_sorts_on_deadline_not_period() {
        let mut tasks = vec![make_task(1, 1.0, 9, 5), make_task(2, 1.0, 3, 10)];
        assign_deadline_monotonic(&mut tasks);
        assert_eq!(tasks[0].task_id, 2);
        assert_eq!(tasks[0].priority, 2);
        assert_eq!(tasks[1].priority, 1);
    }

    #[test]
    fn rta_rescues_set_that_fails_both_bounds() {
        let mut tasks = vec![make_task(1, 1.0, 4, 4), make_task(2, 2.0, 6, 6), make_task(3, 3.0, 12, 12)];
        assign_rate_monotonic(&mut tasks);
        let c = rate_monotonic_conditions(&tasks, DEFAULT_RTA_ITERATION_LIMIT).unwrap();
        let holds: Vec<bool> = c.iter().map(|c| c.holds).collect();
        assert_eq!(holds, vec![false, false, true]);
        assert!(rate_monotonic_is_schedulable(&tasks, DEFAULT_RTA_ITERATION_LIMIT).unwrap());
    }

    #[test]
    fn deadline_monotonic_rejects_tight_deadline() {
        let mut tasks = vec![make_task(1, 2.0, 2, 4), make_task(2, 2.0, 3, 6)];
        assign_deadline_monotonic(&mut tasks);
        let c = deadline_monotonic_conditions(&tasks, DEFAULT_RTA_ITERATION_LIMIT).unwrap();
        assert!(!c[0].holds);
    }
}
