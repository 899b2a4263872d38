/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Earliest Deadline First feasibility.

use crate::analysis::metrics::total_utilization;
use crate::analysis::{approx_le, pdc};
use crate::scheduler::Condition;
use crate::task::Task;

/// Implicit deadlines everywhere and `U <= 1`.
pub fn implicit_deadline_condition(tasks: &[Task]) -> bool {
    tasks.iter().all(Task::has_implicit_deadline) && approx_le(total_utilization(tasks), 1.0)
}

/// Processor-demand criterion over `[0, min(H, L*)]`.
pub fn processor_demand_condition(tasks: &[Task], hyperperiod: u64) -> bool {
    pdc::check(tasks, hyperperiod)
}

pub fn conditions(tasks: &[Task], hyperperiod: u64) -> Vec<Condition> {
    vec![
        Condition::new("implicit_deadlines_within_one", implicit_deadline_condition(tasks)),
        Condition::new("processor_demand", processor_demand_condition(tasks, hyperperiod)),
    ]
}

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
    fn implicit_set_at_point_eight_passes_condition_one() {
        let tasks = vec![make_task(4.0, 10, 10), make_task(8.0, 20, 20)];
        assert!(implicit_deadline_condition(&tasks));
    }

    #[test]
    fn constrained_deadline_needs_the_demand_test() {
        let tasks = vec![make_task(1.0, 2, 4), make_task(2.0, 4, 6)];
        assert!(!implicit_deadline_condition(&tasks));
        assert!(processor_demand_condition(&tasks, 12));
    }

    #[test]
    fn full_utilization_passes_condition_one_and_fails_demand_safely() {
        let tasks = vec![make_task(2.0, 4, 4), make_task(3.0, 6, 6)];
        let c = conditions(&tasks, 12);
        assert!(c[0].holds);
        assert!(!c[1].holds);
    }
}
