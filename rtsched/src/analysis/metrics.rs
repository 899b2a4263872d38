//! Pure functions over a task collection.

use crate::hyperperiod;
use crate::scheduler::SchedulerError;
use crate::task::Task;

const EMPTY: &str = "task set is empty";

/// `Σ compute_time / period`.  `0.0` for an empty set.
pub fn total_utilization(tasks: &[Task]) -> f64 {
    tasks.iter().map(Task::utilization).sum()
}

/// LCM of all periods, without a size ceiling.
pub fn hyperperiod(tasks: &[Task]) -> Result<u64, SchedulerError> {
    Ok(hyperperiod::hyperperiod(tasks)?)
}

pub fn min_deadline(tasks: &[Task]) -> Result<u64, SchedulerError> {
    tasks.iter().map(|t| t.deadline).min().ok_or(SchedulerError::DegenerateInput(EMPTY))
}

pub fn max_deadline(tasks: &[Task]) -> Result<u64, SchedulerError> {
    tasks.iter().map(|t| t.deadline).max().ok_or(SchedulerError::DegenerateInput(EMPTY))
}

pub fn min_period(tasks: &[Task]) -> Result<u64, SchedulerError> {
    tasks.iter().map(|t| t.period).min().ok_or(SchedulerError::DegenerateInput(EMPTY))
}

pub fn max_period(tasks: &[Task]) -> Result<u64, SchedulerError> {
    tasks.iter().map(|t| t.period).max().ok_or(SchedulerError::DegenerateInput(EMPTY))
}

pub fn min_compute_time(tasks: &[Task]) -> Result<f64, SchedulerError> {
    tasks
        .iter()
        .map(|t| t.compute_time)
        .reduce(f64::min)
        .ok_or(SchedulerError::DegenerateInput(EMPTY))
}

pub fn max_compute_time(tasks: &[Task]) -> Result<f64, SchedulerError> {
    tasks
        .iter()
        .map(|t| t.compute_time)
        .reduce(f64::max)
        .ok_or(SchedulerError::DegenerateInput(EMPTY))
}

/// Task scheduled first under the larger-is-higher convention.  Ties go to
/// the later task in the slice.
pub fn max_priority_task(tasks: &[Task]) -> Result<&Task, SchedulerError> {
    tasks
        .iter()
        .max_by(|a, b| a.cmp_priority(b))
        .ok_or(SchedulerError::DegenerateInput(EMPTY))
}

/// Task scheduled last.  Ties go to the earlier task in the slice.
pub fn min_priority_task(tasks: &[Task]) -> Result<&Task, SchedulerError> {
    tasks
        .iter()
        .min_by(|a, b| a.cmp_priority(b))
        .ok_or(SchedulerError::DegenerateInput(EMPTY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_tasks() -> Vec<Task> {
        vec![
            Task { compute_time: 1.0, deadline: 4, period: 4, task_id: 1, priority: 3 },
            Task { compute_time: 2.0, deadline: 5, period: 6, task_id: 2, priority: 1 },
            Task { compute_time: 3.5, deadline: 12, period: 12, task_id: 3, priority: 2 },
        ]
    }

    #[test]
    fn utilization_sums_per_task_shares() {
        let u = total_utilization(&three_tasks());
        assert!((u - (0.25 + 2.0 / 6.0 + 3.5 / 12.0)).abs() < 1e-12);
        assert_eq!(total_utilization(&[]), 0.0);
    }

    #[test]
    fn min_max_accessors() {
        let tasks = three_tasks();
        assert_eq!(min_deadline(&tasks).unwrap(), 4);
        assert_eq!(max_deadline(&tasks).unwrap(), 12);
        assert_eq!(min_period(&tasks).unwrap(), 4);
        assert_eq!(max_period(&tasks).unwrap(), 12);
        assert_eq!(min_compute_time(&tasks).unwrap(), 1.0);
        assert_eq!(max_compute_time(&tasks).unwrap(), 3.5);
        assert_eq!(hyperperiod(&tasks).unwrap(), 12);
    }

    #[test]
    fn priority_extremes() {
        let tasks = three_tasks();
        assert_eq!(max_priority_task(&tasks).unwrap().task_id, 1);
        assert_eq!(min_priority_task(&tasks).unwrap().task_id, 2);
    }

    #[test]
    fn empty_set_is_degenerate() {
        assert!(matches!(min_deadline(&[]), Err(SchedulerError::DegenerateInput(_))));
        assert!(matches!(max_compute_time(&[]), Err(SchedulerError::DegenerateInput(_))));
        assert!(matches!(max_priority_task(&[]), Err(SchedulerError::DegenerateInput(_))));
        assert!(matches!(hyperperiod(&[]), Err(SchedulerError::DegenerateInput(_))));
    }
}
