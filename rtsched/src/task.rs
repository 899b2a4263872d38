/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the schedulability engine.
//!
//! ```text
//! workload row ──(Task::from_record)──►  Task  ──(Scheduler::new)──►  owned, sorted copy
//!                                         ↑ caller-owned                ↑ priorities reassigned
//! ```
//!
//! # Ownership model
//! `Task` values are **owned by the caller**.  A [`Scheduler`] clones the
//! slice it is given, so the caller's ordering and `priority` fields are never
//! touched by Rate Monotonic / Deadline Monotonic priority assignment.
//!
//! # Priority convention
//! A numerically **larger** `priority` is scheduled **first**.  Comparing two
//! tasks with [`Task::cmp_priority`] is ascending, so the highest-priority
//! task sorts last under that raw comparison.
//!
//! [`Scheduler`]: crate::scheduler::Scheduler

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerError;

/// Number of fields accepted in one workload row: `compute_time`,
/// `deadline`, `period`, `priority`, `task_id`.
pub const VALID_RECORD_LENGTHS: std::ops::RangeInclusive<usize> = 2..=5;

// ── Task ──────────────────────────────────────────────────────────────────────

/// A periodic unit of work.
///
/// `deadline` is relative to each release; releases happen at every integer
/// multiple of `period` starting at time `0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    /// Worst-case execution time.  The only non-integer timing input.
    pub compute_time: f64,

    /// Relative deadline in ticks.
    pub deadline: u64,

    /// Release period in ticks.
    pub period: u64,

    /// Identifier, unique within one task set.
    pub task_id: u32,

    /// Larger value = scheduled first.
    pub priority: i32,
}

impl Task {
    /// Build a validated task.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidTaskConfiguration`] if any timing field is
    /// not strictly positive.
    pub fn new(
        compute_time: f64,
        deadline: u64,
        period: u64,
        task_id: u32,
        priority: i32,
    ) -> Result<Self, SchedulerError> {
        let task = Self {
            compute_time,
            deadline,
            period,
            task_id,
            priority,
        };
        task.validate()?;
        Ok(task)
    }

    /// Check the timing fields of an already-built task.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if !self.compute_time.is_finite() || self.compute_time <= 0.0 {
            return Err(SchedulerError::invalid(format!(
                "task {}: compute_time must be a positive number, got {}",
                self.task_id, self.compute_time
            )));
        }
        if self.deadline == 0 {
            return Err(SchedulerError::invalid(format!(
                "task {}: deadline must be positive",
                self.task_id
            )));
        }
        if self.period == 0 {
            return Err(SchedulerError::invalid(format!(
                "task {}: period must be positive",
                self.task_id
            )));
        }
        Ok(())
    }

    /// Parse one workload row.
    ///
    /// Columns, in order: `compute_time`, `deadline`, `period` (defaults to
    /// `deadline`), `priority` (defaults to `0`), `task_id` (defaults to the
    /// 1-based `position` of the row).
    ///
    /// # Errors
    /// [`SchedulerError::InvalidTaskConfiguration`] when the row has fewer
    /// than 2 or more than 5 columns, when an integer column holds a
    /// fractional or out-of-range value, or when the resulting task fails
    /// [`validate`](Self::validate).
    pub fn from_record(row: &[f64], position: usize) -> Result<Self, SchedulerError> {
        if !VALID_RECORD_LENGTHS.contains(&row.len()) {
            return Err(SchedulerError::invalid(format!(
                "row {position}: expected 2 to 5 columns, got {}",
                row.len()
            )));
        }

        let compute_time = row[0];
        let deadline = integral_column(row[1], "deadline", position, 0.0, u64::MAX as f64)? as u64;
        let period = match row.get(2) {
            Some(&v) => integral_column(v, "period", position, 0.0, u64::MAX as f64)? as u64,
            None => deadline,
        };
        let priority = match row.get(3) {
            Some(&v) => {
                integral_column(v, "priority", position, i32::MIN as f64, i32::MAX as f64)? as i32
            }
            None => 0,
        };
        let task_id = match row.get(4) {
            Some(&v) => integral_column(v, "task_id", position, 0.0, u32::MAX as f64)? as u32,
            None => u32::try_from(position).map_err(|_| {
                SchedulerError::invalid(format!("row {position}: position does not fit a task id"))
            })?,
        };

        Self::new(compute_time, deadline, period, task_id, priority)
    }

    /// Processor share: `compute_time / period`.
    pub fn utilization(&self) -> f64 {
        self.compute_time / self.period as f64
    }

    /// `true` when the deadline equals the period.
    pub fn has_implicit_deadline(&self) -> bool {
        self.deadline == self.period
    }

    /// Ascending comparison on `priority`.
    ///
    /// Under this ordering the task that is *scheduled first* compares
    /// greatest.  Callers that want highest-priority-first must reverse it.
    pub fn cmp_priority(&self, other: &Task) -> Ordering {
        self.priority.cmp(&other.priority)
    }

    /// `true` if `self` preempts `other` under fixed-priority dispatch.
    pub fn outranks(&self, other: &Task) -> bool {
        self.priority > other.priority
    }
}

/// Validate one integer-valued column of a workload row.
fn integral_column(
    value: f64,
    field: &str,
    position: usize,
    min: f64,
    max: f64,
) -> Result<f64, SchedulerError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(SchedulerError::invalid(format!(
            "row {position}: {field} must be an integer, got {value}"
        )));
    }
    if value < min || value > max {
        return Err(SchedulerError::invalid(format!(
            "row {position}: {field} {value} is out of range"
        )));
    }
    Ok(value)
}

// ── AperiodicTask ─────────────────────────────────────────────────────────────

/// A task with a one-off arrival instant.
///
/// Modelled for workloads that carry arrival data; none of the current
/// policies consume `arrival_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AperiodicTask {
    pub task: Task,
    pub arrival_time: f64,
}

impl AperiodicTask {
    pub fn new(task: Task, arrival_time: f64) -> Result<Self, SchedulerError> {
        task.validate()?;
        if !arrival_time.is_finite() || arrival_time < 0.0 {
            return Err(SchedulerError::invalid(format!(
                "task {}: arrival_time must be non-negative, got {arrival_time}",
                task.task_id
            )));
        }
        Ok(Self { task, arrival_time })
    }

    /// Absolute deadline of the single job.
    pub fn absolute_deadline(&self) -> f64 {
        self.arrival_time + self.task.deadline as f64
    }
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
            task_id: 1,
            priority: 0,
        }
    }

    // ── Task ──────────────────────────────────────────────────────────────────

    #[test]
    fn task_utilization_is_correct() {
        let task = make_task(1.0, 4, 4);
        assert!((task.utilization() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn new_rejects_non_positive_fields() {
        assert!(Task::new(0.0, 4, 4, 1, 0).is_err());
        assert!(Task::new(-1.0, 4, 4, 1, 0).is_err());
        assert!(Task::new(f64::NAN, 4, 4, 1, 0).is_err());
        assert!(Task::new(1.0, 0, 4, 1, 0).is_err());
        assert!(Task::new(1.0, 4, 0, 1, 0).is_err());
        assert!(Task::new(1.0, 4, 4, 1, 0).is_ok());
    }

    #[test]
    fn invalid_task_reports_configuration_error() {
        let err = Task::new(1.0, 4, 0, 9, 0).unwrap_err();
        assert!(
            matches!(err, SchedulerError::InvalidTaskConfiguration { .. }),
            "got {err}"
        );
        assert!(err.to_string().contains("task 9"));
    }

    #[test]
    fn implicit_deadline_detection() {
        assert!(make_task(1.0, 4, 4).has_implicit_deadline());
        assert!(!make_task(1.0, 3, 4).has_implicit_deadline());
    }

    #[test]
    fn cmp_priority_is_ascending() {
        let low = Task { priority: 1, ..make_task(1.0, 4, 4) };
        let high = Task { priority: 3, ..make_task(1.0, 4, 4) };
        assert_eq!(low.cmp_priority(&high), Ordering::Less);

        let mut v = vec![high.clone(), low.clone()];
        v.sort_by(Task::cmp_priority);
        // the task scheduled first ends up last
        assert_eq!(v.last().unwrap().priority, 3);
        assert!(high.outranks(&low));
        assert!(!low.outranks(&high));
    }

    // ── from_record ───────────────────────────────────────────────────────────

    #[test]
    fn from_record_two_columns_defaults_period_priority_and_id() {
        let task = Task::from_record(&[2.5, 10.0], 3).unwrap();
        assert_eq!(task.compute_time, 2.5);
        assert_eq!(task.deadline, 10);
        assert_eq!(task.period, 10);
        assert_eq!(task.priority, 0);
        assert_eq!(task.task_id, 3);
    }

    #[test]
    fn from_record_five_columns_uses_every_field() {
        let task = Task::from_record(&[1.0, 5.0, 10.0, 2.0, 42.0], 1).unwrap();
        assert_eq!(task.deadline, 5);
        assert_eq!(task.period, 10);
        assert_eq!(task.priority, 2);
        assert_eq!(task.task_id, 42);
    }

    #[test]
    fn from_record_rejects_wrong_column_count() {
        for row in [&[1.0][..], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0][..], &[][..]] {
            let err = Task::from_record(row, 1).unwrap_err();
            assert!(matches!(err, SchedulerError::InvalidTaskConfiguration { .. }));
        }
    }

    #[test]
    fn from_record_rejects_fractional_integer_columns() {
        assert!(Task::from_record(&[1.0, 4.5], 1).is_err());
        assert!(Task::from_record(&[1.0, 4.0, 4.0, 0.5], 1).is_err());
        assert!(Task::from_record(&[1.0, 4.0, 4.0, 0.0, -1.0], 1).is_err());
    }

    #[test]
    fn from_record_rejects_zero_deadline() {
        assert!(Task::from_record(&[1.0, 0.0], 1).is_err());
    }

    // ── AperiodicTask ─────────────────────────────────────────────────────────

    #[test]
    fn aperiodic_task_absolute_deadline() {
        let t = AperiodicTask::new(make_task(1.0, 5, 10), 2.0).unwrap();
        assert_eq!(t.absolute_deadline(), 7.0);
    }

    #[test]
    fn aperiodic_task_rejects_negative_arrival() {
        assert!(AperiodicTask::new(make_task(1.0, 5, 10), -1.0).is_err());
    }
}
