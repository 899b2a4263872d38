/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Response-Time Analysis for fixed-priority preemptive scheduling.
//!
//! For task `i` with higher-priority set `H(i)` (numerically greater
//! `priority`):
//!
//! ```text
//! W(0)   = 0
//! W(k+1) = C(i) + Σ_{j ∈ H(i)} ceil(W(k) / T(j)) · C(j)
//! ```
//!
//! iterated until `W(k+1) == W(k)`.  Task `i` meets its deadline iff the
//! fixed point is `<= D(i)`.  The iterates never decrease, so the
//! schedulability checks stop as soon as one passes `D(i)`.  Otherwise the
//! iteration count is capped and hitting the cap is reported as
//! [`SchedulerError::NonConvergentAnalysis`].

use serde::Serialize;
use tracing::debug;

use super::{approx_eq, approx_le, ceil_ratio};
use crate::scheduler::SchedulerError;
use crate::task::Task;

/// Default cap on fixed-point iterations per task.
pub const DEFAULT_RTA_ITERATION_LIMIT: usize = 10_000;

/// Every iterate of one task's response-time computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseTimeTrace {
    pub task_id: u32,

    /// `W(1) .. W(k)`; the last entry is the fixed point, or the first
    /// iterate past the deadline for a deadline-bounded trace.
    pub iterations: Vec<f64>,

    pub response_time: f64,
    pub deadline: u64,
    pub schedulable: bool,
}

/// Tasks that preempt `task`.
pub fn higher_priority_tasks<'a>(task: &'a Task, tasks: &'a [Task]) -> impl Iterator<Item = &'a Task> {
    tasks.iter().filter(move |t| t.outranks(task))
}

/// `Σ_{j ∈ H(i)} ceil(w / T(j)) · C(j)`.
pub fn interference(task: &Task, tasks: &[Task], w: f64) -> f64 {
    if w == 0.0 {
        return 0.0;
    }
    higher_priority_tasks(task, tasks)
        .map(|t| ceil_ratio(w, t.period as f64) * t.compute_time)
        .sum()
}

/// Run the fixed-point iteration for `task` and keep every iterate.
///
/// Iterates to the fixed point even when it lies past the deadline.
pub fn response_time_trace(
    task: &Task,
    tasks: &[Task],
    max_iterations: usize,
) -> Result<ResponseTimeTrace, SchedulerError> {
    iterate(task, tasks, max_iterations, false)
}

/// Like [`response_time_trace`] but stops at the first iterate past the
/// deadline.
///
/// That iterate is a lower bound on the response time, so the trace is
/// reported unschedulable with it as `response_time`.
pub fn deadline_bounded_trace(
    task: &Task,
    tasks: &[Task],
    max_iterations: usize,
) -> Result<ResponseTimeTrace, SchedulerError> {
    iterate(task, tasks, max_iterations, true)
}

fn iterate(
    task: &Task,
    tasks: &[Task],
    max_iterations: usize,
    stop_past_deadline: bool,
) -> Result<ResponseTimeTrace, SchedulerError> {
    let deadline = task.deadline as f64;
    let mut w = 0.0;
    let mut iterations = Vec::new();

    for _ in 0..max_iterations {
        let next = task.compute_time + interference(task, tasks, w);
        if approx_eq(next, w) {
            let schedulable = approx_le(w, deadline);
            debug!(
                task_id = task.task_id,
                response_time = w,
                deadline = task.deadline,
                steps = iterations.len(),
                schedulable,
                "RTA converged"
            );
            return Ok(ResponseTimeTrace {
                task_id: task.task_id,
                iterations,
                response_time: w,
                deadline: task.deadline,
                schedulable,
            });
        }
        iterations.push(next);
        w = next;

        if stop_past_deadline && !approx_le(w, deadline) {
            debug!(
                task_id = task.task_id,
                iterate = w,
                deadline = task.deadline,
                steps = iterations.len(),
                "RTA passed the deadline"
            );
            return Ok(ResponseTimeTrace {
                task_id: task.task_id,
                iterations,
                response_time: w,
                deadline: task.deadline,
                schedulable: false,
            });
        }
    }

    Err(SchedulerError::NonConvergentAnalysis {
        task_id: task.task_id,
        iterations: max_iterations,
    })
}

/// Worst-case response time of `task` among `tasks`.
pub fn response_time(task: &Task, tasks: &[Task], max_iterations: usize) -> Result<f64, SchedulerError> {
    response_time_trace(task, tasks, max_iterations).map(|t| t.response_time)
}

/// `true` if `task`'s worst-case response time fits its deadline.
pub fn check_task_response_time(
    task: &Task,
    tasks: &[Task],
    max_iterations: usize,
) -> Result<bool, SchedulerError> {
    deadline_bounded_trace(task, tasks, max_iterations).map(|t| t.schedulable)
}

/// `true` if every task passes [`check_task_response_time`].
///
/// Stops at the first failing task.  Only a task still within its deadline
/// when the cap is hit yields [`SchedulerError::NonConvergentAnalysis`].
pub fn check_response_time(tasks: &[Task], max_iterations: usize) -> Result<bool, SchedulerError> {
    for task in tasks {
        if !check_task_response_time(task, tasks, max_iterations)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Deadline-bounded traces for every task, in slice order.
pub fn response_times(tasks: &[Task], max_iterations: usize) -> Result<Vec<ResponseTimeTrace>, SchedulerError> {
    tasks
        .iter()
        .map(|t| deadline_bounded_trace(t, tasks, max_iterations))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
