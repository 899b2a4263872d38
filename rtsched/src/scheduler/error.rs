/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the schedulability engine.
//!
//! Two kinds of failure are kept apart:
//!
//! * [`SchedulerError`] - structural or programmer errors (bad task data,
//!   unknown id, empty set, runaway analysis).  Surfaced immediately.
//! * [`Infeasibility`] - *why* a task set could not be scheduled.  This is a
//!   normal result carried inside a [`Scheduling`](crate::event::Scheduling)
//!   with `events = None`, never an error path.

use serde::Serialize;
use thiserror::Error;

use crate::hyperperiod::HyperperiodError;

// ── Infeasibility (a value, not an error) ─────────────────────────────────────

/// Reason attached to a `Scheduling` whose `events` are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Infeasibility {
    /// The policy's feasibility test rejected the task set.
    ConditionsNotMet,

    /// The cyclic greedy frame packing found no frame for one release even
    /// though both cyclic conditions held.  Says nothing about whether some
    /// other packing exists.
    FrameAssignmentDeadEnd { task_id: u32, release: u64 },

    /// A job in the simulated timeline completed after its absolute
    /// deadline.
    DeadlineMiss {
        task_id: u32,
        release: u64,
        completion: f64,
    },
}

impl std::fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Infeasibility::ConditionsNotMet => {
                write!(f, "feasibility conditions are not met")
            }
            Infeasibility::FrameAssignmentDeadEnd { task_id, release } => write!(
                f,
                "no frame can host task {task_id} released at {release}"
            ),
            Infeasibility::DeadlineMiss {
                task_id,
                release,
                completion,
            } => write!(
                f,
                "task {task_id} released at {release} completes at {completion}, past its deadline"
            ),
        }
    }
}

// ── Top-level errors ──────────────────────────────────────────────────────────

/// Error type returned by every fallible engine operation.
///
/// | Variant | Raised by |
/// |---|---|
/// | `InvalidTaskConfiguration` | task validation, row parsing, event invariant |
/// | `TaskNotFound` | `Scheduler::get_task` |
/// | `DegenerateInput` | empty task set, inverted demand interval |
/// | `NonConvergentAnalysis` | response-time iteration cap |
/// | `HyperperiodTooLarge` / `HyperperiodOverflow` | hyperperiod guard |
/// | `UnknownPolicy` | `Policy::from_str` |
#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    /// Non-positive timing field, malformed workload row, duplicate id or a
    /// preemption that breaks an event's deadline invariant.
    #[error("invalid task configuration: {reason}")]
    InvalidTaskConfiguration { reason: String },

    /// `get_task` was asked for an id that is not in the set.
    #[error("task with id {0} not found")]
    TaskNotFound(u32),

    /// The input makes the requested quantity undefined.
    #[error("degenerate input: {0}")]
    DegenerateInput(&'static str),

    /// Response-time iteration for a task hit the iteration cap without
    /// reaching a fixed point.
    #[error("response-time analysis for task {task_id} did not converge after {iterations} iterations")]
    NonConvergentAnalysis { task_id: u32, iterations: usize },

    /// The hyperperiod exceeds the configured ceiling.
    #[error("hyperperiod {value} exceeds the configured limit {limit}")]
    HyperperiodTooLarge { value: u64, limit: u64 },

    /// LCM of the periods does not fit in `u64`.
    #[error("hyperperiod overflow computing lcm({a}, {b})")]
    HyperperiodOverflow { a: u64, b: u64 },

    /// The policy name is not recognised.
    #[error("unknown scheduling policy: '{0}' (valid: cyclic, rate_monotonic, deadline_monotonic, earliest_deadline_first)")]
    UnknownPolicy(String),
}

impl SchedulerError {
    /// Shorthand for [`SchedulerError::InvalidTaskConfiguration`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        SchedulerError::InvalidTaskConfiguration {
            reason: reason.into(),
        }
    }
}

impl From<HyperperiodError> for SchedulerError {
    fn from(e: HyperperiodError) -> Self {
        match e {
            HyperperiodError::NoValidPeriods => {
                SchedulerError::DegenerateInput("no tasks with a positive period")
            }
            HyperperiodError::Overflow { a, b } => SchedulerError::HyperperiodOverflow { a, b },
            HyperperiodError::TooLarge { value, limit } => {
                SchedulerError::HyperperiodTooLarge { value, limit }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyperperiod_errors_map_to_scheduler_errors() {
        assert!(matches!(
            SchedulerError::from(HyperperiodError::NoValidPeriods),
            SchedulerError::DegenerateInput(_)
        ));
        assert_eq!(
            SchedulerError::from(HyperperiodError::TooLarge { value: 20, limit: 10 }),
            SchedulerError::HyperperiodTooLarge { value: 20, limit: 10 }
        );
        assert_eq!(
            SchedulerError::from(HyperperiodError::Overflow { a: 3, b: 5 }),
            SchedulerError::HyperperiodOverflow { a: 3, b: 5 }
        );
    }

    #[test]
    fn infeasibility_display_names_the_task() {
        let r = Infeasibility::FrameAssignmentDeadEnd {
            task_id: 4,
            release: 12,
        };
        assert!(r.to_string().contains("task 4"));
    }
}
