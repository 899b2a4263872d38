//! Uniprocessor scheduler for periodic task sets.
//!
//! [`Scheduler`] holds an owned, policy-ordered copy of a task set and answers
//! two questions about it: *can* this policy meet every deadline
//! ([`is_schedulable`](Scheduler::is_schedulable)), and *what* does one
//! hyperperiod of execution look like ([`get_scheduling`](Scheduler::get_scheduling)).
//!
//! # Policies
//!
//! | Policy | Ordering | Schedulable iff |
//! |---|---|---|
//! | `Cyclic` | ascending period | `U <= 1` and a valid frame size exists |
//! | `RateMonotonic` | ascending period, `priority = N − i` | both closed-form bounds, else RTA |
//! | `DeadlineMonotonic` | ascending deadline, `priority = N − i` | RTA |
//! | `EarliestDeadlineFirst` | as given | implicit deadlines and `U <= 1`, else PDC |
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Policy dispatch | closed `Policy` enum, one `match` per operation |
//! | Caller's tasks | cloned at construction; sorting and priority assignment never leak out |
//! | Infeasible set | `Ok(Scheduling::infeasible(..))`, never `Err` |
//! | Runaway input | `max_hyperperiod` / `max_rta_iterations` in [`AnalysisLimits`] |
//!
//! # Example
//! ```rust,ignore
//! let scheduler = Scheduler::new(Policy::RateMonotonic, &tasks)?;
//! if scheduler.is_schedulable()? {
//!     let timeline = scheduler.get_scheduling()?;
//! }
//! ```

pub mod cyclic;
pub mod edf;
pub mod error;
pub mod feasibility;
pub mod fixed_priority;
pub mod timeline;

pub use error::{Infeasibility, SchedulerError};

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::pdc::{self, DemandAnalysis};
use crate::analysis::rta::{self, ResponseTimeTrace, DEFAULT_RTA_ITERATION_LIMIT};
use crate::analysis::{metrics, secondary_period};
use crate::event::Scheduling;
use crate::hyperperiod::{self, HyperperiodInfo, DEFAULT_HYPERPERIOD_LIMIT};
use crate::task::Task;

use feasibility::{hyperbolic_product, liu_layland_bound};
use timeline::Dispatch;

// ── Policy ────────────────────────────────────────────────────────────────────

/// The four supported scheduling policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Cyclic,
    RateMonotonic,
    DeadlineMonotonic,
    EarliestDeadlineFirst,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::Cyclic,
        Policy::RateMonotonic,
        Policy::DeadlineMonotonic,
        Policy::EarliestDeadlineFirst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Policy::Cyclic => "cyclic",
            Policy::RateMonotonic => "rate_monotonic",
            Policy::DeadlineMonotonic => "deadline_monotonic",
            Policy::EarliestDeadlineFirst => "earliest_deadline_first",
        }
    }

    /// RM and DM.
    pub fn is_fixed_priority(self) -> bool {
        matches!(self, Policy::RateMonotonic | Policy::DeadlineMonotonic)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cyclic" => Ok(Policy::Cyclic),
            "rate_monotonic" | "rm" => Ok(Policy::RateMonotonic),
            "deadline_monotonic" | "dm" => Ok(Policy::DeadlineMonotonic),
            "earliest_deadline_first" | "edf" => Ok(Policy::EarliestDeadlineFirst),
            _ => Err(SchedulerError::UnknownPolicy(s.to_string())),
        }
    }
}

// ── Limits ────────────────────────────────────────────────────────────────────

/// Ceilings that keep analysis of pathological sets bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisLimits {
    /// Largest hyperperiod (ticks) for which a timeline or demand table is
    /// built.
    pub max_hyperperiod: u64,

    /// Fixed-point iterations allowed per task in response-time analysis.
    pub max_rta_iterations: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_hyperperiod: DEFAULT_HYPERPERIOD_LIMIT,
            max_rta_iterations: DEFAULT_RTA_ITERATION_LIMIT,
        }
    }
}

// ── Report types ──────────────────────────────────────────────────────────────

/// One named feasibility condition and whether it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub name: &'static str,
    pub holds: bool,
}

impl Condition {
    pub fn new(name: &'static str, holds: bool) -> Self {
        Self { name, holds }
    }
}

/// Everything the analysis of one task set produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub policy: Policy,
    pub task_count: usize,
    pub total_utilization: f64,
    pub utilization_bound: f64,
    pub hyperperiod: HyperperiodInfo,
    pub tasks: Vec<Task>,
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperbolic_product: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_times: Option<Vec<ResponseTimeTrace>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_sizes: Option<Vec<u64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand: Option<DemandAnalysis>,

    pub schedulable: bool,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// A task set bound to one policy.
///
/// Stateless after construction: every query recomputes from the held tasks,
/// so a `Scheduler` is `Send + Sync` and can be shared freely.
#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: Policy,
    tasks: Vec<Task>,
    limits: AnalysisLimits,
}

impl Scheduler {
    /// Clone `tasks`, then sort and assign priorities as `policy` requires.
    ///
    /// # Errors
    /// * [`SchedulerError::DegenerateInput`] for an empty set.
    /// * [`SchedulerError::InvalidTaskConfiguration`] for a task with a
    ///   non-positive timing field or a repeated `task_id`.
    pub fn new(policy: Policy, tasks: &[Task]) -> Result<Self, SchedulerError> {
        Self::with_limits(policy, tasks, AnalysisLimits::default())
    }

    pub fn with_limits(policy: Policy, tasks: &[Task], limits: AnalysisLimits) -> Result<Self, SchedulerError> {
        Self::build(policy, tasks, limits, true)
    }

    /// Like [`with_limits`](Self::with_limits) but keeps the caller's order
    /// and priorities.
    pub fn unsorted(policy: Policy, tasks: &[Task], limits: AnalysisLimits) -> Result<Self, SchedulerError> {
        Self::build(policy, tasks, limits, false)
    }

    fn build(policy: Policy, tasks: &[Task], limits: AnalysisLimits, sort: bool) -> Result<Self, SchedulerError> {
        if tasks.is_empty() {
            return Err(SchedulerError::DegenerateInput("task set is empty"));
        }
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in tasks {
            task.validate()?;
            if !seen.insert(task.task_id) {
                return Err(SchedulerError::invalid(format!(
                    "duplicate task id {}",
                    task.task_id
                )));
            }
        }

        let mut owned = tasks.to_vec();
        if sort {
            match policy {
                Policy::Cyclic => cyclic::sort(&mut owned),
                Policy::RateMonotonic => fixed_priority::assign_rate_monotonic(&mut owned),
                Policy::DeadlineMonotonic => fixed_priority::assign_deadline_monotonic(&mut owned),
                Policy::EarliestDeadlineFirst => {}
            }
        }

        info!(
            policy = %policy,
            task_count = owned.len(),
            sorted = sort,
            "scheduler created"
        );
        Ok(Self {
            policy,
            tasks: owned,
            limits,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The scheduler's own ordered copy.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn limits(&self) -> AnalysisLimits {
        self.limits
    }

    /// # Errors
    /// [`SchedulerError::TaskNotFound`] when no task carries `task_id`.
    pub fn get_task(&self, task_id: u32) -> Result<&Task, SchedulerError> {
        self.tasks
            .iter()
            .find(|t| t.task_id == task_id)
            .ok_or(SchedulerError::TaskNotFound(task_id))
    }

    // ── Statistics ────────────────────────────────────────────────────────────

    /// `1.0` for cyclic and EDF, Liu & Layland for RM and DM.
    pub fn utilization_bound(&self) -> f64 {
        match self.policy {
            Policy::Cyclic | Policy::EarliestDeadlineFirst => 1.0,
            Policy::RateMonotonic | Policy::DeadlineMonotonic => liu_layland_bound(self.tasks.len()),
        }
    }

    /// Hyperperiod, subject to [`AnalysisLimits::max_hyperperiod`].
    pub fn hyperperiod(&self) -> Result<u64, SchedulerError> {
        Ok(self.hyperperiod_info()?.hyperperiod)
    }

    pub fn hyperperiod_info(&self) -> Result<HyperperiodInfo, SchedulerError> {
        Ok(hyperperiod::calculate(&self.tasks, self.limits.max_hyperperiod)?)
    }

    pub fn total_utilization(&self) -> f64 {
        metrics::total_utilization(&self.tasks)
    }

    pub fn min_deadline(&self) -> Result<u64, SchedulerError> {
        metrics::min_deadline(&self.tasks)
    }

    pub fn max_deadline(&self) -> Result<u64, SchedulerError> {
        metrics::max_deadline(&self.tasks)
    }

    pub fn min_period(&self) -> Result<u64, SchedulerError> {
        metrics::min_period(&self.tasks)
    }

    pub fn max_period(&self) -> Result<u64, SchedulerError> {
        metrics::max_period(&self.tasks)
    }

    pub fn min_compute_time(&self) -> Result<f64, SchedulerError> {
        metrics::min_compute_time(&self.tasks)
    }

    pub fn max_compute_time(&self) -> Result<f64, SchedulerError> {
        metrics::max_compute_time(&self.tasks)
    }

    pub fn max_priority_task(&self) -> Result<&Task, SchedulerError> {
        metrics::max_priority_task(&self.tasks)
    }

    pub fn min_priority_task(&self) -> Result<&Task, SchedulerError> {
        metrics::min_priority_task(&self.tasks)
    }

    // ── Feasibility ───────────────────────────────────────────────────────────

    /// Every named condition of the policy, each evaluated on its own.
    pub fn conditions(&self) -> Result<Vec<Condition>, SchedulerError> {
        let iterations = self.limits.max_rta_iterations;
        match self.policy {
            Policy::Cyclic => cyclic::conditions(&self.tasks, self.hyperperiod()?),
            Policy::RateMonotonic => fixed_priority::rate_monotonic_conditions(&self.tasks, iterations),
            Policy::DeadlineMonotonic => fixed_priority::deadline_monotonic_conditions(&self.tasks, iterations),
            Policy::EarliestDeadlineFirst => Ok(edf::conditions(&self.tasks, self.hyperperiod()?)),
        }
    }

    /// Policy-specific feasibility verdict.
    ///
    /// # Errors
    /// * [`SchedulerError::NonConvergentAnalysis`] when RTA hits its cap
    ///   while a task is still within its deadline.
    /// * [`SchedulerError::HyperperiodTooLarge`] when a hyperperiod-bound
    ///   test is needed and the hyperperiod exceeds the limit.
    pub fn is_schedulable(&self) -> Result<bool, SchedulerError> {
        let iterations = self.limits.max_rta_iterations;
        let verdict = match self.policy {
            Policy::Cyclic => cyclic::conditions(&self.tasks, self.hyperperiod()?)?
                .iter()
                .all(|c| c.holds),
            Policy::RateMonotonic => fixed_priority::rate_monotonic_is_schedulable(&self.tasks, iterations)?,
            Policy::DeadlineMonotonic => rta::check_response_time(&self.tasks, iterations)?,
            Policy::EarliestDeadlineFirst => {
                edf::implicit_deadline_condition(&self.tasks)
                    || edf::processor_demand_condition(&self.tasks, self.hyperperiod()?)
            }
        };

        info!(
            policy = %self.policy,
            utilization = self.total_utilization(),
            bound = self.utilization_bound(),
            schedulable = verdict,
            "schedulability analysed"
        );
        Ok(verdict)
    }

    /// Build one hyperperiod of execution.
    ///
    /// An infeasible set yields `Ok` with `events = None` and the reason.
    pub fn get_scheduling(&self) -> Result<Scheduling, SchedulerError> {
        if !self.is_schedulable()? {
            warn!(policy = %self.policy, "task set not schedulable, no timeline built");
            return Ok(Scheduling::infeasible(Infeasibility::ConditionsNotMet));
        }

        let hyperperiod = self.hyperperiod()?;
        match self.policy {
            Policy::Cyclic => {
                let frame_sizes = secondary_period::valid_time_slots(&self.tasks, hyperperiod)?;
                let Some(&frame_time) = frame_sizes.first() else {
                    return Ok(Scheduling::infeasible(Infeasibility::ConditionsNotMet));
                };
                cyclic::build(&self.tasks, hyperperiod, frame_time)
            }
            Policy::RateMonotonic | Policy::DeadlineMonotonic => {
                timeline::simulate(&self.tasks, hyperperiod, Dispatch::FixedPriority)
            }
            Policy::EarliestDeadlineFirst => {
                timeline::simulate(&self.tasks, hyperperiod, Dispatch::EarliestDeadline)
            }
        }
    }

    /// Full breakdown of the analysis.
    pub fn analyze(&self) -> Result<AnalysisReport, SchedulerError> {
        let info = self.hyperperiod_info()?;
        let iterations = self.limits.max_rta_iterations;

        let (hyperbolic, response_times, frame_sizes, demand) = match self.policy {
            Policy::Cyclic => (
                None,
                None,
                Some(secondary_period::valid_time_slots(&self.tasks, info.hyperperiod)?),
                None,
            ),
            Policy::RateMonotonic => (
                Some(hyperbolic_product(&self.tasks)),
                Some(rta::response_times(&self.tasks, iterations)?),
                None,
                None,
            ),
            Policy::DeadlineMonotonic => (None, Some(rta::response_times(&self.tasks, iterations)?), None, None),
            Policy::EarliestDeadlineFirst => (None, None, None, Some(pdc::analyze(&self.tasks, info.hyperperiod))),
        };

        Ok(AnalysisReport {
            policy: self.policy,
            task_count: self.tasks.len(),
            total_utilization: self.total_utilization(),
            utilization_bound: self.utilization_bound(),
            hyperperiod: info,
            tasks: self.tasks.clone(),
            conditions: self.conditions()?,
            hyperbolic_product: hyperbolic,
            response_times,
            frame_sizes,
            demand,
            schedulable: self.is_schedulable()?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
