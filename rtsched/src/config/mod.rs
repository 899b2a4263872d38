//! Workload file loading.
//!
//! A workload names the task set to analyse and, optionally, the policy and
//! analysis limits.  The expected YAML structure is:
//! ```yaml
//! policy: rate_monotonic      # optional
//! limits:                     # optional, each field optional
//!   max_hyperperiod: 1000000
//!   max_rta_iterations: 5000
//! tasks:                      # compute_time, deadline[, period[, priority[, task_id]]]
//!   - [1, 4, 4]
//!   - [2, 6]
//!   - [3.5, 12, 12, 0, 7]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::scheduler::{AnalysisLimits, Policy, Scheduler, SchedulerError};
use crate::task::Task;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private; callers work with [`Workload`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkloadFile {
    policy: Option<String>,
    #[serde(default)]
    limits: AnalysisLimits,
    #[serde(default)]
    tasks: Vec<Vec<f64>>,
}

// ── Workload ──────────────────────────────────────────────────────────────────

/// A parsed workload: tasks in file order, plus optional policy and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    pub policy: Option<Policy>,
    pub limits: AnalysisLimits,
    pub tasks: Vec<Task>,
}

impl Workload {
    /// Read and parse `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid, the policy name is unknown, or a task row is malformed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading workload from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open workload file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid workload file: {}", path.display()))
    }

    /// Parse a workload from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: WorkloadFile = serde_yaml::from_str(content).context("Failed to parse workload YAML")?;

        let policy = file
            .policy
            .as_deref()
            .map(str::parse::<Policy>)
            .transpose()
            .context("Invalid policy")?;

        let tasks = file
            .tasks
            .iter()
            .enumerate()
            .map(|(i, row)| Task::from_record(row, i + 1))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid task row")?;

        if tasks.is_empty() {
            warn!("Workload contains no tasks");
        }
        for task in &tasks {
            debug!(
                "  Task {} | C={} D={} T={} prio={}",
                task.task_id, task.compute_time, task.deadline, task.period, task.priority
            );
        }
        info!(
            task_count = tasks.len(),
            policy = ?policy,
            max_hyperperiod = file.limits.max_hyperperiod,
            max_rta_iterations = file.limits.max_rta_iterations,
            "Workload loaded"
        );

        Ok(Self {
            policy,
            limits: file.limits,
            tasks,
        })
    }

    /// Build a scheduler for these tasks under `policy`.
    pub fn scheduler(&self, policy: Policy, sort: bool) -> Result<Scheduler, SchedulerError> {
        if sort {
            Scheduler::with_limits(policy, &self.tasks, self.limits)
        } else {
            Scheduler::unsorted(policy, &self.tasks, self.limits)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
