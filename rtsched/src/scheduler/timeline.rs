/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Preemptive uniprocessor dispatch over one hyperperiod.
//!
//! Every job released in `[0, H)` is run to completion.  At each release and
//! each completion the dispatcher picks the best ready job:
//!
//! * [`Dispatch::FixedPriority`]: numerically larger `priority`, then earlier
//!   release, then task order.
//! * [`Dispatch::EarliestDeadline`]: earlier absolute deadline, then earlier
//!   release, then task order.
//!
//! A started job that loses the processor records a [`Preemption`] covering
//! the whole interval until it runs again, tagged with the task that took
//! over.  One [`Event`] is emitted per job.

use tracing::{debug, warn};

use crate::analysis::approx_le;
use crate::event::{Event, Preemption, Scheduling};
use crate::scheduler::{Infeasibility, SchedulerError};
use crate::task::Task;

/// Ready-queue ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    FixedPriority,
    EarliestDeadline,
}

struct Job {
    task_index: usize,
    release: u64,
    remaining: f64,
    started_at: Option<f64>,
    suspended: Option<(f64, u32)>,
    preemptions: Vec<Preemption>,
}

impl Job {
    fn key(&self, task: &Task, dispatch: Dispatch) -> (i128, u64, usize) {
        let first = match dispatch {
            Dispatch::FixedPriority => -i128::from(task.priority),
            Dispatch::EarliestDeadline => i128::from(self.release) + i128::from(task.deadline),
        };
        (first, self.release, self.task_index)
    }
}

/// Every `(release, task_index)` in `[0, hyperperiod)`, in dispatch order.
fn releases(tasks: &[Task], hyperperiod: u64) -> Vec<(u64, usize)> {
    let mut out: Vec<(u64, usize)> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.period > 0)
        .flat_map(|(i, t)| (0..hyperperiod / t.period).map(move |k| (k * t.period, i)))
        .collect();
    out.sort_unstable();
    out
}

/// Simulate `tasks` from time `0` until every job released before
/// `hyperperiod` has completed.
///
/// A job that completes after `release + deadline` ends the simulation with
/// [`Infeasibility::DeadlineMiss`].
pub fn simulate(tasks: &[Task], hyperperiod: u64, dispatch: Dispatch) -> Result<Scheduling, SchedulerError> {
    let releases = releases(tasks, hyperperiod);
    let mut next = 0usize;
    let mut ready: Vec<Job> = Vec::new();
    let mut running: Option<(usize, u64)> = None;
    let mut events: Vec<Event> = Vec::new();
    let mut now = 0.0_f64;

    loop {
        while let Some(&(release, task_index)) = releases.get(next) {
            if !approx_le(release as f64, now) {
                break;
            }
            ready.push(Job {
                task_index,
                release,
                remaining: tasks[task_index].compute_time,
                started_at: None,
                suspended: None,
                preemptions: Vec::new(),
            });
            next += 1;
        }

        let next_release = releases.get(next).map(|&(r, _)| r as f64);

        let Some(pos) = (0..ready.len()).min_by_key(|&i| ready[i].key(&tasks[ready[i].task_index], dispatch))
        else {
            match next_release {
                Some(r) => {
                    now = now.max(r);
                    continue;
                }
                None => break,
            }
        };

        let chosen = (ready[pos].task_index, ready[pos].release);
        let chosen_id = tasks[chosen.0].task_id;

        if let Some(prev) = running.filter(|&prev| prev != chosen) {
            if let Some(job) = ready.iter_mut().find(|j| (j.task_index, j.release) == prev) {
                if job.started_at.is_some() && job.suspended.is_none() {
                    debug!(
                        task_id = tasks[prev.0].task_id,
                        by = chosen_id,
                        at = now,
                        "preempted"
                    );
                    job.suspended = Some((now, chosen_id));
                }
            }
        }
        running = Some(chosen);

        let job = &mut ready[pos];
        if let Some((since, by)) = job.suspended.take() {
            job.preemptions.push(Preemption::new(since, now, by)?);
        }
        job.started_at.get_or_insert(now);

        let slice = next_release.map_or(f64::INFINITY, |r| r - now);
        if !approx_le(job.remaining, slice) {
            job.remaining -= slice;
            now += slice;
            continue;
        }

        now += job.remaining;
        let job = ready.swap_remove(pos);
        running = None;
        let task = &tasks[job.task_index];
        let absolute_deadline = job.release as f64 + task.deadline as f64;
        if !approx_le(now, absolute_deadline) {
            warn!(
                task_id = task.task_id,
                release = job.release,
                completion = now,
                absolute_deadline,
                "deadline miss in simulated timeline"
            );
            return Ok(Scheduling::infeasible(Infeasibility::DeadlineMiss {
                task_id: task.task_id,
                release: job.release,
                completion: now,
            }));
        }

        let mut event = Event::new(job.started_at.unwrap_or(job.release as f64), task.clone())?;
        for p in job.preemptions {
            event.add_preemption(p)?;
        }
        events.push(event);
    }

    events.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));
    debug!(jobs = events.len(), hyperperiod, ?dispatch, "timeline built");
    Ok(Scheduling::with_events(events))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(task_id: u32, compute_time: f64, deadline: u64, period: u64, priority: i32) -> Task {
        Task {
            compute_time,
            deadline,
            period,
            task_id,
            priority,
        }
    }

    fn spans(s: &Scheduling) -> Vec<(u32, f64, f64)> {
        s.events
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| (e.task().task_id, e.start_time(), e.end_time()))
            .collect()
    }

    #[test]
    fn fixed_priority_preempts_lower_priority_job() {
        // T1(1, 4, 4) prio 3, T2(2, 6, 6) prio 2, T3(3, 12, 12) prio 1
        let tasks = vec![
            make_task(1, 1.0, 4, 4, 3),
            make_task(2, 2.0, 6, 6, 2),
            make_task(3, 3.0, 12, 12, 1),
        ];
        let s = simulate(&tasks, 12, Dispatch::FixedPriority).unwrap();
        assert!(s.is_schedulable());

        // T3: runs 3..4, T1 takes 4..5, runs 5..6, T2 takes 6..8 and T1 8..9,
        // finishes 9..10
        let t3: Vec<&Event> = s.events_for(3).collect();
        assert_eq!(t3.len(), 1);
        assert_eq!(t3[0].start_time(), 3.0);
        assert_eq!(t3[0].end_time(), 10.0);
        let by: Vec<u32> = t3[0].preemptions().iter().map(|p| p.preempting_task_id()).collect();
        assert_eq!(by, vec![1, 2]);

        let total: f64 = s.events_for(1).map(|e| e.task().compute_time).sum();
        assert_eq!(total, 3.0);
    }

    #[test]
    fn earliest_deadline_runs_the_most_urgent_job() {
        // Fixed priority would run T1 first; EDF picks T2 (deadline 3).
        let tasks = vec![make_task(1, 2.0, 8, 8, 9), make_task(2, 2.0, 3, 8, 1)];
        let s = simulate(&tasks, 8, Dispatch::EarliestDeadline).unwrap();
        assert_eq!(spans(&s), vec![(2, 0.0, 2.0), (1, 2.0, 4.0)]);

        let fp = simulate(&tasks, 8, Dispatch::FixedPriority).unwrap();
        assert!(
            matches!(fp.infeasibility, Some(Infeasibility::DeadlineMiss { task_id: 2, .. })),
            "T2 should miss its deadline behind T1, got {:?}",
            fp.infeasibility
        );
    }

    #[test]
    fn deadline_miss_is_reported_as_a_value() {
        let tasks = vec![make_task(1, 2.0, 2, 4, 2), make_task(2, 2.0, 3, 6, 1)];
        let s = simulate(&tasks, 12, Dispatch::FixedPriority).unwrap();
        assert!(!s.is_schedulable());
        assert_eq!(
            s.infeasibility,
            Some(Infeasibility::DeadlineMiss {
                task_id: 2,
                release: 0,
                completion: 4.0
            })
        );
    }

    #[test]
    fn idle_gaps_are_skipped() {
        let tasks = vec![make_task(1, 1.0, 5, 5, 1)];
        let s = simulate(&tasks, 10, Dispatch::FixedPriority).unwrap();
        assert_eq!(spans(&s), vec![(1, 0.0, 1.0), (1, 5.0, 6.0)]);
    }

    #[test]
    fn equal_priority_ties_go_to_the_earlier_release() {
        // At 4 the pending T2 job (released 0) beats T1's new job on release
        // time, even though T1 comes first in task order.
        let tasks = vec![make_task(1, 1.0, 4, 4, 1), make_task(2, 4.0, 8, 8, 1)];
        let s = simulate(&tasks, 8, Dispatch::FixedPriority).unwrap();
        assert_eq!(spans(&s), vec![(1, 0.0, 1.0), (2, 1.0, 5.0), (1, 5.0, 6.0)]);
        assert!(s.events_for(2).all(|e| e.preemptions().is_empty()));
    }
}
