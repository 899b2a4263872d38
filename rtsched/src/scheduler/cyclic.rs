/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fixed-frame (cyclic executive) scheduling.
//!
//! The hyperperiod is cut into equal frames of the smallest valid frame
//! size.  Each release is packed greedily into the earliest frame that
//! starts no earlier than the release, still lets the job finish before its
//! deadline, and has room left.  Jobs inside a frame run back-to-back from
//! the frame boundary; the most recently packed job runs first.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::analysis::metrics::total_utilization;
use crate::analysis::secondary_period::valid_time_slots;
use crate::analysis::approx_le;
use crate::event::{Event, Scheduling};
use crate::scheduler::{Condition, Infeasibility, SchedulerError};
use crate::task::Task;

/// Ascending period; stable for equal periods.
pub fn sort(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.period);
}

/// `U <= 1` and at least one valid frame size.
pub fn conditions(tasks: &[Task], hyperperiod: u64) -> Result<Vec<Condition>, SchedulerError> {
    Ok(vec![
        Condition::new("total_utilization_within_one", approx_le(total_utilization(tasks), 1.0)),
        Condition::new(
            "valid_frame_size_exists",
            !valid_time_slots(tasks, hyperperiod)?.is_empty(),
        ),
    ])
}

/// Pack one hyperperiod into `frame_time`-sized frames.
///
/// Returns [`Infeasibility::FrameAssignmentDeadEnd`] when some release fits
/// no frame.
pub fn build(tasks: &[Task], hyperperiod: u64, frame_time: u64) -> Result<Scheduling, SchedulerError> {
    if frame_time == 0 || hyperperiod % frame_time != 0 {
        return Err(SchedulerError::invalid(format!(
            "frame size {frame_time} does not divide hyperperiod {hyperperiod}"
        )));
    }
    let num_frames = hyperperiod / frame_time;
    let mut capacity = vec![frame_time as f64; num_frames as usize];
    let mut frames: Vec<VecDeque<usize>> = vec![VecDeque::new(); num_frames as usize];

    for (index, task) in tasks.iter().enumerate() {
        let slack = task.deadline as f64 - task.compute_time;
        for i in 0..hyperperiod / task.period {
            let release = task.period * i;
            let start_frame = release.div_ceil(frame_time);

            let slot = (0..)
                .take_while(|&offset| {
                    approx_le((offset * frame_time) as f64, slack) && start_frame + offset < num_frames
                })
                .map(|offset| (start_frame + offset) as usize)
                .find(|&frame| approx_le(task.compute_time, capacity[frame]));

            let Some(frame) = slot else {
                warn!(
                    task_id = task.task_id,
                    release,
                    frame_time,
                    "no frame can host release; greedy packing dead-ends"
                );
                return Ok(Scheduling::infeasible(Infeasibility::FrameAssignmentDeadEnd {
                    task_id: task.task_id,
                    release,
                }));
            };

            capacity[frame] -= task.compute_time;
            frames[frame].push_front(index);
            debug!(task_id = task.task_id, release, frame, left = capacity[frame], "packed");
        }
    }

    let mut events = Vec::new();
    for (k, frame) in frames.iter().enumerate() {
        let mut current_time = (k as u64 * frame_time) as f64;
        for &index in frame {
            let task = &tasks[index];
            events.push(Event::new(current_time, task.clone())?);
            current_time += task.compute_time;
        }
    }

    info!(frame_time, num_frames, jobs = events.len(), "cyclic schedule built");
    Ok(Scheduling::framed(events, frame_time))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(task_id: u32, compute_time: f64, period: u64) -> Task {
        Task {
            compute_time,
            deadline: period,
            period,
            task_id,
            priority: 0,
        }
    }

    fn harmonic_set() -> Vec<Task> {
        vec![make_task(1, 1.0, 4), make_task(2, 2.0, 6), make_task(3, 3.0, 12)]
    }

    #[test]
    fn sort_orders_by_period() {
        let mut tasks = vec![make_task(3, 3.0, 12), make_task(1, 1.0, 4), make_task(2, 2.0, 6)];
        sort(&mut tasks);
        let ids: Vec<u32> = tasks.iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn both_conditions_hold_for_4_6_12() {
        let c = conditions(&harmonic_set(), 12).unwrap();
        assert!(c.iter().all(|c| c.holds), "conditions: {c:?}");
    }

    #[test]
    fn build_packs_frames_with_latest_assignment_first() {
        let s = build(&harmonic_set(), 12, 4).unwrap();
        assert_eq!(s.frame_time, Some(4));
        let got: Vec<(u32, f64, f64)> = s
            .events
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| (e.task().task_id, e.start_time(), e.end_time()))
            .collect();
        assert_eq!(
            got,
            vec![
                (2, 0.0, 2.0),
                (1, 2.0, 3.0),
                (3, 4.0, 7.0),
                (1, 7.0, 8.0),
                (2, 8.0, 10.0),
                (1, 10.0, 11.0),
            ]
        );
    }

    #[test]
    fn frame_load_never_exceeds_frame_time() {
        let s = build(&harmonic_set(), 12, 4).unwrap();
        for k in 0..3 {
            let lo = (k * 4) as f64;
            let load: f64 = s
                .events
                .as_ref()
                .unwrap()
                .iter()
                .filter(|e| e.start_time() >= lo && e.start_time() < lo + 4.0)
                .map(|e| e.task().compute_time)
                .sum();
            assert!(load <= 4.0, "frame {k} carries {load}");
        }
    }

    #[test]
    fn dead_end_is_a_value_not_an_error() {
        // T2 released at 0 needs 3 ticks before 3, frame 0 already holds 2
        let tasks = vec![make_task(1, 2.0, 3), Task { deadline: 3, ..make_task(2, 3.0, 6) }];
        let s = build(&tasks, 6, 3).unwrap();
        assert!(!s.is_schedulable());
        assert_eq!(
            s.infeasibility,
            Some(Infeasibility::FrameAssignmentDeadEnd {
                task_id: 2,
                release: 0
            })
        );
    }

    #[test]
    fn frame_must_divide_hyperperiod() {
        assert!(matches!(
            build(&harmonic_set(), 12, 5),
            Err(SchedulerError::InvalidTaskConfiguration { .. })
        ));
    }
}
