/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Output timeline: [`Event`]s with [`Preemption`] intervals, collected in a
//! [`Scheduling`].
//!
//! Events are created only while a scheduler builds a timeline and are owned
//! by the returned `Scheduling`.  A preemption refers to the task that took
//! the processor by id, never by ownership.
//!
//! The wire-facing form of the timeline is [`SchedulingRecord`] /
//! [`EventRecord`]: flat, serialisable, and carrying `end_time` explicitly so
//! renderers never recompute it.

use serde::Serialize;

use crate::analysis::approx_le;
use crate::scheduler::{Infeasibility, SchedulerError};
use crate::task::Task;

// ── Preemption ────────────────────────────────────────────────────────────────

/// An interval during which a started job was suspended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preemption {
    start_time: f64,
    end_time: f64,
    preempting_task_id: u32,
}

impl Preemption {
    /// # Errors
    /// [`SchedulerError::InvalidTaskConfiguration`] unless
    /// `0 <= start_time <= end_time`.
    pub fn new(start_time: f64, end_time: f64, preempting_task_id: u32) -> Result<Self, SchedulerError> {
        if !(start_time >= 0.0) {
            return Err(SchedulerError::invalid(format!(
                "preemption start time must be non-negative, got {start_time}"
            )));
        }
        if !(end_time >= start_time) {
            return Err(SchedulerError::invalid(format!(
                "preemption ends at {end_time}, before it starts at {start_time}"
            )));
        }
        Ok(Self {
            start_time,
            end_time,
            preempting_task_id,
        })
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn preempting_task_id(&self) -> u32 {
        self.preempting_task_id
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// One job execution: when it first ran, which task, and every interval it
/// spent preempted.
///
/// Invariant, checked on every mutation: `end_time - start_time <=
/// task.deadline`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    start_time: f64,
    task: Task,
    preemptions: Vec<Preemption>,
}

impl Event {
    pub fn new(start_time: f64, task: Task) -> Result<Self, SchedulerError> {
        if !(start_time >= 0.0) {
            return Err(SchedulerError::invalid(format!(
                "event start time must be non-negative, got {start_time}"
            )));
        }
        let event = Self {
            start_time,
            task,
            preemptions: Vec::new(),
        };
        if !event.check_configuration() {
            return Err(event.invariant_error());
        }
        Ok(event)
    }

    /// Append a preemption (chronological order is the caller's job).
    ///
    /// The event is left unchanged when the new interval would stretch the
    /// execution past the task's relative deadline.
    pub fn add_preemption(&mut self, preemption: Preemption) -> Result<(), SchedulerError> {
        self.preemptions.push(preemption);
        if !self.check_configuration() {
            let err = self.invariant_error();
            self.preemptions.pop();
            return Err(err);
        }
        Ok(())
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn preemptions(&self) -> &[Preemption] {
        &self.preemptions
    }

    /// `start_time + compute_time + Σ preemption durations`.
    pub fn end_time(&self) -> f64 {
        let waited: f64 = self.preemptions.iter().map(Preemption::duration).sum();
        self.start_time + self.task.compute_time + waited
    }

    /// `true` while the execution window fits inside the relative deadline.
    pub fn check_configuration(&self) -> bool {
        approx_le(self.end_time() - self.start_time, self.task.deadline as f64)
    }

    fn invariant_error(&self) -> SchedulerError {
        SchedulerError::invalid(format!(
            "event for task {} spans {}..{} which exceeds its deadline {}",
            self.task.task_id,
            self.start_time,
            self.end_time(),
            self.task.deadline
        ))
    }
}

// ── TimeMark ──────────────────────────────────────────────────────────────────

/// A release or absolute-deadline instant of one task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeMark {
    pub time: f64,
    pub task_id: u32,
}

impl TimeMark {
    /// Every release `k * period` strictly before `horizon`.
    pub fn arrivals(tasks: &[Task], horizon: u64) -> Vec<TimeMark> {
        Self::collect(tasks, horizon, |t, k| Some(k.checked_mul(t.period)?), |time| time < horizon)
    }

    /// Every absolute deadline `k * period + deadline` up to and including
    /// `horizon`.
    pub fn deadlines(tasks: &[Task], horizon: u64) -> Vec<TimeMark> {
        Self::collect(
            tasks,
            horizon,
            |t, k| k.checked_mul(t.period)?.checked_add(t.deadline),
            |time| time <= horizon,
        )
    }

    fn collect(
        tasks: &[Task],
        horizon: u64,
        instant: impl Fn(&Task, u64) -> Option<u64>,
        keep: impl Fn(u64) -> bool,
    ) -> Vec<TimeMark> {
        let mut marks = Vec::new();
        for task in tasks.iter().filter(|t| t.period > 0) {
            let mut k = 0u64;
            while let Some(time) = instant(task, k).filter(|&t| keep(t)) {
                marks.push(TimeMark {
                    time: time as f64,
                    task_id: task.task_id,
                });
                k += 1;
                if k > horizon {
                    break;
                }
            }
        }
        marks.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.task_id.cmp(&b.task_id)));
        marks
    }
}

// ── Scheduling ────────────────────────────────────────────────────────────────

/// Result of one schedule construction.
///
/// `events == None` means the policy reported the set infeasible; the reason
/// is in [`infeasibility`](Self::infeasibility).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scheduling {
    pub events: Option<Vec<Event>>,

    /// Frame size in ticks; cyclic policy only.
    pub frame_time: Option<u64>,

    pub infeasibility: Option<Infeasibility>,
}

impl Scheduling {
    /// A constructed timeline.
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Some(events),
            ..Default::default()
        }
    }

    /// A cyclic timeline built on `frame_time`-sized frames.
    pub fn framed(events: Vec<Event>, frame_time: u64) -> Self {
        Self {
            events: Some(events),
            frame_time: Some(frame_time),
            infeasibility: None,
        }
    }

    /// No timeline, with the reason.
    pub fn infeasible(reason: Infeasibility) -> Self {
        Self {
            events: None,
            frame_time: None,
            infeasibility: Some(reason),
        }
    }

    /// `true` when events are present and non-empty.
    pub fn is_schedulable(&self) -> bool {
        self.events.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Number of events (`0` when absent).
    pub fn num_frames(&self) -> usize {
        self.events.as_ref().map_or(0, Vec::len)
    }

    /// `max(end_time) - min(start_time)` over all events; `0.0` when absent
    /// or empty.
    pub fn duration(&self) -> f64 {
        let Some(events) = self.events.as_ref().filter(|e| !e.is_empty()) else {
            return 0.0;
        };
        let end = events.iter().map(Event::end_time).fold(f64::MIN, f64::max);
        let start = events.iter().map(Event::start_time).fold(f64::MAX, f64::min);
        end - start
    }

    /// Events belonging to `task_id`, in timeline order.
    pub fn events_for(&self, task_id: u32) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .flatten()
            .filter(move |e| e.task.task_id == task_id)
    }

    /// Flatten into the serialisable output form.
    pub fn to_record(&self) -> SchedulingRecord {
        SchedulingRecord {
            schedulable: self.is_schedulable(),
            frame_time: self.frame_time,
            duration: self.duration(),
            infeasibility: self.infeasibility.clone(),
            events: self
                .events
                .as_ref()
                .map(|events| events.iter().map(EventRecord::from_event).collect()),
        }
    }
}

// ── Records (output contract) ─────────────────────────────────────────────────

/// Serialisable view of a [`Scheduling`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulingRecord {
    pub schedulable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_time: Option<u64>,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infeasibility: Option<Infeasibility>,
    pub events: Option<Vec<EventRecord>>,
}

/// One row of a Gantt chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub task_id: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub preemptions: Vec<Preemption>,
}

impl EventRecord {
    pub fn from_event(event: &Event) -> Self {
        Self {
            task_id: event.task.task_id,
            start_time: event.start_time,
            end_time: event.end_time(),
            preemptions: event.preemptions.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
