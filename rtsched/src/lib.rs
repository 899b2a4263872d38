/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! rtsched – uniprocessor schedulability analysis for periodic task sets
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task/           – Task, AperiodicTask, workload-row parsing
//! ├── hyperperiod/    – LCM / GCD helpers, bounded hyperperiod
//! ├── analysis/       – metrics, RTA, processor demand, frame sizes
//! ├── scheduler/      – Cyclic, RM, DM and EDF behind one Scheduler
//! ├── event/          – Event / Preemption / Scheduling timeline model
//! └── config/         – YAML workload files
//! ```

pub mod analysis;
pub mod config;
pub mod event;
pub mod hyperperiod;
pub mod scheduler;
pub mod task;
