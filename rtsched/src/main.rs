/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use rtsched::config::Workload;
use rtsched::scheduler::{Policy, SchedulerError};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Schedulability analysis for periodic task sets.
///
/// Example:
///   rtsched --workload tasks.yaml --policy edf --report
#[derive(Debug, Parser)]
#[command(
    name = "rtsched",
    about = "Uniprocessor schedulability analysis and timeline construction",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML workload file.
    #[arg(short = 'w', long = "workload")]
    workload: PathBuf,

    /// Scheduling policy: cyclic, rm, dm or edf. Overrides the file.
    #[arg(short = 'p', long = "policy", value_parser = parse_policy)]
    policy: Option<Policy>,

    /// Largest hyperperiod to analyse, in ticks. Overrides the file.
    #[arg(long = "max-hyperperiod")]
    max_hyperperiod: Option<u64>,

    /// Response-time iteration cap per task. Overrides the file.
    #[arg(long = "max-rta-iterations")]
    max_rta_iterations: Option<usize>,

    /// Keep the file's task order and priorities.
    #[arg(long = "no-sort", default_value_t = false)]
    no_sort: bool,

    /// Print the analysis report instead of the timeline.
    #[arg(short = 'r', long = "report", default_value_t = false)]
    report: bool,
}

fn parse_policy(s: &str) -> Result<Policy, SchedulerError> {
    s.parse()
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr so stdout stays valid YAML.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        workload = %cli.workload.display(),
        policy = ?cli.policy,
        no_sort = cli.no_sort,
        report = cli.report,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut workload = Workload::load_from_file(&cli.workload)?;

    if let Some(limit) = cli.max_hyperperiod {
        workload.limits.max_hyperperiod = limit;
    }
    if let Some(limit) = cli.max_rta_iterations {
        workload.limits.max_rta_iterations = limit;
    }

    let policy = match cli.policy.or(workload.policy) {
        Some(p) => p,
        None => {
            warn!("No policy given, defaulting to {}", Policy::EarliestDeadlineFirst);
            Policy::EarliestDeadlineFirst
        }
    };

    let scheduler = workload
        .scheduler(policy, !cli.no_sort)
        .context("Cannot build scheduler")?;

    let yaml = if cli.report {
        let report = scheduler.analyze().context("Analysis failed")?;
        serde_yaml::to_string(&report)?
    } else {
        let scheduling = scheduler.get_scheduling().context("Schedule construction failed")?;
        match &scheduling.infeasibility {
            Some(reason) => warn!(%reason, "No feasible timeline"),
            None => info!(
                events = scheduling.num_frames(),
                duration = scheduling.duration(),
                "Timeline built"
            ),
        }
        serde_yaml::to_string(&scheduling.to_record())?
    };

    print!("{yaml}");
    Ok(())
}
