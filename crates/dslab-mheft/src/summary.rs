//! Deadline statistics of a scheduling run.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::graph::TaskGraph;
use crate::scheduler::Makespans;

/// Scheduling outcome of one application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
    pub id: String,
    pub priority: u32,
    pub lowerbound: u64,
    pub deadline: u64,
    pub makespan: u64,
}

impl ScheduleResult {
    pub fn missed_deadline(&self) -> bool {
        self.makespan > self.deadline
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApplicationSummary {
    #[serde(flatten)]
    pub result: ScheduleResult,
    /// Number of tasks.
    pub nodes: usize,
    /// `(makespan - deadline) / deadline` rounded to 4 decimals.
    pub lateness: f64,
}

/// Per-application lateness and aggregate deadline statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub algorithm: String,
    pub applications: Vec<ApplicationSummary>,
    /// Fraction of applications finishing after their deadline, rounded to 2 decimals.
    pub deadline_miss_ratio: f64,
    /// Sum of per-application lateness.
    pub overall_lateness: f64,
    /// Latest completion time over all applications.
    pub total_makespan: u64,
}

impl Summary {
    pub fn missed_count(&self) -> usize {
        self.applications
            .iter()
            .filter(|app| app.result.missed_deadline())
            .count()
    }

    pub fn application(&self, id: &str) -> Option<&ApplicationSummary> {
        self.applications.iter().find(|app| app.result.id == id)
    }
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Normalized overrun of the makespan past the deadline.
pub fn lateness(makespan: u64, deadline: u64) -> f64 {
    if deadline == 0 {
        return if makespan == 0 { 0. } else { f64::INFINITY };
    }
    round_to((makespan as f64 - deadline as f64) / deadline as f64, 4)
}

/// Aggregates makespans of the applications, an application without a makespan counts as 0.
pub fn summarize<'a>(
    algorithm: &str,
    applications: impl IntoIterator<Item = &'a TaskGraph>,
    makespans: &Makespans,
) -> Summary {
    let applications = applications
        .into_iter()
        .map(|app| {
            let makespan = makespans.get(app.id()).copied().unwrap_or(0);
            ApplicationSummary {
                result: ScheduleResult {
                    id: app.id().to_string(),
                    priority: app.priority(),
                    lowerbound: app.lowerbound(),
                    deadline: app.deadline(),
                    makespan,
                },
                nodes: app.task_count(),
                lateness: lateness(makespan, app.deadline()),
            }
        })
        .collect::<Vec<_>>();

    let missed = applications.iter().filter(|app| app.result.missed_deadline()).count();
    let deadline_miss_ratio = if applications.is_empty() {
        0.
    } else {
        round_to(missed as f64 / applications.len() as f64, 2)
    };

    Summary {
        algorithm: algorithm.to_string(),
        deadline_miss_ratio,
        overall_lateness: round_to(applications.iter().map(|app| app.lateness).sum(), 4),
        total_makespan: applications.iter().map(|app| app.result.makespan).max().unwrap_or(0),
        applications,
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.algorithm)?;
        writeln!(f, "Applications : {}", self.applications.len())?;
        for app in self.applications.iter() {
            writeln!(
                f,
                "app: {}; app priority: {}; nodes: {}; lowerbound: {}; deadline: {}; makespan: {}; lateness: {}",
                app.result.id,
                app.result.priority,
                app.nodes,
                app.result.lowerbound,
                app.result.deadline,
                app.result.makespan,
                app.lateness
            )?;
        }
        writeln!(
            f,
            "DMRs: {}; overall lateness: {}; total makespan: {}",
            self.deadline_miss_ratio, self.overall_lateness, self.total_makespan
        )
    }
}
