//! Scheduling run described by a YAML config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::error::ConfigError;
use crate::graph::TaskGraph;
use crate::scheduler_resolver::{default_scheduler_resolver, SchedulerParams};
use crate::summary::Summary;

fn default_schedulers() -> Vec<String> {
    vec!["Fmheft".to_string(), "Wpmheft".to_string(), "Ppmheft".to_string()]
}

/// Run configuration.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// Graph files in the text representation, relative paths are resolved against the config file.
    pub graphs: Vec<PathBuf>,
    /// Number of processors all applications are evaluated against.
    pub processors: usize,
    /// When set, each deadline becomes `lowerbound + lowerbound / deadline_ratio`,
    /// otherwise the stored deadlines are used.
    #[serde(default)]
    pub deadline_ratio: Option<u64>,
    /// Scheduler descriptors (default: Fmheft, Wpmheft, Ppmheft).
    #[serde(default = "default_schedulers")]
    pub schedulers: Vec<String>,
}

impl RunConfig {
    pub fn from_yaml(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(data)?)
    }

    /// Loads config from a file.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let path = config_path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml(&data)?;
        if let Some(dir) = path.parent() {
            for graph in config.graphs.iter_mut() {
                if graph.is_relative() {
                    *graph = dir.join(&*graph);
                }
            }
        }
        Ok(config)
    }
}

/// Result of one scheduler in a run.
#[derive(Serialize, Debug)]
pub struct RunResult {
    pub scheduler: String,
    pub summary: Summary,
    pub allocation: Allocation,
}

/// Applications prepared for scheduling together with the schedulers to compare.
pub struct ScheduleRun {
    applications: Vec<TaskGraph>,
    processors: usize,
    schedulers: Vec<SchedulerParams>,
}

impl ScheduleRun {
    /// Prepares applications: priorities are assigned 1..n in the given order, every application is evaluated
    /// against `processors` and gets its deadline from `deadline_ratio` if one is given.
    pub fn new(
        mut applications: Vec<TaskGraph>,
        processors: usize,
        deadline_ratio: Option<u64>,
        schedulers: Vec<SchedulerParams>,
    ) -> Result<Self, ConfigError> {
        if processors == 0 {
            return Err(ConfigError::NoProcessors);
        }
        if deadline_ratio == Some(0) {
            return Err(ConfigError::ZeroDeadlineRatio);
        }
        for params in schedulers.iter() {
            default_scheduler_resolver(params, processors)?;
        }
        for (i, app) in applications.iter_mut().enumerate() {
            app.set_priority(i as u32 + 1);
            app.set_processor_count(processors)?;
            if let Some(ratio) = deadline_ratio {
                app.set_deadline_ratio(ratio);
            }
        }
        Ok(Self {
            applications,
            processors,
            schedulers,
        })
    }

    pub fn from_config(config: RunConfig) -> Result<Self, ConfigError> {
        let applications = config
            .graphs
            .iter()
            .map(TaskGraph::from_file)
            .collect::<Result<Vec<_>, _>>()?;
        let schedulers = config
            .schedulers
            .iter()
            .map(|s| s.parse::<SchedulerParams>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(applications, config.processors, config.deadline_ratio, schedulers)
    }

    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Self::from_config(RunConfig::load(config_path)?)
    }

    pub fn applications(&self) -> &Vec<TaskGraph> {
        &self.applications
    }

    /// Runs every scheduler on its own copies of the applications.
    pub fn run(&self) -> Result<Vec<RunResult>, ConfigError> {
        let mut results = Vec::new();
        for params in self.schedulers.iter() {
            let mut scheduler = default_scheduler_resolver(params, self.processors)?;
            for app in self.applications.iter() {
                scheduler.register_application(app.clone())?;
            }
            scheduler.compute_schedule()?;
            let summary = scheduler
                .summary()
                .expect("summary is available after compute_schedule");
            log::info!("{}", summary);
            results.push(RunResult {
                scheduler: params.to_string(),
                summary,
                allocation: scheduler.allocation().clone(),
            });
        }
        Ok(results)
    }
}
