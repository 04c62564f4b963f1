use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::allocation::Allocation;
use crate::error::{RegistrationError, ScheduleError};
use crate::graph::TaskGraph;
use crate::summary::{summarize, Summary};

/// Makespan of each application keyed by application id, in ascending priority order.
pub type Makespans = IndexMap<String, u64>;

/// Multi-application scheduling policy.
pub trait Scheduler {
    /// Algorithm name used in reports.
    fn name(&self) -> &'static str;
    /// Registers an application, a duplicate priority or id is reported and the application is skipped.
    fn register_application(&mut self, app: TaskGraph) -> Result<(), RegistrationError>;
    /// Schedules all registered applications from scratch.
    fn compute_schedule(&mut self) -> Result<Makespans, ScheduleError>;
    /// Allocation produced by the last `compute_schedule` call.
    fn allocation(&self) -> &Allocation;
    /// Summary of the last `compute_schedule` call.
    fn summary(&self) -> Option<Summary>;
}

/// Applications registered into one scheduling run, keyed by their unique priority.
#[derive(Clone, Debug, Default)]
pub struct Applications {
    by_priority: BTreeMap<u32, TaskGraph>,
}

impl Applications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an application evaluated against `processors`.
    ///
    /// Priorities and ids must be unique, the first registered application wins. The application is
    /// re-evaluated when it was evaluated against another number of processors, see [`TaskGraph::evaluate`].
    pub fn register(&mut self, mut app: TaskGraph, processors: usize) -> Result<(), RegistrationError> {
        if let Some(existing) = self.by_priority.get(&app.priority()) {
            log::warn!(
                "same priority exists for {}: application {} is skipped",
                app.priority(),
                app.id()
            );
            return Err(RegistrationError::DuplicatePriority {
                priority: app.priority(),
                existing: existing.id().to_string(),
                rejected: app.id().to_string(),
            });
        }
        if self.iter().any(|existing| existing.id() == app.id()) {
            log::warn!("application {} is already registered and is skipped", app.id());
            return Err(RegistrationError::DuplicateId {
                id: app.id().to_string(),
            });
        }
        app.evaluate(processors)?;
        self.by_priority.insert(app.priority(), app);
        Ok(())
    }

    pub fn get(&self, priority: u32) -> Option<&TaskGraph> {
        self.by_priority.get(&priority)
    }

    /// Applications in ascending priority order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskGraph> {
        self.by_priority.values()
    }

    pub fn priorities(&self) -> Vec<u32> {
        self.by_priority.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_priority.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_priority.is_empty()
    }

    pub fn makespans(&self, allocation: &Allocation) -> Makespans {
        self.iter()
            .map(|app| (app.id().to_string(), allocation.makespan(app.id())))
            .collect()
    }

    pub fn summary(&self, algorithm: &str, makespans: &Makespans) -> Summary {
        summarize(algorithm, self.iter(), makespans)
    }
}

pub(crate) fn log_makespans(algorithm: &str, makespans: &Makespans) {
    for (app, makespan) in makespans.iter() {
        log::info!("[{}] application {}: makespan {}", algorithm, app, makespan);
    }
}
