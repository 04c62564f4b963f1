//! Weighted-priority multi-application HEFT.

use crate::allocation::Allocation;
use crate::eft::insert_task;
use crate::error::{RegistrationError, ScheduleError};
use crate::graph::TaskGraph;
use crate::scheduler::{log_makespans, Applications, Makespans, Scheduler};
use crate::schedulers::fmheft::unplaceable;
use crate::summary::Summary;

/// Schedules applications one after another in ascending priority order, each one completely in rank order.
pub struct WpmheftScheduler {
    processors: usize,
    applications: Applications,
    allocation: Allocation,
    makespans: Option<Makespans>,
}

impl WpmheftScheduler {
    pub fn new(processors: usize) -> Self {
        Self {
            processors,
            applications: Applications::new(),
            allocation: Allocation::new(processors),
            makespans: None,
        }
    }

    pub fn applications(&self) -> &Applications {
        &self.applications
    }
}

impl Scheduler for WpmheftScheduler {
    fn name(&self) -> &'static str {
        "WP_MHEFT"
    }

    fn register_application(&mut self, app: TaskGraph) -> Result<(), RegistrationError> {
        self.applications.register(app, self.processors)
    }

    fn compute_schedule(&mut self) -> Result<Makespans, ScheduleError> {
        let mut allocation = Allocation::new(self.processors);
        for app in self.applications.iter() {
            for ranked in app.rank().iter() {
                insert_task(&mut allocation, app, ranked.task)
                    .ok_or_else(|| unplaceable(app, ranked.task, self.processors))?;
            }
        }
        self.allocation = allocation;

        let makespans = self.applications.makespans(&self.allocation);
        log_makespans(self.name(), &makespans);
        self.makespans = Some(makespans.clone());
        Ok(makespans)
    }

    fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    fn summary(&self) -> Option<Summary> {
        self.makespans
            .as_ref()
            .map(|makespans| self.applications.summary(self.name(), makespans))
    }
}
