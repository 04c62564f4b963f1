//! Fair multi-application HEFT.

use std::collections::VecDeque;

use crate::allocation::Allocation;
use crate::eft::insert_task;
use crate::error::{RegistrationError, ScheduleError};
use crate::graph::{RankedTask, TaskGraph, TaskId};
use crate::scheduler::{log_makespans, Applications, Makespans, Scheduler};
use crate::summary::Summary;

/// Interleaves applications: each round takes the highest ranked remaining task of every application
/// and places the round's tasks in descending rank order across applications.
///
/// Can start from an allocation that already holds some tasks, these tasks are not placed again.
pub struct FmheftScheduler {
    processors: usize,
    applications: Applications,
    seed: Allocation,
    allocation: Allocation,
    makespans: Option<Makespans>,
}

struct PoolEntry<'a> {
    app: &'a TaskGraph,
    task: RankedTask,
}

impl FmheftScheduler {
    pub fn new(processors: usize) -> Self {
        Self {
            processors,
            applications: Applications::new(),
            seed: Allocation::new(processors),
            allocation: Allocation::new(processors),
            makespans: None,
        }
    }

    /// Starts scheduling from the given allocation instead of an empty one.
    pub fn with_allocation(mut self, allocation: Allocation) -> Result<Self, ScheduleError> {
        self.set_allocated_tasks(allocation)?;
        Ok(self)
    }

    /// Replaces the seed allocation. It must have as many processors as the scheduler.
    pub fn set_allocated_tasks(&mut self, allocation: Allocation) -> Result<(), ScheduleError> {
        if allocation.processor_count() != self.processors {
            return Err(ScheduleError::ProcessorMismatch {
                expected: self.processors,
                actual: allocation.processor_count(),
            });
        }
        self.seed = allocation;
        Ok(())
    }

    pub fn applications(&self) -> &Applications {
        &self.applications
    }

    pub fn into_allocation(self) -> Allocation {
        self.allocation
    }

    fn schedule(&self) -> Result<Allocation, ScheduleError> {
        let mut allocation = self.seed.clone();

        // tasks already present in the seed are pruned before the run starts
        let mut queues = self
            .applications
            .iter()
            .map(|app| {
                let queue = app
                    .rank()
                    .iter()
                    .filter(|ranked| !allocation.contains(app.id(), ranked.task))
                    .copied()
                    .collect::<VecDeque<_>>();
                (app, queue)
            })
            .filter(|(_, queue)| !queue.is_empty())
            .collect::<Vec<_>>();

        while !queues.is_empty() {
            let mut pool = queues
                .iter_mut()
                .filter_map(|(app, queue)| queue.pop_front().map(|task| PoolEntry { app: *app, task }))
                .collect::<Vec<_>>();
            pool.sort_by(|a, b| b.task.rank.cmp(&a.task.rank));

            for entry in pool.into_iter() {
                if !allocation.contains(entry.app.id(), entry.task.task) {
                    insert_task(&mut allocation, entry.app, entry.task.task)
                        .ok_or_else(|| unplaceable(entry.app, entry.task.task, self.processors))?;
                }
            }
            queues.retain(|(_, queue)| !queue.is_empty());
        }

        Ok(allocation)
    }
}

pub(crate) fn unplaceable(app: &TaskGraph, task: TaskId, processors: usize) -> ScheduleError {
    ScheduleError::Unplaceable {
        application: app.id().to_string(),
        task: app.task_name(task).to_string(),
        processors,
    }
}

impl Scheduler for FmheftScheduler {
    fn name(&self) -> &'static str {
        "F_MHEFT"
    }

    fn register_application(&mut self, app: TaskGraph) -> Result<(), RegistrationError> {
        self.applications.register(app, self.processors)
    }

    fn compute_schedule(&mut self) -> Result<Makespans, ScheduleError> {
        self.allocation = self.schedule()?;
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
