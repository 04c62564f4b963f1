//! Priority-preserving deadline-aware multi-application HEFT.

use std::str::FromStr;

use crate::allocation::Allocation;
use crate::eft::insert_task;
use crate::error::{RegistrationError, ScheduleError};
use crate::graph::{TaskGraph, TaskId};
use crate::scheduler::{log_makespans, Applications, Makespans, Scheduler};
use crate::schedulers::fmheft::{unplaceable, FmheftScheduler};
use crate::summary::Summary;

/// What happens to speculative placements of the remaining applications once a fair trial schedule is committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PurgePolicy {
    /// Retract the placements of every remaining application that misses its deadline in the trial schedule.
    #[default]
    Infeasible,
    /// Retract the placements of all remaining applications if any of them misses its deadline.
    AllRemaining,
    /// Keep all speculative placements.
    Keep,
}

impl FromStr for PurgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "infeasible" => Ok(PurgePolicy::Infeasible),
            "all" | "all_remaining" => Ok(PurgePolicy::AllRemaining),
            "keep" | "none" => Ok(PurgePolicy::Keep),
            _ => Err(format!("unknown purge policy {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct QueuedTask {
    priority: u32,
    task: TaskId,
    rank: u64,
}

/// Schedules applications in ascending priority order. Each application is first scheduled together with all
/// lower priority applications using [`FmheftScheduler`] on a copy of the committed allocation. A trial schedule
/// meeting the application's deadline is committed, otherwise the application's highest ranked unplaced task is
/// placed directly by EFT insertion and the trial is repeated.
pub struct PpmheftScheduler {
    processors: usize,
    applications: Applications,
    purge_policy: PurgePolicy,
    allocation: Allocation,
    makespans: Option<Makespans>,
}

impl PpmheftScheduler {
    pub fn new(processors: usize) -> Self {
        Self {
            processors,
            applications: Applications::new(),
            purge_policy: PurgePolicy::default(),
            allocation: Allocation::new(processors),
            makespans: None,
        }
    }

    pub fn with_purge_policy(mut self, purge_policy: PurgePolicy) -> Self {
        self.purge_policy = purge_policy;
        self
    }

    pub fn purge_policy(&self) -> PurgePolicy {
        self.purge_policy
    }

    pub fn applications(&self) -> &Applications {
        &self.applications
    }

    /// Applications of the given priorities, priorities that are not registered are skipped.
    fn apps<'a>(&'a self, priorities: &'a [u32]) -> impl Iterator<Item = &'a TaskGraph> + 'a {
        priorities.iter().filter_map(|&priority| self.applications.get(priority))
    }

    fn check_deadlines(&self) -> Result<(), ScheduleError> {
        for app in self.applications.iter() {
            if app.deadline() == 0 && app.min_total_cost() > 0 {
                return Err(ScheduleError::ZeroDeadline {
                    application: app.id().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Tasks of all applications by descending rank, ties go to the lower priority value.
    fn rank_queue(&self) -> Vec<QueuedTask> {
        let mut queue = self
            .applications
            .iter()
            .flat_map(|app| {
                app.rank().iter().map(|ranked| QueuedTask {
                    priority: app.priority(),
                    task: ranked.task,
                    rank: ranked.rank,
                })
            })
            .collect::<Vec<_>>();
        queue.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.priority.cmp(&b.priority)));
        queue
    }

    /// Runs FMHEFT over the applications of `low_set` on a copy of the allocation.
    pub(crate) fn trial_schedule(
        &self,
        allocation: &Allocation,
        low_set: &[u32],
    ) -> Result<(Allocation, Makespans), ScheduleError> {
        let mut fmheft = FmheftScheduler::new(self.processors).with_allocation(allocation.clone())?;
        for app in self.apps(low_set) {
            fmheft.register_application(app.clone())?;
        }
        let makespans = fmheft.compute_schedule()?;
        Ok((fmheft.into_allocation(), makespans))
    }

    /// Retracts speculative placements of the remaining applications according to the purge policy.
    pub(crate) fn purge(&self, allocation: &mut Allocation, remaining: &[u32], makespans: &Makespans) {
        let infeasible = self
            .apps(remaining)
            .filter(|app| makespans.get(app.id()).map_or(false, |&makespan| makespan > app.deadline()))
            .collect::<Vec<_>>();
        let purged = match self.purge_policy {
            PurgePolicy::Keep => Vec::new(),
            PurgePolicy::Infeasible => infeasible,
            PurgePolicy::AllRemaining if infeasible.is_empty() => Vec::new(),
            PurgePolicy::AllRemaining => self.apps(remaining).collect(),
        };
        for app in purged {
            let removed = allocation.remove_application(app.id());
            log::debug!(
                "[{}] retracting {} speculative tasks of application {}",
                self.name(),
                removed,
                app.id()
            );
        }
    }

    /// Removes the highest ranked task of the application that is not placed yet from the queue.
    fn pop_task(queue: &mut Vec<QueuedTask>, app: &TaskGraph, allocation: &Allocation) -> Option<TaskId> {
        while let Some(pos) = queue.iter().position(|queued| queued.priority == app.priority()) {
            let queued = queue.remove(pos);
            if !allocation.contains(app.id(), queued.task) {
                return Some(queued.task);
            }
        }
        None
    }

    fn schedule(&self) -> Result<Allocation, ScheduleError> {
        self.check_deadlines()?;

        let mut allocation = Allocation::new(self.processors);
        let mut queue = self.rank_queue();
        let mut remaining = self.applications.priorities();

        for app in self.applications.iter() {
            let priority = app.priority();
            let low_set = remaining.iter().copied().filter(|&p| p >= priority).collect::<Vec<_>>();
            // every rejected trial consumes one task of the application
            let max_iterations = app.task_count() + 1;
            let mut iterations = 0;

            loop {
                iterations += 1;
                if iterations > max_iterations {
                    return Err(ScheduleError::DidNotConverge {
                        application: app.id().to_string(),
                        iterations: max_iterations,
                    });
                }

                let (trial, makespans) = self.trial_schedule(&allocation, &low_set)?;
                let makespan = makespans.get(app.id()).copied().unwrap_or(0);

                if makespan <= app.deadline() {
                    log::debug!(
                        "[{}] committing fair schedule of {}: makespan {} <= deadline {}",
                        self.name(),
                        app.id(),
                        makespan,
                        app.deadline()
                    );
                    allocation = trial;
                    remaining.retain(|&p| p != priority);
                    self.purge(&mut allocation, &remaining, &makespans);
                    break;
                }

                match Self::pop_task(&mut queue, app, &allocation) {
                    Some(task) => {
                        log::debug!(
                            "[{}] fair makespan {} of {} exceeds deadline {}, inserting task {} directly",
                            self.name(),
                            makespan,
                            app.id(),
                            app.deadline(),
                            app.task_name(task)
                        );
                        insert_task(&mut allocation, app, task)
                            .ok_or_else(|| unplaceable(app, task, self.processors))?;
                    }
                    None => {
                        log::debug!(
                            "[{}] all tasks of {} are placed, makespan {} misses deadline {}",
                            self.name(),
                            app.id(),
                            makespan,
                            app.deadline()
                        );
                        remaining.retain(|&p| p != priority);
                        break;
                    }
                }
            }
        }

        Ok(allocation)
    }
}

impl Scheduler for PpmheftScheduler {
    fn name(&self) -> &'static str {
        "PP_MHEFT"
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
