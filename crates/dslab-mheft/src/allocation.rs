//! Per-processor task timelines.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::graph::TaskId;

/// Task of an application placed on a processor during `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSlot {
    pub application: String,
    pub task: TaskId,
    pub start: u64,
    pub end: u64,
}

impl TaskSlot {
    pub fn new(application: &str, task: TaskId, start: u64, end: u64) -> Self {
        Self {
            application: application.to_string(),
            task,
            start,
            end,
        }
    }

    pub fn belongs_to(&self, application: &str, task: TaskId) -> bool {
        self.task == task && self.application == application
    }
}

impl PartialOrd for TaskSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.end.cmp(&other.end))
            .then_with(|| self.application.cmp(&other.application))
            .then(self.task.cmp(&other.task))
    }
}

/// Location of a placed task: processor and the `(start, end)` key of its slot.
#[derive(Clone, Copy, Debug)]
struct SlotRef {
    processor: usize,
    start: u64,
    end: u64,
}

#[derive(Clone, Serialize, Deserialize)]
struct Timelines {
    processors: Vec<Vec<TaskSlot>>,
}

/// Ordered timelines of task slots, one per processor.
///
/// Cloning an allocation gives an independent snapshot, which is how speculative scheduling is isolated
/// from committed state. Slots are indexed by application and task, so lookups do not scan the timelines.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Timelines", into = "Timelines")]
pub struct Allocation {
    processors: Vec<Vec<TaskSlot>>,
    index: HashMap<String, HashMap<TaskId, SlotRef>>,
}

impl PartialEq for Allocation {
    fn eq(&self, other: &Self) -> bool {
        self.processors == other.processors
    }
}

impl Eq for Allocation {}

impl From<Timelines> for Allocation {
    fn from(timelines: Timelines) -> Self {
        let mut allocation = Allocation::new(timelines.processors.len());
        for (processor, timeline) in timelines.processors.into_iter().enumerate() {
            for slot in timeline {
                allocation.insert(processor, slot);
            }
        }
        allocation
    }
}

impl From<Allocation> for Timelines {
    fn from(allocation: Allocation) -> Self {
        Timelines {
            processors: allocation.processors,
        }
    }
}

impl Allocation {
    /// Empty allocation. With zero processors nothing can be placed into it.
    pub fn new(processor_count: usize) -> Self {
        Self {
            processors: vec![Vec::new(); processor_count],
            index: HashMap::new(),
        }
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// Slots of the processor. Panics if the processor does not exist.
    pub fn timeline(&self, processor: usize) -> &[TaskSlot] {
        &self.processors[processor]
    }

    pub fn timelines(&self) -> &Vec<Vec<TaskSlot>> {
        &self.processors
    }

    /// All slots with their processor, processor by processor.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &TaskSlot)> {
        self.processors
            .iter()
            .enumerate()
            .flat_map(|(processor, timeline)| timeline.iter().map(move |slot| (processor, slot)))
    }

    pub fn slot_count(&self) -> usize {
        self.processors.iter().map(|timeline| timeline.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.iter().all(|timeline| timeline.is_empty())
    }

    /// Finds the slot of a task. A task placed more than once is found at its first placement.
    pub fn find(&self, application: &str, task: TaskId) -> Option<(usize, &TaskSlot)> {
        let slot_ref = self.index.get(application)?.get(&task)?;
        let timeline = &self.processors[slot_ref.processor];
        let from = timeline.partition_point(|slot| (slot.start, slot.end) < (slot_ref.start, slot_ref.end));
        timeline[from..]
            .iter()
            .take_while(|slot| (slot.start, slot.end) == (slot_ref.start, slot_ref.end))
            .find(|slot| slot.belongs_to(application, task))
            .map(|slot| (slot_ref.processor, slot))
    }

    pub fn contains(&self, application: &str, task: TaskId) -> bool {
        self.index
            .get(application)
            .map_or(false, |tasks| tasks.contains_key(&task))
    }

    /// Inserts a slot keeping the timeline sorted by start and end time.
    ///
    /// Panics if the processor does not exist.
    pub fn insert(&mut self, processor: usize, slot: TaskSlot) {
        self.index
            .entry(slot.application.clone())
            .or_default()
            .entry(slot.task)
            .or_insert(SlotRef {
                processor,
                start: slot.start,
                end: slot.end,
            });
        let timeline = &mut self.processors[processor];
        let pos = timeline.partition_point(|other| (other.start, other.end) <= (slot.start, slot.end));
        timeline.insert(pos, slot);
    }

    /// Removes every slot of the application and returns how many were removed.
    pub fn remove_application(&mut self, application: &str) -> usize {
        if self.index.remove(application).is_none() {
            return 0;
        }
        let before = self.slot_count();
        for timeline in self.processors.iter_mut() {
            timeline.retain(|slot| slot.application != application);
        }
        before - self.slot_count()
    }

    /// Completion time of the last slot of the application, zero if it has no slots.
    pub fn makespan(&self, application: &str) -> u64 {
        self.slots()
            .filter(|(_, slot)| slot.application == application)
            .map(|(_, slot)| slot.end)
            .max()
            .unwrap_or(0)
    }

    /// Completion time of the last slot on any processor.
    pub fn total_makespan(&self) -> u64 {
        self.slots().map(|(_, slot)| slot.end).max().unwrap_or(0)
    }

    /// Saves the timelines to a JSON file.
    pub fn save_to_file(&self, filename: &str) -> std::io::Result<()> {
        let mut file = File::create(filename)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(())
    }
}
