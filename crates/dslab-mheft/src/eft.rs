//! Earliest finish time (EFT) insertion.

use crate::allocation::{Allocation, TaskSlot};
use crate::graph::{TaskGraph, TaskId};

/// Processor and time interval chosen for a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub processor: usize,
    pub start: u64,
    pub end: u64,
}

/// Time at which all placed parents' outputs are available on each processor.
///
/// A parent on another processor adds its link cost, parents missing from the allocation contribute nothing.
pub fn parent_ready_times(allocation: &Allocation, application: &str, parents: &[(TaskId, u64)]) -> Vec<u64> {
    let placed = parents
        .iter()
        .filter_map(|&(parent, cost)| {
            allocation
                .find(application, parent)
                .map(|(processor, slot)| (processor, slot.end, cost))
        })
        .collect::<Vec<_>>();

    (0..allocation.processor_count())
        .map(|processor| {
            placed
                .iter()
                .map(|&(parent_processor, end, cost)| {
                    if parent_processor == processor {
                        end
                    } else {
                        end + cost
                    }
                })
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Earliest start not before `ready` of a gap of length `duration` in the timeline.
///
/// Falls back to the end of the last slot when no gap fits.
pub fn earliest_start(timeline: &[TaskSlot], ready: u64, duration: u64) -> u64 {
    let mut prev_end = 0;
    for slot in timeline.iter() {
        let start = ready.max(prev_end);
        if start + duration <= slot.start {
            return start;
        }
        prev_end = prev_end.max(slot.end);
    }
    ready.max(prev_end)
}

/// Finds the processor giving the earliest finish time, ties go to the lowest processor index.
///
/// `costs` holds the task's cost on each processor of the allocation. Returns `None` when there is
/// no processor to place the task on or the costs do not cover every processor.
pub fn find_earliest_slot(
    allocation: &Allocation,
    application: &str,
    parents: &[(TaskId, u64)],
    costs: &[u64],
) -> Option<Placement> {
    if costs.len() < allocation.processor_count() {
        return None;
    }
    let ready = parent_ready_times(allocation, application, parents);
    let mut best: Option<Placement> = None;
    for (processor, &duration) in costs.iter().take(allocation.processor_count()).enumerate() {
        let start = earliest_start(allocation.timeline(processor), ready[processor], duration);
        let end = start + duration;
        if best.map_or(true, |best| end < best.end) {
            best = Some(Placement { processor, start, end });
        }
    }
    best
}

/// Places a task of the application at its earliest finish time and records the slot in the allocation.
///
/// Returns `None` and leaves the allocation unchanged if the task can't be placed, see [`find_earliest_slot`].
pub fn insert_task(allocation: &mut Allocation, graph: &TaskGraph, task: TaskId) -> Option<Placement> {
    let placement = find_earliest_slot(
        allocation,
        graph.id(),
        graph.predecessors(task),
        graph.evaluated_costs(task),
    )?;
    log::debug!(
        "scheduling task {} of {} on processor {} on time {}-{}",
        graph.task_name(task),
        graph.id(),
        placement.processor,
        placement.start,
        placement.end
    );
    allocation.insert(
        placement.processor,
        TaskSlot::new(graph.id(), task, placement.start, placement.end),
    );
    Some(placement)
}
