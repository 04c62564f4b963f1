//! Upward rank (HEFT priority) calculation.

use crate::graph::{RankedTask, TaskGraph, TaskId};

/// Ceiling of the mean execution cost over the given processors.
pub fn average_cost(costs: &[u64]) -> u64 {
    if costs.is_empty() {
        return 0;
    }
    let n = costs.len() as u64;
    (costs.iter().sum::<u64>() + n - 1) / n
}

/// Marks every task from which the exit node is reachable.
///
/// Walks the reversed adjacency (child -> parents) depth-first from the exit with an explicit stack.
pub fn reaches_exit(graph: &TaskGraph) -> Vec<bool> {
    let mut reached = vec![false; graph.task_count()];
    let exit = match graph.exit() {
        Some(exit) => exit,
        None => return reached,
    };
    let mut stack = vec![exit];
    reached[exit] = true;
    while let Some(v) = stack.pop() {
        for &(parent, _) in graph.predecessors(v) {
            if !reached[parent] {
                reached[parent] = true;
                stack.push(parent);
            }
        }
    }
    reached
}

/// Children of `task` that are the next hop on at least one path from `task` to the exit.
///
/// Every distinct path to the exit starts with one of these hops, and only that hop is charged a communication cost.
pub fn next_hops(graph: &TaskGraph, task: TaskId, reached: &[bool]) -> Vec<(TaskId, u64)> {
    graph
        .successors(task)
        .iter()
        .copied()
        .filter(|&(succ, _)| reached[succ])
        .collect()
}

/// Order in which ranks are finalized: levels from the deepest one back to the root.
///
/// Tasks not placed into any level have no links and go last.
fn processing_order(graph: &TaskGraph) -> Vec<TaskId> {
    let mut order = Vec::with_capacity(graph.task_count());
    let mut seen = vec![false; graph.task_count()];
    for blocks in graph.levels().iter().rev() {
        for &task in blocks.iter().flatten() {
            if !seen[task] {
                seen[task] = true;
                order.push(task);
            }
        }
    }
    order.extend((0..graph.task_count()).filter(|&task| !seen[task]));
    order
}

/// Upward rank of every task, indexed by task id.
pub fn upward_ranks(graph: &TaskGraph) -> Vec<u64> {
    let total_tasks = graph.task_count();
    let reached = reaches_exit(graph);
    let mut ranks = vec![0; total_tasks];
    let mut done = vec![false; total_tasks];

    for v in processing_order(graph) {
        let mut tail = 0;
        for (succ, cost) in next_hops(graph, v, &reached) {
            if !done[succ] {
                log::warn!(
                    "graph {}: task {} is ranked before its successor {}, levels do not follow the links",
                    graph.id(),
                    graph.task_name(v),
                    graph.task_name(succ)
                );
            }
            tail = tail.max(ranks[succ] + cost);
        }
        ranks[v] = average_cost(graph.evaluated_costs(v)) + tail;
        done[v] = true;
    }
    ranks
}

/// Tasks sorted by descending upward rank, ties keep the node order.
pub fn compute_ranks(graph: &TaskGraph) -> Vec<RankedTask> {
    let ranks = upward_ranks(graph);
    let mut result = ranks
        .into_iter()
        .enumerate()
        .map(|(task, rank)| RankedTask { task, rank })
        .collect::<Vec<_>>();
    result.sort_by(|a, b| b.rank.cmp(&a.rank));
    result
}
