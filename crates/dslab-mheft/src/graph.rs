//! Task graph (application) model.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::lower_bound::makespan_lower_bound;
use crate::rank::compute_ranks;

/// Index of a task inside its [`TaskGraph`].
pub type TaskId = usize;

/// Place of a node inside the layered topology: level, block inside the level and index inside the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub level: usize,
    pub block: usize,
    pub index: usize,
}

impl Position {
    pub fn new(level: usize, block: usize, index: usize) -> Self {
        Self { level, block, index }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.level, self.block, self.index)
    }
}

/// Weighted precedence link between two positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub orig: Position,
    pub dest: Position,
    /// Communication cost paid when both ends run on different processors.
    pub cost: u64,
}

/// Task together with its upward rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankedTask {
    pub task: TaskId,
    pub rank: u64,
}

/// Represents an application: a DAG of tasks with per-processor execution costs and weighted links.
///
/// The first node is the root and the last node is the exit sink. Tasks are placed into levels made of blocks,
/// links refer to tasks by their [`Position`] in this layout.
///
/// Scheduling-relevant values (rank, lowerbound) depend on the number of processors the graph is evaluated
/// against, see [`TaskGraph::set_processor_count`].
#[derive(Clone, Debug)]
pub struct TaskGraph {
    id: String,
    processors: usize,
    nodes: Vec<String>,
    node_costs: Vec<Vec<u64>>,
    levels: Vec<Vec<Vec<TaskId>>>,
    links: Vec<Link>,
    positions: Vec<Option<Position>>,
    predecessors: Vec<Vec<(TaskId, u64)>>,
    successors: Vec<Vec<(TaskId, u64)>>,
    rank: Vec<RankedTask>,
    lowerbound: u64,
    deadline: u64,
    priority: u32,
}

impl TaskGraph {
    pub fn new(id: &str, processors: usize) -> Self {
        Self {
            id: id.to_string(),
            processors,
            nodes: Vec::new(),
            node_costs: Vec::new(),
            levels: Vec::new(),
            links: Vec::new(),
            positions: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            rank: Vec::new(),
            lowerbound: 0,
            deadline: 0,
            priority: 0,
        }
    }

    /// Adds a task with its execution cost on each processor.
    pub fn add_task(&mut self, name: &str, costs: Vec<u64>) -> TaskId {
        let task_id = self.nodes.len();
        self.nodes.push(name.to_string());
        self.node_costs.push(costs);
        self.positions.push(None);
        self.predecessors.push(Vec::new());
        self.successors.push(Vec::new());
        task_id
    }

    /// Appends a level made of blocks of tasks and returns its index.
    pub fn add_level(&mut self, blocks: Vec<Vec<TaskId>>) -> Result<usize, GraphError> {
        let level = self.levels.len();
        for (block, tasks) in blocks.iter().enumerate() {
            for (index, &task) in tasks.iter().enumerate() {
                if task >= self.nodes.len() {
                    return Err(GraphError::UnknownTask {
                        graph: self.id.clone(),
                        task,
                    });
                }
                self.positions[task] = Some(Position::new(level, block, index));
            }
        }
        self.levels.push(blocks);
        Ok(level)
    }

    /// Adds a link between two positions of the layout.
    ///
    /// Only the first link between the same pair of tasks is used for scheduling.
    pub fn add_link(&mut self, orig: Position, dest: Position, cost: u64) -> Result<(), GraphError> {
        let from = self.task_at_checked(orig)?;
        let to = self.task_at_checked(dest)?;
        self.links.push(Link { orig, dest, cost });
        if !self.successors[from].iter().any(|&(succ, _)| succ == to) {
            self.successors[from].push((to, cost));
            self.predecessors[to].push((from, cost));
            // ranks of a changed graph are stale
            self.rank.clear();
        }
        Ok(())
    }

    /// Adds a link between two tasks already placed into levels.
    pub fn connect(&mut self, from: TaskId, to: TaskId, cost: u64) -> Result<(), GraphError> {
        let orig = self.position_checked(from)?;
        let dest = self.position_checked(to)?;
        self.add_link(orig, dest, cost)
    }

    fn position_checked(&self, task: TaskId) -> Result<Position, GraphError> {
        self.position(task).ok_or_else(|| GraphError::UnknownTask {
            graph: self.id.clone(),
            task,
        })
    }

    fn task_at_checked(&self, position: Position) -> Result<TaskId, GraphError> {
        self.task_at(position).ok_or_else(|| GraphError::UnknownPosition {
            graph: self.id.clone(),
            position,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn processors(&self) -> usize {
        self.processors
    }

    pub fn nodes(&self) -> &Vec<String> {
        &self.nodes
    }

    pub fn task_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn task_name(&self, task: TaskId) -> &str {
        &self.nodes[task]
    }

    pub fn task_by_name(&self, name: &str) -> Option<TaskId> {
        self.nodes.iter().position(|node| node == name)
    }

    /// Full cost table of the task, one entry per processor the graph was generated for.
    pub fn costs(&self, task: TaskId) -> &[u64] {
        &self.node_costs[task]
    }

    /// Costs of the task on the processors the graph is currently evaluated against.
    pub fn evaluated_costs(&self, task: TaskId) -> &[u64] {
        let costs = &self.node_costs[task];
        &costs[..self.processors.min(costs.len())]
    }

    pub fn levels(&self) -> &Vec<Vec<Vec<TaskId>>> {
        &self.levels
    }

    pub fn links(&self) -> &Vec<Link> {
        &self.links
    }

    pub fn position(&self, task: TaskId) -> Option<Position> {
        self.positions.get(task).copied().flatten()
    }

    pub fn task_at(&self, position: Position) -> Option<TaskId> {
        self.levels
            .get(position.level)
            .and_then(|blocks| blocks.get(position.block))
            .and_then(|block| block.get(position.index))
            .copied()
    }

    /// Parents of the task together with the cost of the link from each parent.
    pub fn predecessors(&self, task: TaskId) -> &[(TaskId, u64)] {
        &self.predecessors[task]
    }

    /// Children of the task together with the cost of the link to each child.
    pub fn successors(&self, task: TaskId) -> &[(TaskId, u64)] {
        &self.successors[task]
    }

    /// Cost of the direct link between two tasks, zero if they are not linked.
    pub fn link_cost(&self, from: TaskId, to: TaskId) -> u64 {
        self.successors[from]
            .iter()
            .find(|&&(succ, _)| succ == to)
            .map_or(0, |&(_, cost)| cost)
    }

    pub fn root(&self) -> Option<TaskId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    pub fn exit(&self) -> Option<TaskId> {
        self.nodes.len().checked_sub(1)
    }

    /// Tasks sorted by descending upward rank.
    pub fn rank(&self) -> &Vec<RankedTask> {
        &self.rank
    }

    pub fn is_evaluated(&self) -> bool {
        self.rank.len() == self.nodes.len()
    }

    pub fn lowerbound(&self) -> u64 {
        self.lowerbound
    }

    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: u32) {
        self.priority = priority;
    }

    pub fn set_deadline(&mut self, deadline: u64) {
        self.deadline = deadline;
    }

    /// Sets deadline to `lowerbound + lowerbound / ratio`, a zero ratio leaves no slack.
    pub fn set_deadline_ratio(&mut self, ratio: u64) {
        self.deadline = self.lowerbound + self.lowerbound.checked_div(ratio).unwrap_or(0);
    }

    pub fn set_lower_bound(&mut self, lowerbound: u64) {
        self.lowerbound = lowerbound;
    }

    /// Sum of the cheapest cost of every task, zero means the graph needs no processor time at all.
    pub fn min_total_cost(&self) -> u64 {
        (0..self.task_count())
            .map(|task| self.evaluated_costs(task).iter().copied().min().unwrap_or(0))
            .sum()
    }

    /// Re-evaluates the graph against another number of processors, recomputing rank and lowerbound.
    pub fn set_processor_count(&mut self, processors: usize) -> Result<(), GraphError> {
        self.check_processors(processors)?;
        self.processors = processors;
        self.rank = compute_ranks(self);
        self.lowerbound = makespan_lower_bound(self);
        Ok(())
    }

    /// Prepares the graph for scheduling on `processors` processors.
    ///
    /// A graph evaluated against another number of processors is re-evaluated. Otherwise missing ranks are
    /// computed and so is the lowerbound if it was never set.
    pub fn evaluate(&mut self, processors: usize) -> Result<(), GraphError> {
        if self.processors != processors {
            return self.set_processor_count(processors);
        }
        if !self.is_evaluated() {
            self.refresh_ranks()?;
        }
        if self.lowerbound == 0 {
            self.lowerbound = makespan_lower_bound(self);
        }
        Ok(())
    }

    /// Recomputes rank for the current number of processors, keeping lowerbound and deadline.
    pub fn refresh_ranks(&mut self) -> Result<(), GraphError> {
        self.check_processors(self.processors)?;
        self.rank = compute_ranks(self);
        Ok(())
    }

    fn check_processors(&self, processors: usize) -> Result<(), GraphError> {
        if processors == 0 {
            return Err(GraphError::NoProcessors { graph: self.id.clone() });
        }
        if self.nodes.is_empty() {
            return Err(GraphError::Empty { graph: self.id.clone() });
        }
        for (task, costs) in self.node_costs.iter().enumerate() {
            if costs.len() < processors {
                return Err(GraphError::NotEnoughCosts {
                    graph: self.id.clone(),
                    task: self.nodes[task].clone(),
                    available: costs.len(),
                    required: processors,
                });
            }
        }
        Ok(())
    }
}
