//! Error types.

use thiserror::Error;

use crate::graph::Position;

/// Errors raised while building or re-evaluating a task graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph {graph} must be evaluated against at least one processor")]
    NoProcessors { graph: String },
    #[error("task {task} of graph {graph} has {available} costs, but {required} processors are requested")]
    NotEnoughCosts {
        graph: String,
        task: String,
        available: usize,
        required: usize,
    },
    #[error("unknown task {task} in graph {graph}")]
    UnknownTask { graph: String, task: usize },
    #[error("position {position} does not exist in graph {graph}")]
    UnknownPosition { graph: String, position: Position },
    #[error("graph {graph} has no nodes")]
    Empty { graph: String },
}

/// Errors raised while reading a graph in the persisted text format.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("invalid value of field {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("can't read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ParseError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ParseError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised when an application is registered into a scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("same priority {priority} exists for application {existing}, application {rejected} is skipped")]
    DuplicatePriority {
        priority: u32,
        existing: String,
        rejected: String,
    },
    #[error("application {id} is already registered, the new one is skipped")]
    DuplicateId { id: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Fatal errors of a scheduling pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("application {application} has zero deadline but nonzero execution cost")]
    ZeroDeadline { application: String },
    #[error("scheduling application {application} did not converge after {iterations} trial schedules")]
    DidNotConverge { application: String, iterations: usize },
    #[error("trial schedule registration failed: {0}")]
    Registration(#[from] RegistrationError),
    #[error("seed allocation has {actual} processors, but the scheduler has {expected}")]
    ProcessorMismatch { expected: usize, actual: usize },
    #[error("task {task} of application {application} can't be placed on {processors} processors")]
    Unplaceable {
        application: String,
        task: String,
        processors: usize,
    },
}

/// Errors raised while loading or executing a configured scheduling run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read config from file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown scheduler {0}")]
    UnknownScheduler(String),
    #[error("processor count must be positive")]
    NoProcessors,
    #[error("deadline ratio must be positive")]
    ZeroDeadlineRatio,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
