#![doc = include_str!("../README.md")]

pub mod allocation;
pub mod eft;
pub mod error;
pub mod graph;
pub mod lower_bound;
pub mod parsers;
pub mod rank;
pub mod run;
pub mod scheduler;
pub mod scheduler_resolver;
pub mod schedulers;
pub mod summary;

#[cfg(test)]
mod tests;
