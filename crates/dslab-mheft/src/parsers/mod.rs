//! Persisted graph format.

pub mod literal;
pub mod representation;
