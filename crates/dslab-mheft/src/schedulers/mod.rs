//! Multi-application scheduler implementations.

pub mod fmheft;
pub mod ppmheft;
pub mod wpmheft;
