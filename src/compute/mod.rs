//! Compute module - Objectives, statistics and the evolutionary trainer.

mod objective;

pub mod evolution;
pub mod statistics;

pub use objective::*;
