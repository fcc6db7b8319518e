//! Greedy sequential subset search.
//!
//! A deterministic alternative to the evolutionary loop: one attribute
//! changes state per round, the single best move wins, and a configurable
//! stopping rule (plain, thresholded, or ANOVA-significant improvement)
//! decides when to halt. Speculative rounds let the search look past a
//! local plateau before committing to it.

mod config;
mod runner;
pub mod significance;

pub use config::{Direction, GreedyConfig, StoppingBehavior};
pub use runner::{GreedyResult, GreedyRunner};
