//! Oracle-driven attribute subset search.
//!
//! Finds the subset of a fixed attribute universe that maximizes an
//! externally supplied fitness measure. The caller provides the universe
//! ([`oracle::AttributeSet`]) and a scoring callback
//! ([`oracle::FitnessOracle`], typically wrapping a cross-validated model
//! evaluation); the crate provides two interchangeable search strategies:
//!
//! - **Evolutionary search** ([`ga`]): population-based, with pluggable
//!   selection schemes (tournament, roulette, rank, Boltzmann, stochastic
//!   universal sampling, NSGA-II non-dominated sort, and more), uniform /
//!   one-point / shuffle crossover, per-position mutation, cardinality
//!   bounds, and periodic JSON checkpoints of the best candidate.
//! - **Greedy sequential search** ([`greedy`]): forward or backward
//!   hill-climbing over a raw inclusion mask, one committed flip per
//!   round, with plain, thresholded, or ANOVA-significance stopping and
//!   speculative look-ahead past plateaus.
//!
//! Fitness is a [`performance::PerformanceVector`] of named criteria, so
//! single- and multi-objective searches share one representation. All
//! randomness flows from a single seeded generator; a fixed seed yields
//! bit-identical runs. Independent oracle calls within one generation can
//! run concurrently under the `parallel` feature.

pub mod checkpoint;
pub mod error;
pub mod ga;
pub mod greedy;
pub mod oracle;
pub mod performance;

pub use error::{Result, SearchError};
