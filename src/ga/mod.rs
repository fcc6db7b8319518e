//! Evolutionary attribute-subset search.
//!
//! A population of [`Candidate`] inclusion vectors evolves under
//! randomized variation operators and a pluggable whole-population
//! [`Selection`] scheme, with every candidate scored by the external
//! [`FitnessOracle`](crate::oracle::FitnessOracle).
//!
//! # Key Types
//!
//! - [`Candidate`] / [`Population`]: inclusion vectors and their container
//! - [`EvolutionConfig`]: loop parameters (builder + validation)
//! - [`Selection`]: replacement schemes, including NSGA-II
//! - [`EvolutionRunner`] / [`EvolutionResult`]: the loop and its outcome
//!
//! # Submodules
//!
//! - [`variation`]: mutation, crossover, neighborhood and dedup operators
//! - [`nsga`]: Pareto fronts and crowding distance
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

mod candidate;
mod config;
pub mod nsga;
mod runner;
mod selection;
pub mod variation;

pub use candidate::{Candidate, Population};
pub use config::{CardinalityBounds, EvolutionConfig};
pub use runner::{EvolutionResult, EvolutionRunner};
pub use selection::{Selection, SelectionContext};
pub use variation::CrossoverKind;
