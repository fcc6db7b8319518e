//! Evolutionary search configuration.
//!
//! [`EvolutionConfig`] holds every parameter the loop recognizes:
//! population size, termination, selection scheme, operator probabilities,
//! cardinality bounds, and the checkpoint sink. Built with chained
//! `with_*` setters and validated up front: every configuration problem
//! is a fatal [`SearchError::Config`](crate::error::SearchError) surfaced
//! before the search starts.

use std::path::PathBuf;

use crate::error::{Result, SearchError};
use crate::ga::selection::Selection;
use crate::ga::variation::CrossoverKind;

/// Constraint on the number of included attributes of a candidate.
///
/// `exact` takes precedence over `min`/`max`. A candidate with zero
/// included attributes is always rejected regardless of bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CardinalityBounds {
    /// Minimum included count, inclusive. `None` means 1.
    pub min: Option<usize>,

    /// Maximum included count, inclusive. `None` means unbounded.
    pub max: Option<usize>,

    /// Exact included count. Overrides `min` and `max` when set.
    pub exact: Option<usize>,
}

impl CardinalityBounds {
    /// No constraint beyond "at least one attribute".
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Exactly `n` included attributes.
    pub fn exactly(n: usize) -> Self {
        Self {
            exact: Some(n),
            ..Self::default()
        }
    }

    /// Between `min` and `max` included attributes, inclusive.
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            exact: None,
        }
    }

    /// Whether a candidate with `count` included attributes satisfies the
    /// bounds.
    pub fn allows(&self, count: usize) -> bool {
        if count == 0 {
            return false;
        }
        if let Some(exact) = self.exact {
            return count == exact;
        }
        count >= self.min.unwrap_or(1) && self.max.is_none_or(|max| count <= max)
    }

    /// Checks the bounds against the attribute count.
    pub fn validate(&self, attribute_count: usize) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(SearchError::Config(format!(
                    "min cardinality {min} exceeds max cardinality {max}"
                )));
            }
        }
        if let Some(exact) = self.exact {
            if exact == 0 || exact > attribute_count {
                return Err(SearchError::Config(format!(
                    "exact cardinality {exact} is outside 1..={attribute_count}"
                )));
            }
        }
        if let Some(min) = self.min {
            if min > attribute_count {
                return Err(SearchError::Config(format!(
                    "min cardinality {min} exceeds attribute count {attribute_count}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the evolutionary subset search.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Number of candidates per generation.
    pub population_size: usize,

    /// Maximum number of generations. `0` is brute-force mode: the
    /// initial population is evaluated once and the loop stops.
    pub max_generations: usize,

    /// Generations without a best-ever improvement before stopping.
    /// `0` disables the check.
    pub stagnation_limit: usize,

    /// Whole-population selection scheme.
    pub selection: Selection,

    /// Whether sampling selection schemes seed the best-ever candidate
    /// into the next generation first.
    pub keep_best: bool,

    /// Per-position flip probability for mutation. A negative value means
    /// `1 / attribute_count`.
    pub mutation_probability: f64,

    /// Probability of crossing each shuffled pair.
    pub crossover_probability: f64,

    /// How crossed pairs swap positions.
    pub crossover_kind: CrossoverKind,

    /// Cardinality constraint applied to offspring and the initial
    /// population.
    pub bounds: CardinalityBounds,

    /// Stop as soon as the best fitness reaches this value. Disabled
    /// automatically under [`Selection::NonDominatedSort`], where no
    /// single scalar maximum exists.
    pub max_fitness: Option<f64>,

    /// Write a checkpoint of the best-ever candidate every this many
    /// generations. `0` disables checkpointing.
    pub checkpoint_interval: usize,

    /// Target file for checkpoints. Required when `checkpoint_interval`
    /// is nonzero.
    pub checkpoint_path: Option<PathBuf>,

    /// Random seed. A fixed seed yields bit-identical runs; `None` draws
    /// a seed from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 30,
            stagnation_limit: 0,
            selection: Selection::default(),
            keep_best: true,
            mutation_probability: -1.0,
            crossover_probability: 0.5,
            crossover_kind: CrossoverKind::Uniform,
            bounds: CardinalityBounds::unbounded(),
            max_fitness: None,
            checkpoint_interval: 0,
            checkpoint_path: None,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations (`0` = brute-force mode).
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit (`0` disables).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the selection scheme.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Enables or disables best-ever seeding in sampling schemes.
    pub fn with_keep_best(mut self, keep_best: bool) -> Self {
        self.keep_best = keep_best;
        self
    }

    /// Sets the mutation probability (negative = `1 / attribute_count`).
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p;
        self
    }

    /// Sets the crossover kind.
    pub fn with_crossover_kind(mut self, kind: CrossoverKind) -> Self {
        self.crossover_kind = kind;
        self
    }

    /// Sets the cardinality bounds.
    pub fn with_bounds(mut self, bounds: CardinalityBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Stops the search once the best fitness reaches `max`.
    pub fn with_max_fitness(mut self, max: f64) -> Self {
        self.max_fitness = Some(max);
        self
    }

    /// Enables checkpointing every `interval` generations to `path`.
    pub fn with_checkpoint(mut self, interval: usize, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_interval = interval;
        self.checkpoint_path = Some(path.into());
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration against the attribute count.
    pub fn validate(&self, attribute_count: usize) -> Result<()> {
        if attribute_count == 0 {
            return Err(SearchError::Config(
                "attribute set must not be empty".into(),
            ));
        }
        if self.population_size == 0 {
            return Err(SearchError::Config(
                "population_size must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(SearchError::Config(format!(
                "crossover_probability {} is outside [0, 1]",
                self.crossover_probability
            )));
        }
        if self.mutation_probability > 1.0 {
            return Err(SearchError::Config(format!(
                "mutation_probability {} exceeds 1",
                self.mutation_probability
            )));
        }
        if self.checkpoint_interval > 0 && self.checkpoint_path.is_none() {
            return Err(SearchError::Config(
                "checkpoint_interval set without a checkpoint_path".into(),
            ));
        }
        if self.max_fitness.is_some_and(f64::is_nan) {
            return Err(SearchError::Config("max_fitness must not be NaN".into()));
        }
        self.bounds.validate(attribute_count)?;
        self.selection.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EvolutionConfig::default().validate(10).is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EvolutionConfig::default()
            .with_population_size(20)
            .with_max_generations(100)
            .with_stagnation_limit(5)
            .with_keep_best(false)
            .with_mutation_probability(0.1)
            .with_crossover_probability(0.9)
            .with_crossover_kind(CrossoverKind::OnePoint)
            .with_seed(42);

        assert_eq!(config.population_size, 20);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.stagnation_limit, 5);
        assert!(!config.keep_best);
        assert!((config.mutation_probability - 0.1).abs() < 1e-12);
        assert!((config.crossover_probability - 0.9).abs() < 1e-12);
        assert_eq!(config.crossover_kind, CrossoverKind::OnePoint);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let config = EvolutionConfig::default().with_bounds(CardinalityBounds::between(5, 2));
        assert!(config.validate(10).is_err());
    }

    #[test]
    fn test_exact_above_attribute_count_is_rejected() {
        let config = EvolutionConfig::default().with_bounds(CardinalityBounds::exactly(11));
        assert!(config.validate(10).is_err());
    }

    #[test]
    fn test_checkpoint_interval_requires_path() {
        let mut config = EvolutionConfig::default();
        config.checkpoint_interval = 5;
        assert!(config.validate(10).is_err());

        let config = EvolutionConfig::default().with_checkpoint(5, "/tmp/ckpt.json");
        assert!(config.validate(10).is_ok());
    }

    #[test]
    fn test_empty_attribute_set_is_rejected() {
        assert!(EvolutionConfig::default().validate(0).is_err());
    }

    #[test]
    fn test_zero_population_is_rejected() {
        let config = EvolutionConfig::default().with_population_size(0);
        assert!(config.validate(10).is_err());
    }

    #[test]
    fn test_bounds_allows() {
        let b = CardinalityBounds::between(2, 4);
        assert!(!b.allows(0));
        assert!(!b.allows(1));
        assert!(b.allows(2));
        assert!(b.allows(4));
        assert!(!b.allows(5));

        let e = CardinalityBounds::exactly(3);
        assert!(e.allows(3));
        assert!(!e.allows(2));

        let u = CardinalityBounds::unbounded();
        assert!(!u.allows(0));
        assert!(u.allows(1));
        assert!(u.allows(1000));
    }
}
