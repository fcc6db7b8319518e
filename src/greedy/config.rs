//! Greedy sequential search configuration.

use crate::error::{Result, SearchError};

/// Which way the inclusion mask moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Start from an empty subset and add one attribute per round.
    #[default]
    Forward,

    /// Start from the full set and remove one attribute per round.
    Backward,
}

/// When a round's best move no longer counts as an improvement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoppingBehavior {
    /// Stop when this round's best is not strictly better than the last
    /// accepted performance.
    WithoutIncrease,

    /// Stop unless the improvement exceeds `threshold`, either as an
    /// absolute gain or relative to the last accepted value.
    MinimumIncrease { threshold: f64, relative: bool },

    /// Stop unless the improvement is statistically significant: the new
    /// best must exceed the last accepted value and a one-way ANOVA
    /// between the two performance distributions must yield `p < alpha`.
    SignificantIncrease { alpha: f64 },
}

impl Default for StoppingBehavior {
    fn default() -> Self {
        Self::WithoutIncrease
    }
}

/// Configuration for the greedy sequential search.
#[derive(Debug, Clone, Default)]
pub struct GreedyConfig {
    /// Search direction.
    pub direction: Direction,

    /// Maximum number of rounds. `0` means one round per attribute, the
    /// most a single-flip search can ever use.
    pub max_rounds: usize,

    /// Stopping rule applied after each round.
    pub stopping: StoppingBehavior,

    /// Number of rounds to keep searching after the stopping rule first
    /// fires. `0` halts on the spot. See the runner for the rollback
    /// semantics.
    pub speculative_rounds: usize,
}

impl GreedyConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_stopping(mut self, stopping: StoppingBehavior) -> Self {
        self.stopping = stopping;
        self
    }

    pub fn with_speculative_rounds(mut self, rounds: usize) -> Self {
        self.speculative_rounds = rounds;
        self
    }

    /// Validates the configuration against the attribute count.
    pub fn validate(&self, attribute_count: usize) -> Result<()> {
        if attribute_count == 0 {
            return Err(SearchError::Config(
                "attribute set must not be empty".into(),
            ));
        }
        match self.stopping {
            StoppingBehavior::MinimumIncrease { threshold, .. } => {
                if !threshold.is_finite() || threshold < 0.0 {
                    return Err(SearchError::Config(format!(
                        "minimum-increase threshold {threshold} must be finite and non-negative"
                    )));
                }
            }
            StoppingBehavior::SignificantIncrease { alpha } => {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err(SearchError::Config(format!(
                        "significance alpha {alpha} is outside (0, 1)"
                    )));
                }
            }
            StoppingBehavior::WithoutIncrease => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GreedyConfig::default().validate(10).is_ok());
    }

    #[test]
    fn test_alpha_bounds_are_enforced() {
        for alpha in [0.0, 1.0, -0.5, 1.5] {
            let config = GreedyConfig::default()
                .with_stopping(StoppingBehavior::SignificantIncrease { alpha });
            assert!(config.validate(10).is_err(), "alpha {alpha} accepted");
        }

        let config = GreedyConfig::default()
            .with_stopping(StoppingBehavior::SignificantIncrease { alpha: 0.05 });
        assert!(config.validate(10).is_ok());
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let config = GreedyConfig::default().with_stopping(StoppingBehavior::MinimumIncrease {
            threshold: -0.1,
            relative: false,
        });
        assert!(config.validate(10).is_err());
    }

    #[test]
    fn test_empty_attribute_set_is_rejected() {
        assert!(GreedyConfig::default().validate(0).is_err());
    }
}
