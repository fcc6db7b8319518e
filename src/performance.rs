//! Performance values returned by the evaluation oracle.
//!
//! A [`PerformanceVector`] is a named list of criteria, each carrying an
//! average, a variance, and a sample count (as produced by e.g.
//! cross-validation). One criterion is designated the *main* criterion and
//! drives every scalar fitness comparison; the full vector is used for
//! Pareto dominance in multi-objective mode.
//!
//! All criteria are **maximized**: higher averages are better.

use serde::{Deserialize, Serialize};

/// One evaluation criterion with distribution statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Criterion name (e.g. "accuracy").
    pub name: String,

    /// Mean value over the oracle's samples.
    pub average: f64,

    /// Variance over the oracle's samples.
    pub variance: f64,

    /// Number of samples behind `average` and `variance`.
    pub sample_count: u64,
}

impl Criterion {
    /// Creates a criterion from a single observation (variance 0, count 1).
    pub fn new(name: impl Into<String>, average: f64) -> Self {
        Self {
            name: name.into(),
            average,
            variance: 0.0,
            sample_count: 1,
        }
    }

    /// Creates a criterion with full distribution statistics.
    pub fn with_stats(
        name: impl Into<String>,
        average: f64,
        variance: f64,
        sample_count: u64,
    ) -> Self {
        Self {
            name: name.into(),
            average,
            variance,
            sample_count,
        }
    }
}

/// Named list of criteria with one designated main criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceVector {
    criteria: Vec<Criterion>,
    main: usize,
}

impl PerformanceVector {
    /// Creates a performance vector. The criterion at `main` drives scalar
    /// comparisons.
    ///
    /// # Panics
    /// Panics if `criteria` is empty or `main` is out of bounds.
    pub fn new(criteria: Vec<Criterion>, main: usize) -> Self {
        assert!(!criteria.is_empty(), "at least one criterion is required");
        assert!(main < criteria.len(), "main criterion index out of bounds");
        Self { criteria, main }
    }

    /// Convenience constructor for a single scalar criterion.
    pub fn single(name: impl Into<String>, value: f64) -> Self {
        Self::new(vec![Criterion::new(name, value)], 0)
    }

    /// All criteria, in declaration order.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// The designated main criterion.
    pub fn main_criterion(&self) -> &Criterion {
        &self.criteria[self.main]
    }

    /// Average of the main criterion; the scalar fitness of this vector.
    pub fn main_value(&self) -> f64 {
        self.criteria[self.main].average
    }

    /// Pareto dominance: `self` dominates `other` iff it is at least as
    /// good on every criterion and strictly better on at least one.
    ///
    /// Vectors with differing criterion counts never dominate each other.
    pub fn dominates(&self, other: &PerformanceVector) -> bool {
        if self.criteria.len() != other.criteria.len() {
            return false;
        }
        let mut strictly_better = false;
        for (a, b) in self.criteria.iter().zip(other.criteria.iter()) {
            if a.average < b.average {
                return false;
            }
            if a.average > b.average {
                strictly_better = true;
            }
        }
        strictly_better
    }

    /// Criterion averages as a plain vector, in declaration order.
    pub fn averages(&self) -> Vec<f64> {
        self.criteria.iter().map(|c| c.average).collect()
    }
}
