//! Per-candidate variation operators.
//!
//! All operators are additive: they append new candidates to the
//! population and never modify or remove their inputs. Offspring that
//! violate the configured [`CardinalityBounds`] (or would include zero
//! attributes) are dropped before they ever reach the oracle.
//!
//! Every random draw flows through the single seeded generator passed in
//! by the loop; the operators introduce no other entropy source.

use rand::seq::index::sample;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::ga::candidate::{Candidate, Population};
use crate::ga::config::CardinalityBounds;

/// How a crossed pair exchanges positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossoverKind {
    /// Random split index; the suffix is swapped.
    OnePoint,

    /// Each position is swapped independently with probability 0.5.
    #[default]
    Uniform,

    /// A random count `k ∈ [1, length]` of randomly chosen positions is
    /// swapped.
    Shuffle,
}

// ============================================================================
// Neighborhood operators
// ============================================================================

/// One new candidate per currently-excluded position, with that position
/// included. The input is unchanged.
pub fn forward_neighbors(candidate: &Candidate) -> Vec<Candidate> {
    (0..candidate.len())
        .filter(|&i| !candidate.is_included(i))
        .map(|i| {
            let mut neighbor = candidate.clone();
            neighbor.flip(i);
            neighbor
        })
        .collect()
}

/// One new candidate per currently-included position, with that position
/// excluded. Emissions that would zero out the inclusion count are
/// skipped; the input is unchanged.
pub fn backward_neighbors(candidate: &Candidate) -> Vec<Candidate> {
    if candidate.used_count() <= 1 {
        return Vec::new();
    }
    (0..candidate.len())
        .filter(|&i| candidate.is_included(i))
        .map(|i| {
            let mut neighbor = candidate.clone();
            neighbor.flip(i);
            neighbor
        })
        .collect()
}

// ============================================================================
// Mutation
// ============================================================================

/// Mutates every candidate of the current generation.
///
/// Each position flips independently with probability `probability`
/// (a negative value means `1 / length`). Mutation adds, never replaces:
/// the unmodified original stays in the population and the mutant is
/// appended, unless it violates `bounds`.
pub fn mutate<R: Rng>(
    population: &mut Population,
    probability: f64,
    bounds: &CardinalityBounds,
    rng: &mut R,
) {
    let mut mutants = Vec::new();
    for candidate in population.members() {
        let len = candidate.len();
        if len == 0 {
            continue;
        }
        let p = if probability < 0.0 {
            1.0 / len as f64
        } else {
            probability
        };

        let mut mutant = candidate.clone();
        for i in 0..len {
            if rng.random_range(0.0..1.0) < p {
                mutant.flip(i);
            }
        }
        if bounds.allows(mutant.used_count()) {
            mutants.push(mutant);
        }
    }
    for mutant in mutants {
        population.add(mutant);
    }
}

// ============================================================================
// Crossover
// ============================================================================

/// Crosses the current generation pairwise.
///
/// The population is shuffled and paired without replacement (an odd
/// remainder is dropped). Each pair is crossed with probability
/// `probability`; both offspring are cardinality-filtered and appended.
/// Non-crossed pairs contribute nothing new.
pub fn crossover<R: Rng>(
    population: &mut Population,
    kind: CrossoverKind,
    probability: f64,
    bounds: &CardinalityBounds,
    rng: &mut R,
) {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.shuffle(rng);

    let mut offspring = Vec::new();
    for pair in order.chunks_exact(2) {
        if rng.random_range(0.0..1.0) >= probability {
            continue;
        }
        let a = population.members()[pair[0]].weights();
        let b = population.members()[pair[1]].weights();
        if a.len() < 2 {
            continue;
        }

        let (wa, wb) = match kind {
            CrossoverKind::OnePoint => {
                let split = rng.random_range(1..a.len());
                cross_one_point(a, b, split)
            }
            CrossoverKind::Uniform => cross_uniform(a, b, rng),
            CrossoverKind::Shuffle => cross_shuffle(a, b, rng),
        };

        for weights in [wa, wb] {
            let child = Candidate::new(weights);
            if bounds.allows(child.used_count()) {
                offspring.push(child);
            }
        }
    }
    for child in offspring {
        population.add(child);
    }
}

/// Swaps the suffix starting at `split`. `0 < split < len`.
pub(crate) fn cross_one_point(a: &[f64], b: &[f64], split: usize) -> (Vec<f64>, Vec<f64>) {
    debug_assert!(split > 0 && split < a.len());
    let mut wa = a.to_vec();
    let mut wb = b.to_vec();
    wa[split..].copy_from_slice(&b[split..]);
    wb[split..].copy_from_slice(&a[split..]);
    (wa, wb)
}

/// Swaps each position independently with probability 0.5.
fn cross_uniform<R: Rng>(a: &[f64], b: &[f64], rng: &mut R) -> (Vec<f64>, Vec<f64>) {
    let mut wa = a.to_vec();
    let mut wb = b.to_vec();
    for i in 0..a.len() {
        if rng.random_bool(0.5) {
            wa[i] = b[i];
            wb[i] = a[i];
        }
    }
    (wa, wb)
}

/// Swaps `k ∈ [1, len]` randomly chosen positions.
fn cross_shuffle<R: Rng>(a: &[f64], b: &[f64], rng: &mut R) -> (Vec<f64>, Vec<f64>) {
    let len = a.len();
    let k = rng.random_range(1..=len);
    let mut wa = a.to_vec();
    let mut wb = b.to_vec();
    for i in sample(rng, len, k) {
        wa[i] = b[i];
        wb[i] = a[i];
    }
    (wa, wb)
}

// ============================================================================
// Redundancy removal
// ============================================================================

/// Deduplicates identical inclusion vectors; the first occurrence wins.
pub fn remove_duplicates(population: &mut Population) {
    let members = population.members().to_vec();
    let mut unique: Vec<Candidate> = Vec::with_capacity(members.len());
    for candidate in members {
        if !unique.iter().any(|kept| kept.same_subset(&candidate)) {
            unique.push(candidate);
        }
    }
    population.set_members(unique);
}

// ============================================================================
// Tests
// ============================================================================
