//! Whole-population selection schemes.
//!
//! Selection consumes the already-evaluated current generation and
//! produces the next one. All schemes maximize the main criterion; the
//! NSGA-II scheme ranks on the full performance vector instead.
//!
//! Tie-breaks are deterministic under a fixed seed: sorts are stable over
//! insertion order and winners are only replaced on strict improvement.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//!   Algorithm: NSGA-II"

use rand::Rng;

use crate::error::{Result, SearchError};
use crate::ga::candidate::{Candidate, Population};
use crate::ga::nsga;

/// Floor added to proportional weights so no candidate's probability is
/// exactly zero.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Temperature floor the dynamic Boltzmann schedule anneals toward.
const TEMPERATURE_FLOOR: f64 = 1.0;

/// Selection scheme for producing the next generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Keep the `n` best candidates, deterministic ties.
    Cut,

    /// Uniform sampling with replacement.
    Uniform,

    /// Fitness-proportional sampling; one independent uniform draw per
    /// pick. Susceptible to super-individual dominance.
    Roulette,

    /// Fitness-proportional sampling with `n` evenly spaced pointers from
    /// one random offset. Lower variance than [`Selection::Roulette`].
    StochasticUniversal,

    /// Proportional to rank position rather than raw fitness; avoids the
    /// scaling problems of roulette selection.
    Rank,

    /// Probability ∝ exp(fitness / T). With `dynamic`, T anneals linearly
    /// from `start_temperature` toward a floor over the configured
    /// generation budget, raising pressure over time.
    Boltzmann {
        start_temperature: f64,
        dynamic: bool,
    },

    /// Repeated tournaments of size `max(round(n · fraction), 1)`, drawn
    /// uniformly with replacement; the winner is the tournament's best.
    /// With `dynamic`, `fraction` grows linearly toward 1.0 over the
    /// generation budget.
    Tournament { fraction: f64, dynamic: bool },

    /// NSGA-II: successive Pareto fronts, the overflowing front truncated
    /// by descending crowding distance. Multi-objective; disables the
    /// max-fitness stop check.
    NonDominatedSort,

    /// Collapse the population to the single best-ever candidate.
    BestOnly,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament {
            fraction: 0.25,
            dynamic: false,
        }
    }
}

/// Per-generation context threaded into [`Selection::apply`] by the loop.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext {
    /// Size of the next generation.
    pub target_size: usize,

    /// Current generation index.
    pub generation: usize,

    /// Configured generation budget; drives the dynamic schedules.
    pub max_generations: usize,

    /// Whether sampling schemes seed the best-ever candidate first.
    pub keep_best: bool,
}

impl Selection {
    /// Checks scheme parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Selection::Boltzmann {
                start_temperature, ..
            } if !(start_temperature > 0.0) => Err(SearchError::Config(format!(
                "Boltzmann start_temperature {start_temperature} must be positive"
            ))),
            Selection::Tournament { fraction, .. } if !(0.0..=1.0).contains(&fraction) => {
                Err(SearchError::Config(format!(
                    "tournament fraction {fraction} is outside [0, 1]"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Whether this scheme ranks on the full performance vector. While
    /// active there is no single scalar maximum, so the loop disables its
    /// max-fitness stop check.
    pub fn is_multi_objective(&self) -> bool {
        matches!(self, Selection::NonDominatedSort)
    }

    /// Whether `keep_best` applies to this scheme. Cut and NSGA-II are
    /// already elitist; BestOnly is elitism taken to its extreme.
    pub fn supports_keep_best(&self) -> bool {
        !matches!(
            self,
            Selection::Cut | Selection::NonDominatedSort | Selection::BestOnly
        )
    }

    /// Replaces the population's current generation with the next one.
    pub fn apply<R: Rng>(&self, population: &mut Population, ctx: &SelectionContext, rng: &mut R) {
        if population.is_empty() && !matches!(self, Selection::BestOnly) {
            return;
        }

        let mut next: Vec<Candidate> = Vec::with_capacity(ctx.target_size);
        if ctx.keep_best && self.supports_keep_best() {
            if let Some(best) = population.best_ever() {
                next.push(best.clone());
            }
        }
        let remaining = ctx.target_size.saturating_sub(next.len());
        let members = population.members();

        match *self {
            Selection::Cut => {
                let mut sorted = members.to_vec();
                sorted.sort_by(|a, b| b.compare_fitness(a));
                sorted.truncate(ctx.target_size);
                next = sorted;
            }

            Selection::Uniform => {
                let weights = vec![1.0; members.len()];
                sample_with_replacement(members, &weights, remaining, rng, &mut next);
            }

            Selection::Roulette => {
                let weights = proportional_weights(members);
                sample_with_replacement(members, &weights, remaining, rng, &mut next);
            }

            Selection::StochasticUniversal => {
                let weights = proportional_weights(members);
                stochastic_universal(members, &weights, remaining, rng, &mut next);
            }

            Selection::Rank => {
                let weights = rank_weights(members);
                sample_with_replacement(members, &weights, remaining, rng, &mut next);
            }

            Selection::Boltzmann {
                start_temperature,
                dynamic,
            } => {
                let t = if dynamic {
                    let progress = schedule_progress(ctx);
                    start_temperature + (TEMPERATURE_FLOOR - start_temperature) * progress
                } else {
                    start_temperature
                };
                let weights = boltzmann_weights(members, t);
                sample_with_replacement(members, &weights, remaining, rng, &mut next);
            }

            Selection::Tournament { fraction, dynamic } => {
                let fraction = if dynamic {
                    fraction + (1.0 - fraction) * schedule_progress(ctx)
                } else {
                    fraction
                };
                let size = ((members.len() as f64 * fraction).round() as usize).max(1);
                for _ in 0..remaining {
                    let winner = tournament_round(members, size, rng);
                    next.push(members[winner].clone());
                }
            }

            Selection::NonDominatedSort => {
                next = nsga::select(members, ctx.target_size);
            }

            Selection::BestOnly => {
                next = population.best_ever().cloned().into_iter().collect();
            }
        }

        population.set_members(next);
    }
}

/// Fraction of the generation budget already spent, in `[0, 1]`.
fn schedule_progress(ctx: &SelectionContext) -> f64 {
    if ctx.max_generations == 0 {
        return 1.0;
    }
    (ctx.generation as f64 / ctx.max_generations as f64).min(1.0)
}

/// Scalar fitness per member; missing or NaN performance maps to the
/// worst observed value so it still carries minimal weight.
fn fitness_values(members: &[Candidate]) -> Vec<f64> {
    let valid_min = members
        .iter()
        .filter_map(Candidate::fitness)
        .filter(|f| !f.is_nan())
        .fold(f64::INFINITY, f64::min);
    let fallback = if valid_min.is_finite() { valid_min } else { 0.0 };

    members
        .iter()
        .map(|c| match c.fitness() {
            Some(f) if !f.is_nan() => f,
            _ => fallback,
        })
        .collect()
}

/// Fitness-proportional weights, shifted non-negative.
fn proportional_weights(members: &[Candidate]) -> Vec<f64> {
    let fitness = fitness_values(members);
    let min = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    fitness.iter().map(|f| f - min + WEIGHT_EPSILON).collect()
}

/// Linear rank weights: the worst candidate gets weight 1, the best
/// weight `n`.
fn rank_weights(members: &[Candidate]) -> Vec<f64> {
    let n = members.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| members[a].compare_fitness(&members[b]));

    let mut weights = vec![0.0; n];
    for (rank, &idx) in order.iter().enumerate() {
        weights[idx] = (rank + 1) as f64;
    }
    weights
}

/// Boltzmann weights exp(fitness / T), shifted by the maximum fitness so
/// the exponent never overflows.
fn boltzmann_weights(members: &[Candidate], temperature: f64) -> Vec<f64> {
    let fitness = fitness_values(members);
    let max = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    fitness
        .iter()
        .map(|f| ((f - max) / temperature).exp() + WEIGHT_EPSILON)
        .collect()
}

/// Draws `count` members with replacement, one independent uniform per
/// pick, probability proportional to `weights`.
fn sample_with_replacement<R: Rng>(
    members: &[Candidate],
    weights: &[f64],
    count: usize,
    rng: &mut R,
    out: &mut Vec<Candidate>,
) {
    let total: f64 = weights.iter().sum();
    for _ in 0..count {
        let idx = if total > 0.0 {
            pick_weighted(weights, total, rng)
        } else {
            rng.random_range(0..members.len())
        };
        out.push(members[idx].clone());
    }
}

/// One weighted pick: linear scan of the cumulative distribution.
fn pick_weighted<R: Rng>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }
    weights.len() - 1 // floating-point fallback
}

/// Stochastic universal sampling: `count` evenly spaced pointers from a
/// single random offset.
fn stochastic_universal<R: Rng>(
    members: &[Candidate],
    weights: &[f64],
    count: usize,
    rng: &mut R,
    out: &mut Vec<Candidate>,
) {
    if count == 0 {
        return;
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        for _ in 0..count {
            out.push(members[rng.random_range(0..members.len())].clone());
        }
        return;
    }

    let step = total / count as f64;
    let mut pointer = rng.random_range(0.0..step);
    let mut cumulative = 0.0;
    let mut idx = 0;
    for _ in 0..count {
        while cumulative + weights[idx] <= pointer && idx < weights.len() - 1 {
            cumulative += weights[idx];
            idx += 1;
        }
        out.push(members[idx].clone());
        pointer += step;
    }
}

/// One tournament: `size` uniform draws with replacement, winner = max
/// fitness. Only strict improvement replaces the leader, so earlier
/// draws win ties.
fn tournament_round<R: Rng>(members: &[Candidate], size: usize, rng: &mut R) -> usize {
    let mut winner = rng.random_range(0..members.len());
    for _ in 1..size {
        let challenger = rng.random_range(0..members.len());
        if members[challenger].compare_fitness(&members[winner]) == std::cmp::Ordering::Greater {
            winner = challenger;
        }
    }
    winner
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::PerformanceVector;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn evaluated(index: usize, len: usize, fitness: f64) -> Candidate {
        let mut mask = vec![false; len];
        mask[index] = true;
        let mut c = Candidate::from_mask(&mask);
        c.set_performance(PerformanceVector::single("score", fitness));
        c
    }

    fn population(fitnesses: &[f64]) -> Population {
        let mut pop = Population::new();
        for (i, &f) in fitnesses.iter().enumerate() {
            pop.add(evaluated(i, fitnesses.len(), f));
        }
        pop.update_best_ever();
        pop
    }

    fn ctx(target: usize) -> SelectionContext {
        SelectionContext {
            target_size: target,
            generation: 0,
            max_generations: 10,
            keep_best: false,
        }
    }

    fn selection_counts<R: Rng>(
        selection: Selection,
        fitnesses: &[f64],
        draws: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut counts = vec![0usize; fitnesses.len()];
        for _ in 0..draws {
            let mut pop = population(fitnesses);
            selection.apply(&mut pop, &ctx(1), rng);
            let chosen = &pop.members()[0];
            let idx = (0..fitnesses.len()).find(|&i| chosen.is_included(i)).unwrap();
            counts[idx] += 1;
        }
        counts
    }

    // ---- Cut ----

    #[test]
    fn test_cut_returns_exactly_n_highest() {
        let mut pop = population(&[0.1, 0.9, 0.5, 0.7, 0.3]);
        Selection::Cut.apply(&mut pop, &ctx(3), &mut ChaCha8Rng::seed_from_u64(42));

        let kept: Vec<f64> = pop.members().iter().map(|c| c.fitness().unwrap()).collect();
        assert_eq!(kept, vec![0.9, 0.7, 0.5]);
    }

    #[test]
    fn test_cut_breaks_ties_by_creation_order() {
        let mut pop = population(&[0.5, 0.9, 0.5, 0.5]);
        Selection::Cut.apply(&mut pop, &ctx(2), &mut ChaCha8Rng::seed_from_u64(42));

        assert_eq!(pop.len(), 2);
        assert!(pop.members()[0].is_included(1));
        // of the three tied 0.5 candidates, the earliest survives
        assert!(pop.members()[1].is_included(0));
    }

    // ---- Sampling schemes ----

    #[test]
    fn test_roulette_favors_best() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let counts = selection_counts(Selection::Roulette, &[0.1, 1.0, 0.2], 2000, &mut rng);
        assert!(counts[1] > counts[0]);
        assert!(counts[1] > counts[2]);
    }

    #[test]
    fn test_rank_favors_best() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let counts = selection_counts(Selection::Rank, &[100.0, 1.0, 50.0], 2000, &mut rng);
        assert!(counts[0] > counts[1]);
    }

    #[test]
    fn test_boltzmann_favors_best() {
        let scheme = Selection::Boltzmann {
            start_temperature: 1.0,
            dynamic: false,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let counts = selection_counts(scheme, &[0.0, 5.0, 1.0], 2000, &mut rng);
        assert!(counts[1] > counts[0]);
        assert!(counts[1] > counts[2]);
    }

    #[test]
    fn test_tournament_favors_best() {
        let scheme = Selection::Tournament {
            fraction: 1.0,
            dynamic: false,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let counts = selection_counts(scheme, &[0.2, 0.1, 0.9], 500, &mut rng);
        assert!(counts[2] > 300, "winner counts: {counts:?}");
    }

    #[test]
    fn test_uniform_is_roughly_even() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let counts = selection_counts(Selection::Uniform, &[9.0, 1.0, 5.0], 3000, &mut rng);
        for &c in &counts {
            assert!(c > 700, "expected roughly uniform, got {counts:?}");
        }
    }

    #[test]
    fn test_sus_returns_exact_count() {
        let mut pop = population(&[0.2, 0.4, 0.6, 0.8]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        Selection::StochasticUniversal.apply(&mut pop, &ctx(7), &mut rng);
        assert_eq!(pop.len(), 7);
    }

    #[test]
    fn test_keep_best_seeds_best_ever() {
        let mut pop = population(&[0.1, 0.9, 0.3]);
        let context = SelectionContext {
            keep_best: true,
            ..ctx(4)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        Selection::Uniform.apply(&mut pop, &context, &mut rng);

        assert_eq!(pop.len(), 4);
        assert!((pop.members()[0].fitness().unwrap() - 0.9).abs() < 1e-12);
    }

    // ---- BestOnly and NSGA ----

    #[test]
    fn test_best_only_collapses_population() {
        let mut pop = population(&[0.3, 0.8, 0.1]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        Selection::BestOnly.apply(&mut pop, &ctx(5), &mut rng);

        assert_eq!(pop.len(), 1);
        assert!((pop.members()[0].fitness().unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_non_dominated_sort_respects_target() {
        let mut pop = population(&[0.1, 0.2, 0.3, 0.4, 0.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        Selection::NonDominatedSort.apply(&mut pop, &ctx(2), &mut rng);
        assert_eq!(pop.len(), 2);
    }

    // ---- Dynamic schedules ----

    #[test]
    fn test_dynamic_tournament_pressure_grows() {
        // at the end of the budget the fraction reaches 1.0, so
        // tournaments are as large as the population and the best
        // candidate wins far more often than early in the run
        let scheme = Selection::Tournament {
            fraction: 0.25,
            dynamic: true,
        };
        let wins_at = |generation: usize| {
            let context = SelectionContext {
                target_size: 400,
                generation,
                max_generations: 10,
                keep_best: false,
            };
            let mut pop = population(&[0.1, 0.2, 0.9, 0.4]);
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            scheme.apply(&mut pop, &context, &mut rng);
            pop.members()
                .iter()
                .filter(|c| (c.fitness().unwrap() - 0.9).abs() < 1e-12)
                .count()
        };

        let early = wins_at(0);
        let late = wins_at(10);
        assert!(late > early, "pressure did not grow: {early} vs {late}");
    }

    // ---- Determinism ----

    #[test]
    fn test_fixed_seed_is_reproducible() {
        for scheme in [
            Selection::Roulette,
            Selection::StochasticUniversal,
            Selection::Rank,
            Selection::Tournament {
                fraction: 0.5,
                dynamic: false,
            },
        ] {
            let run = |seed: u64| {
                let mut pop = population(&[0.3, 0.1, 0.8, 0.5, 0.2]);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                scheme.apply(&mut pop, &ctx(5), &mut rng);
                pop.members()
                    .iter()
                    .map(|c| c.mask())
                    .collect::<Vec<_>>()
            };
            assert_eq!(run(7), run(7), "scheme {scheme:?} not reproducible");
        }
    }

    // ---- Validation ----

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(Selection::Boltzmann {
            start_temperature: 0.0,
            dynamic: true
        }
        .validate()
        .is_err());
        assert!(Selection::Tournament {
            fraction: 1.5,
            dynamic: false
        }
        .validate()
        .is_err());
        assert!(Selection::default().validate().is_ok());
    }
}
