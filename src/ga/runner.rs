//! The evolutionary loop.
//!
//! `INIT → EVALUATE → CHECK_STOP → [VARY → EVALUATE → SELECT] → …`
//!
//! Pre-evaluation operators (crossover, mutation, redundancy removal)
//! run before scoring; post-evaluation operators (the selection scheme,
//! the optional periodic checkpoint) after. The loop owns the single
//! seeded generator and all best-ever bookkeeping; a fixed seed yields
//! bit-identical runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::checkpoint::write_checkpoint;
use crate::error::Result;
use crate::ga::candidate::{Candidate, Population};
use crate::ga::config::{CardinalityBounds, EvolutionConfig};
use crate::ga::selection::SelectionContext;
use crate::ga::variation;
use crate::oracle::{AttributeSet, FitnessOracle, Subset};
use crate::performance::PerformanceVector;

/// Outcome of an evolutionary search run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// The best candidate ever evaluated.
    pub best: Candidate,

    /// The performance vector that justified `best`.
    pub performance: PerformanceVector,

    /// Names of the included attributes, in attribute order.
    pub selected: Vec<String>,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run stopped on the stagnation limit.
    pub stagnated: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best-ever main-criterion fitness after the initial evaluation and
    /// after each generation.
    pub fitness_history: Vec<f64>,
}

/// Executes the evolutionary subset search.
///
/// # Usage
///
/// ```ignore
/// let config = EvolutionConfig::default().with_seed(42);
/// let result = EvolutionRunner::run(&oracle, &attributes, &config)?;
/// println!("selected: {:?}", result.selected);
/// ```
pub struct EvolutionRunner;

impl EvolutionRunner {
    /// Runs the search to completion.
    pub fn run<O: FitnessOracle>(
        oracle: &O,
        attributes: &AttributeSet,
        config: &EvolutionConfig,
    ) -> Result<EvolutionResult> {
        Self::run_with_cancel(oracle, attributes, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// When the flag flips to `true`, the loop stops at the next
    /// generation boundary and returns the best candidate found so far,
    /// marked `cancelled`.
    pub fn run_with_cancel<O: FitnessOracle>(
        oracle: &O,
        attributes: &AttributeSet,
        config: &EvolutionConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<EvolutionResult> {
        config.validate(attributes.len())?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::random()),
        };

        // INIT
        let mut population = Population::new();
        for _ in 0..config.population_size {
            population.add(random_candidate(attributes.len(), &config.bounds, &mut rng));
        }
        variation::remove_duplicates(&mut population);

        // initial EVALUATE
        evaluate_population(oracle, attributes, &mut population)?;
        population.update_best_ever();

        let mut fitness_history = Vec::with_capacity(config.max_generations + 1);
        fitness_history.push(best_fitness(&population));

        let allow_max_fitness_stop = !config.selection.is_multi_objective();
        let mut cancelled = false;
        let mut stagnated = false;
        let mut generations = 0usize;

        for gen in 0..config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            // CHECK_STOP
            if population.is_empty() {
                warn!("population empty after generation {gen}; stopping");
                break;
            }
            if config.stagnation_limit > 0
                && population.generations_since_improvement() >= config.stagnation_limit
            {
                stagnated = true;
                break;
            }
            if allow_max_fitness_stop {
                if let Some(max) = config.max_fitness {
                    if best_fitness(&population) >= max {
                        debug!("max fitness {max} reached; stopping");
                        break;
                    }
                }
            }

            // VARY
            variation::crossover(
                &mut population,
                config.crossover_kind,
                config.crossover_probability,
                &config.bounds,
                &mut rng,
            );
            variation::mutate(
                &mut population,
                config.mutation_probability,
                &config.bounds,
                &mut rng,
            );
            variation::remove_duplicates(&mut population);

            // EVALUATE
            evaluate_population(oracle, attributes, &mut population)?;
            population.update_best_ever();
            fitness_history.push(best_fitness(&population));

            // SELECT
            let ctx = SelectionContext {
                target_size: config.population_size,
                generation: gen,
                max_generations: config.max_generations,
                keep_best: config.keep_best,
            };
            config.selection.apply(&mut population, &ctx, &mut rng);
            population.advance_generation();
            generations = population.generation();

            debug!(
                "generation {generations}: population {}, best {:.6}",
                population.len(),
                best_fitness(&population)
            );

            // periodic checkpoint of the best-ever candidate
            if config.checkpoint_interval > 0 && generations % config.checkpoint_interval == 0 {
                if let (Some(path), Some(best)) =
                    (config.checkpoint_path.as_deref(), population.best_ever())
                {
                    write_checkpoint(path, attributes, best.weights())?;
                }
            }
        }

        let best = population
            .best_ever()
            .cloned()
            .expect("initial population is evaluated before the loop");
        let performance = best
            .performance()
            .cloned()
            .expect("best-ever candidate carries its performance");
        let mask = best.mask();
        let selected = Subset::new(attributes, &mask)
            .names()
            .into_iter()
            .map(String::from)
            .collect();

        info!(
            "evolutionary search finished after {generations} generations, best {:.6}",
            performance.main_value()
        );

        Ok(EvolutionResult {
            best,
            performance,
            selected,
            generations,
            stagnated,
            cancelled,
            fitness_history,
        })
    }
}

/// Draws one random candidate satisfying the cardinality bounds: pick an
/// admissible included-count, then that many distinct positions.
fn random_candidate<R: Rng>(
    length: usize,
    bounds: &CardinalityBounds,
    rng: &mut R,
) -> Candidate {
    let count = match bounds.exact {
        Some(exact) => exact,
        None => {
            let min = bounds.min.unwrap_or(1).max(1);
            let max = bounds.max.unwrap_or(length).min(length);
            rng.random_range(min..=max)
        }
    };
    let mut mask = vec![false; length];
    for i in sample(rng, length, count.min(length)) {
        mask[i] = true;
    }
    Candidate::from_mask(&mask)
}

/// Best-ever main-criterion fitness, or NaN before any evaluation.
fn best_fitness(population: &Population) -> f64 {
    population
        .best_ever()
        .and_then(Candidate::fitness)
        .unwrap_or(f64::NAN)
}

/// Scores every unevaluated candidate through the oracle, once per
/// generation. Candidates with zero included attributes are never
/// evaluated. With the `parallel` feature the independent calls run
/// concurrently but results are merged back in candidate order, so a
/// failure or tie-break stays deterministic.
fn evaluate_population<O: FitnessOracle>(
    oracle: &O,
    attributes: &AttributeSet,
    population: &mut Population,
) -> Result<()> {
    let pending: Vec<usize> = population
        .members()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.performance().is_none() && c.used_count() > 0)
        .map(|(i, _)| i)
        .collect();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let masks: Vec<Vec<bool>> = pending
            .iter()
            .map(|&i| population.members()[i].mask())
            .collect();
        let results: Vec<Result<PerformanceVector>> = masks
            .par_iter()
            .map(|mask| oracle.evaluate(&Subset::new(attributes, mask)))
            .collect();
        for (&i, result) in pending.iter().zip(results) {
            population.members_mut()[i].set_performance(result?);
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        for i in pending {
            let mask = population.members()[i].mask();
            let performance = oracle.evaluate(&Subset::new(attributes, &mask))?;
            population.members_mut()[i].set_performance(performance);
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
