//! The greedy sequential round loop.
//!
//! Works on a raw inclusion mask, no population involved. Each round
//! tentatively flips every attribute that is not yet in the target state,
//! scores the flipped mask through the oracle, restores it, and finally
//! commits the single best flip. The configured stopping rule decides
//! whether that flip counted as an improvement; once it first says no,
//! the speculative window opens.
//!
//! Speculation: up to `speculative_rounds` further rounds still commit
//! their best move. A round that strictly beats the performance recorded
//! when the window opened re-bases the window there and resets the fail
//! counter. If the budget is exhausted without such a round, every flip
//! committed since the window opened is rolled back and the search halts
//! at the pre-speculation state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::error::Result;
use crate::greedy::config::{Direction, GreedyConfig, StoppingBehavior};
use crate::greedy::significance::anova_p_value;
use crate::oracle::{AttributeSet, FitnessOracle, Subset};
use crate::performance::PerformanceVector;

/// Outcome of a greedy sequential search run.
#[derive(Debug, Clone)]
pub struct GreedyResult {
    /// Final committed inclusion mask.
    pub mask: Vec<bool>,

    /// Names of the included attributes, in attribute order.
    pub selected: Vec<String>,

    /// Performance of the final committed mask. `None` only when the run
    /// was cancelled before any round committed a move.
    pub performance: Option<PerformanceVector>,

    /// Number of rounds whose move survived into the final mask.
    pub rounds: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

/// Executes the greedy sequential subset search.
///
/// # Usage
///
/// ```ignore
/// let config = GreedyConfig::default().with_direction(Direction::Forward);
/// let result = GreedyRunner::run(&oracle, &attributes, &config)?;
/// println!("selected: {:?}", result.selected);
/// ```
pub struct GreedyRunner;

impl GreedyRunner {
    /// Runs the search to completion.
    pub fn run<O: FitnessOracle>(
        oracle: &O,
        attributes: &AttributeSet,
        config: &GreedyConfig,
    ) -> Result<GreedyResult> {
        Self::run_with_cancel(oracle, attributes, config, None)
    }

    /// Runs the search with an optional cancellation token, checked
    /// before every oracle call. On cancellation the current round is
    /// abandoned uncommitted and the best state so far is returned.
    pub fn run_with_cancel<O: FitnessOracle>(
        oracle: &O,
        attributes: &AttributeSet,
        config: &GreedyConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GreedyResult> {
        config.validate(attributes.len())?;

        let n = attributes.len();
        let target = matches!(config.direction, Direction::Forward);
        let mut mask = vec![!target; n];
        let max_rounds = if config.max_rounds == 0 {
            n
        } else {
            config.max_rounds
        };

        // Backward search has a scorable starting state; use it as the
        // baseline the first round must improve on. Forward search starts
        // empty, which is never evaluated, so its first round always
        // commits.
        let mut last_accepted: Option<PerformanceVector> = match config.direction {
            Direction::Backward => Some(oracle.evaluate(&Subset::new(attributes, &mask))?),
            Direction::Forward => None,
        };

        let mut committed_rounds = 0usize;
        let mut cancelled = false;

        // Speculation bookkeeping: the performance to beat, the flips
        // taken since the window opened, and the failed-round count.
        let mut speculation: Option<PerformanceVector> = None;
        let mut pending_flips: Vec<usize> = Vec::new();
        let mut fail_count = 0usize;

        'rounds: for round in 0..max_rounds {
            let mut best_flip: Option<(usize, PerformanceVector)> = None;

            for position in 0..n {
                if mask[position] == target {
                    continue;
                }
                if let Some(ref flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        cancelled = true;
                        break 'rounds;
                    }
                }
                oracle.on_progress((round * n + position) as f64 / (max_rounds * n) as f64);

                mask[position] = target;
                let included = mask.iter().filter(|&&b| b).count();
                if included == 0 {
                    mask[position] = !target;
                    continue;
                }
                let performance = oracle.evaluate(&Subset::new(attributes, &mask))?;
                mask[position] = !target;

                let better = match best_flip {
                    None => true,
                    Some((_, ref best)) => performance.main_value() > best.main_value(),
                };
                if better {
                    best_flip = Some((position, performance));
                }
            }

            let Some((position, performance)) = best_flip else {
                debug!("round {round}: no admissible flip left");
                break;
            };

            match speculation.as_ref().map(PerformanceVector::main_value) {
                None => {
                    if improves(&config.stopping, last_accepted.as_ref(), &performance)? {
                        mask[position] = target;
                        committed_rounds += 1;
                        debug!(
                            "round {round}: committed attribute {position}, best {:.6}",
                            performance.main_value()
                        );
                        last_accepted = Some(performance);
                    } else if config.speculative_rounds == 0 {
                        debug!("round {round}: stopping rule fired");
                        break;
                    } else {
                        // Open the speculative window; the triggering move
                        // is itself provisional.
                        debug!(
                            "round {round}: stopping rule fired, speculating for up to {} rounds",
                            config.speculative_rounds
                        );
                        mask[position] = target;
                        committed_rounds += 1;
                        pending_flips.push(position);
                        speculation = last_accepted.clone();
                        fail_count = 0;
                    }
                }
                Some(to_beat) => {
                    if performance.main_value() > to_beat {
                        // Re-base: the window's flips are vindicated.
                        mask[position] = target;
                        committed_rounds += 1;
                        debug!(
                            "round {round}: speculation recovered at {:.6}",
                            performance.main_value()
                        );
                        pending_flips.clear();
                        fail_count = 0;
                        speculation = Some(performance.clone());
                        last_accepted = Some(performance);
                    } else {
                        fail_count += 1;
                        if fail_count >= config.speculative_rounds {
                            for flip in pending_flips.drain(..) {
                                mask[flip] = !target;
                                committed_rounds -= 1;
                            }
                            last_accepted = speculation.take();
                            debug!("round {round}: speculation failed, rolled back");
                            break;
                        }
                        mask[position] = target;
                        committed_rounds += 1;
                        pending_flips.push(position);
                    }
                }
            }
        }

        // A window left open by round exhaustion or cancellation is
        // rolled back the same way.
        if speculation.is_some() {
            for flip in pending_flips.drain(..) {
                mask[flip] = !target;
                committed_rounds -= 1;
            }
            last_accepted = speculation.take();
        }

        let selected = Subset::new(attributes, &mask)
            .names()
            .into_iter()
            .map(String::from)
            .collect();

        if let Some(ref performance) = last_accepted {
            info!(
                "greedy search finished after {committed_rounds} committed rounds, best {:.6}",
                performance.main_value()
            );
        }

        Ok(GreedyResult {
            mask,
            selected,
            performance: last_accepted,
            rounds: committed_rounds,
            cancelled,
        })
    }
}

/// Applies the stopping rule: does `candidate` improve on `last` enough
/// to keep going? A round with no accepted predecessor always counts.
fn improves(
    stopping: &StoppingBehavior,
    last: Option<&PerformanceVector>,
    candidate: &PerformanceVector,
) -> Result<bool> {
    let Some(last) = last else {
        return Ok(true);
    };
    let gain = candidate.main_value() - last.main_value();

    match *stopping {
        StoppingBehavior::WithoutIncrease => Ok(gain > 0.0),
        StoppingBehavior::MinimumIncrease {
            threshold,
            relative,
        } => {
            let required = if relative {
                last.main_value().abs() * threshold
            } else {
                threshold
            };
            Ok(gain > required)
        }
        StoppingBehavior::SignificantIncrease { alpha } => {
            if gain <= 0.0 {
                return Ok(false);
            }
            let p = anova_p_value(last.main_criterion(), candidate.main_criterion())?;
            Ok(p < alpha)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
