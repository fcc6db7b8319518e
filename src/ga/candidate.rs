//! Candidates and the population container.
//!
//! A [`Candidate`] is one proposed attribute subset: a fixed-length vector
//! of inclusion weights with boolean semantics (included iff weight > 0),
//! plus the cached [`PerformanceVector`] once the oracle has scored it.
//! Weights are stored as reals to keep mutation arithmetic simple.
//!
//! The [`Population`] owns the current generation's candidates together
//! with the best-ever candidate and the stagnation counter. Best-ever
//! bookkeeping is driven by the owning loop, once per generation.

use std::cmp::Ordering;

use crate::performance::PerformanceVector;

/// One proposed attribute subset with cached fitness.
#[derive(Debug, Clone)]
pub struct Candidate {
    weights: Vec<f64>,
    performance: Option<PerformanceVector>,
}

impl Candidate {
    /// Creates an unevaluated candidate from raw inclusion weights.
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            performance: None,
        }
    }

    /// Creates an unevaluated candidate from a boolean inclusion mask.
    pub fn from_mask(mask: &[bool]) -> Self {
        Self::new(mask.iter().map(|&m| if m { 1.0 } else { 0.0 }).collect())
    }

    /// Vector length; fixed for the whole run.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the weight vector is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Raw inclusion weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Whether the attribute at `index` is included.
    pub fn is_included(&self, index: usize) -> bool {
        self.weights[index] > 0.0
    }

    /// Flips the inclusion state of one position.
    pub fn flip(&mut self, index: usize) {
        self.weights[index] = if self.is_included(index) { 0.0 } else { 1.0 };
        self.performance = None;
    }

    /// Boolean inclusion mask derived from the weights.
    pub fn mask(&self) -> Vec<bool> {
        self.weights.iter().map(|&w| w > 0.0).collect()
    }

    /// Number of included attributes.
    pub fn used_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w > 0.0).count()
    }

    /// Cached performance, if the oracle has evaluated this candidate.
    pub fn performance(&self) -> Option<&PerformanceVector> {
        self.performance.as_ref()
    }

    /// Stores the oracle's verdict.
    pub fn set_performance(&mut self, performance: PerformanceVector) {
        self.performance = Some(performance);
    }

    /// Main-criterion fitness, if evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.performance.as_ref().map(|p| p.main_value())
    }

    /// Identity comparison: two candidates are the same subset iff their
    /// inclusion vectors match position by position.
    pub fn same_subset(&self, other: &Candidate) -> bool {
        self.len() == other.len()
            && self
                .weights
                .iter()
                .zip(other.weights.iter())
                .all(|(a, b)| (*a > 0.0) == (*b > 0.0))
    }

    /// Orders by main-criterion fitness. Missing or NaN performance sorts
    /// lowest; equal fitness compares `Equal` so that stable sorts break
    /// ties by creation order.
    pub fn compare_fitness(&self, other: &Candidate) -> Ordering {
        match (normal_fitness(self), normal_fitness(other)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }
}

/// Fitness filtered to comparable values; NaN counts as missing.
fn normal_fitness(c: &Candidate) -> Option<f64> {
    c.fitness().filter(|f| !f.is_nan())
}

/// The set of candidates under consideration in the current generation.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<Candidate>,
    generation: usize,
    best_ever: Option<Candidate>,
    stale_generations: usize,
}

impl Population {
    /// Creates an empty population at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one candidate to the current generation.
    pub fn add(&mut self, candidate: Candidate) {
        self.members.push(candidate);
    }

    /// Removes every candidate from the current generation. The best-ever
    /// candidate is retained.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Replaces the current generation wholesale (used by selection).
    pub fn set_members(&mut self, members: Vec<Candidate>) {
        self.members = members;
    }

    /// Current generation's candidates.
    pub fn members(&self) -> &[Candidate] {
        &self.members
    }

    /// Mutable access for evaluation.
    pub fn members_mut(&mut self) -> &mut [Candidate] {
        &mut self.members
    }

    /// Number of candidates in the current generation.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the current generation is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sorts the current generation best-first. The sort is stable, so
    /// ties keep creation order.
    pub fn sort(&mut self) {
        self.members.sort_by(|a, b| b.compare_fitness(a));
    }

    /// Index of the current generation.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Advances the generation counter by one.
    pub fn advance_generation(&mut self) {
        self.generation += 1;
    }

    /// The best candidate ever seen, retained even after it was dropped
    /// from the active set.
    pub fn best_ever(&self) -> Option<&Candidate> {
        self.best_ever.as_ref()
    }

    /// Generations elapsed since the last best-ever improvement.
    pub fn generations_since_improvement(&self) -> usize {
        self.stale_generations
    }

    /// Once-per-generation bookkeeping: compares every member against the
    /// stored best-ever and keeps the winner. Strict improvement only, so
    /// the earliest candidate wins ties. Returns whether a new best was
    /// found; the stagnation counter is reset on improvement and
    /// incremented otherwise.
    pub fn update_best_ever(&mut self) -> bool {
        let mut improved = false;
        for member in &self.members {
            let better = match &self.best_ever {
                Some(best) => member.compare_fitness(best) == Ordering::Greater,
                None => member.fitness().is_some(),
            };
            if better {
                self.best_ever = Some(member.clone());
                improved = true;
            }
        }
        if improved {
            self.stale_generations = 0;
        } else {
            self.stale_generations += 1;
        }
        improved
    }

    /// Explicitly forgets the best-ever candidate and the stagnation
    /// counter. The only way best-ever is ever lost.
    pub fn reset_best_ever(&mut self) {
        self.best_ever = None;
        self.stale_generations = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::PerformanceVector;

    fn evaluated(mask: &[bool], fitness: f64) -> Candidate {
        let mut c = Candidate::from_mask(mask);
        c.set_performance(PerformanceVector::single("score", fitness));
        c
    }

    #[test]
    fn test_used_count_and_mask() {
        let c = Candidate::from_mask(&[true, false, true]);
        assert_eq!(c.used_count(), 2);
        assert_eq!(c.mask(), vec![true, false, true]);
        assert!(c.is_included(0));
        assert!(!c.is_included(1));
    }

    #[test]
    fn test_flip_invalidates_performance() {
        let mut c = evaluated(&[true, false], 1.0);
        assert!(c.performance().is_some());
        c.flip(1);
        assert!(c.performance().is_none());
        assert!(c.is_included(1));
    }

    #[test]
    fn test_unevaluated_sorts_lowest() {
        let good = evaluated(&[true], 1.0);
        let missing = Candidate::from_mask(&[true]);
        assert_eq!(good.compare_fitness(&missing), Ordering::Greater);
        assert_eq!(missing.compare_fitness(&good), Ordering::Less);
    }

    #[test]
    fn test_nan_sorts_lowest() {
        let good = evaluated(&[true], 0.0);
        let nan = evaluated(&[true], f64::NAN);
        assert_eq!(good.compare_fitness(&nan), Ordering::Greater);
    }

    #[test]
    fn test_same_subset_ignores_weight_magnitude() {
        let a = Candidate::new(vec![0.5, 0.0]);
        let b = Candidate::new(vec![1.0, 0.0]);
        assert!(a.same_subset(&b));
        assert!(!a.same_subset(&Candidate::new(vec![0.0, 1.0])));
    }

    #[test]
    fn test_best_ever_monotone_across_add_and_clear() {
        let mut pop = Population::new();
        let mut last_best = f64::NEG_INFINITY;

        for fitness in [0.5, 0.2, 0.9, 0.1, 0.9, 0.3] {
            pop.add(evaluated(&[true], fitness));
            pop.update_best_ever();
            pop.clear();

            let best = pop.best_ever().and_then(Candidate::fitness).unwrap();
            assert!(best >= last_best, "best-ever regressed: {best} < {last_best}");
            last_best = best;
        }
        assert!((last_best - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_stagnation_counter_resets_on_improvement() {
        let mut pop = Population::new();
        pop.add(evaluated(&[true], 1.0));
        assert!(pop.update_best_ever());
        assert_eq!(pop.generations_since_improvement(), 0);

        pop.clear();
        pop.add(evaluated(&[true], 0.5));
        assert!(!pop.update_best_ever());
        assert_eq!(pop.generations_since_improvement(), 1);

        pop.clear();
        pop.add(evaluated(&[true], 2.0));
        assert!(pop.update_best_ever());
        assert_eq!(pop.generations_since_improvement(), 0);
    }

    #[test]
    fn test_equal_fitness_is_not_improvement() {
        let mut pop = Population::new();
        pop.add(evaluated(&[true, false], 1.0));
        pop.update_best_ever();

        pop.clear();
        pop.add(evaluated(&[false, true], 1.0));
        assert!(!pop.update_best_ever());
        // the earlier candidate is kept
        assert!(pop.best_ever().unwrap().is_included(0));
    }

    #[test]
    fn test_sort_best_first() {
        let mut pop = Population::new();
        pop.add(evaluated(&[true], 0.3));
        pop.add(evaluated(&[true], 0.9));
        pop.add(Candidate::from_mask(&[true]));
        pop.sort();

        assert!((pop.members()[0].fitness().unwrap() - 0.9).abs() < 1e-12);
        assert!(pop.members()[2].fitness().is_none());
    }

    #[test]
    fn test_reset_best_ever() {
        let mut pop = Population::new();
        pop.add(evaluated(&[true], 1.0));
        pop.update_best_ever();
        pop.reset_best_ever();
        assert!(pop.best_ever().is_none());
        assert_eq!(pop.generations_since_improvement(), 0);
    }
}
