//! NSGA-II utilities: non-dominated sorting, crowding distance, and the
//! front-by-front truncation used by
//! [`Selection::NonDominatedSort`](crate::ga::Selection).
//!
//! Dominance is taken over the full [`PerformanceVector`]: candidate A
//! dominates B iff A is at least as good on every criterion and strictly
//! better on at least one (all criteria maximized). An unevaluated
//! candidate is dominated by every evaluated one.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//!   Algorithm: NSGA-II"

use crate::ga::candidate::Candidate;

/// Partitions candidates into successive Pareto fronts.
///
/// `fronts[0]` holds the indices of the non-dominated candidates, each
/// following front the candidates dominated only by earlier fronts.
/// Index order within a front follows input order, keeping tie-breaks
/// deterministic.
pub fn pareto_fronts(candidates: &[Candidate]) -> Vec<Vec<usize>> {
    let n = candidates.len();
    if n == 0 {
        return Vec::new();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut front_0 = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            if dominates(&candidates[i], &candidates[j]) {
                dominated_by[i].push(j);
                domination_count[j] += 1;
            } else if dominates(&candidates[j], &candidates[i]) {
                dominated_by[j].push(i);
                domination_count[i] += 1;
            }
        }
        if domination_count[i] == 0 {
            front_0.push(i);
        }
    }

    let mut fronts = vec![front_0];
    loop {
        let current = fronts.last().expect("fronts starts non-empty");
        let mut next = Vec::new();
        for &i in current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        next.sort_unstable();
        fronts.push(next);
    }
    fronts
}

/// Dominance over cached performance vectors. Unevaluated candidates are
/// dominated by any evaluated candidate and dominate nothing.
pub fn dominates(a: &Candidate, b: &Candidate) -> bool {
    match (a.performance(), b.performance()) {
        (Some(pa), Some(pb)) => pa.dominates(pb),
        (Some(_), None) => true,
        _ => false,
    }
}

/// Crowding distance of each member of one front.
///
/// For every criterion the front is sorted by its average; boundary
/// members receive infinite distance, interior members accumulate the
/// normalized gap between their neighbors. Returned in `front` order.
pub fn crowding_distances(candidates: &[Candidate], front: &[usize]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let objective_count = front
        .iter()
        .filter_map(|&i| candidates[i].performance())
        .map(|p| p.criteria().len())
        .next()
        .unwrap_or(0);
    if objective_count == 0 {
        return vec![f64::INFINITY; n];
    }

    let value = |member: usize, obj: usize| -> f64 {
        candidates[member]
            .performance()
            .map(|p| p.criteria()[obj].average)
            .unwrap_or(f64::NEG_INFINITY)
    };

    let mut distances = vec![0.0f64; n];
    for obj in 0..objective_count {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            value(front[a], obj)
                .partial_cmp(&value(front[b], obj))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        distances[order[0]] = f64::INFINITY;
        distances[order[n - 1]] = f64::INFINITY;

        let min = value(front[order[0]], obj);
        let max = value(front[order[n - 1]], obj);
        let range = max - min;
        if range > 0.0 {
            for k in 1..(n - 1) {
                let prev = value(front[order[k - 1]], obj);
                let next = value(front[order[k + 1]], obj);
                distances[order[k]] += (next - prev) / range;
            }
        }
    }
    distances
}

/// NSGA-II environmental selection: fills the next generation with whole
/// fronts in rank order; the front that would overflow `target` is
/// truncated by descending crowding distance to fill it exactly.
pub fn select(candidates: &[Candidate], target: usize) -> Vec<Candidate> {
    let mut next = Vec::with_capacity(target.min(candidates.len()));
    for front in pareto_fronts(candidates) {
        if next.len() + front.len() <= target {
            next.extend(front.iter().map(|&i| candidates[i].clone()));
            if next.len() == target {
                break;
            }
            continue;
        }

        // overflowing front: keep the most isolated members
        let distances = crowding_distances(candidates, &front);
        let mut order: Vec<usize> = (0..front.len()).collect();
        order.sort_by(|&a, &b| {
            distances[b]
                .partial_cmp(&distances[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for &k in order.iter().take(target - next.len()) {
            next.push(candidates[front[k]].clone());
        }
        break;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::{Criterion, PerformanceVector};

    fn cand(values: &[f64]) -> Candidate {
        let mut c = Candidate::from_mask(&vec![true; values.len().max(1)]);
        let criteria = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Criterion::new(format!("c{i}"), v))
            .collect();
        c.set_performance(PerformanceVector::new(criteria, 0));
        c
    }

    #[test]
    fn test_front_zero_is_mutually_non_dominated() {
        let pool = vec![
            cand(&[1.0, 5.0]),
            cand(&[3.0, 3.0]),
            cand(&[5.0, 1.0]),
            cand(&[2.0, 2.0]), // dominated by (3,3)
            cand(&[0.5, 0.5]), // dominated by everything
        ];
        let fronts = pareto_fronts(&pool);

        assert_eq!(fronts[0], vec![0, 1, 2]);
        for &i in &fronts[0] {
            for j in 0..pool.len() {
                assert!(
                    !dominates(&pool[j], &pool[i]),
                    "front-0 member {i} dominated by {j}"
                );
            }
        }
        // within one front, no pair dominates the other
        for front in &fronts {
            for &i in front {
                for &j in front {
                    assert!(!dominates(&pool[i], &pool[j]));
                }
            }
        }
    }

    #[test]
    fn test_chain_of_dominance_yields_singleton_fronts() {
        let pool = vec![cand(&[3.0, 3.0]), cand(&[2.0, 2.0]), cand(&[1.0, 1.0])];
        let fronts = pareto_fronts(&pool);
        assert_eq!(fronts, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_unevaluated_candidate_lands_in_last_front() {
        let pool = vec![
            cand(&[1.0, 1.0]),
            Candidate::from_mask(&[true]),
            cand(&[2.0, 2.0]),
        ];
        let fronts = pareto_fronts(&pool);
        assert_eq!(*fronts.last().unwrap(), vec![1]);
    }

    #[test]
    fn test_crowding_boundaries_are_infinite() {
        let pool = vec![
            cand(&[0.0, 4.0]),
            cand(&[1.0, 3.0]),
            cand(&[2.0, 2.0]),
            cand(&[3.0, 1.0]),
            cand(&[4.0, 0.0]),
        ];
        let front: Vec<usize> = (0..5).collect();
        let d = crowding_distances(&pool, &front);

        assert!(d[0].is_infinite());
        assert!(d[4].is_infinite());
        assert!(d[1].is_finite() && d[1] > 0.0);
        // evenly spaced interior members have equal distance
        assert!((d[1] - d[2]).abs() < 1e-12);
        assert!((d[2] - d[3]).abs() < 1e-12);
    }

    #[test]
    fn test_select_whole_fronts_in_order() {
        let pool = vec![
            cand(&[3.0, 3.0]), // front 0
            cand(&[1.0, 1.0]), // front 2
            cand(&[2.0, 2.0]), // front 1
        ];
        let chosen = select(&pool, 2);
        assert_eq!(chosen.len(), 2);
        assert!((chosen[0].fitness().unwrap() - 3.0).abs() < 1e-12);
        assert!((chosen[1].fitness().unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_select_truncates_overflowing_front_by_crowding() {
        // one five-member front, room for three: both boundaries survive
        let pool = vec![
            cand(&[0.0, 4.0]),
            cand(&[1.0, 3.0]),
            cand(&[2.0, 2.0]),
            cand(&[3.0, 1.0]),
            cand(&[4.0, 0.0]),
        ];
        let chosen = select(&pool, 3);
        assert_eq!(chosen.len(), 3);

        let mut firsts: Vec<f64> = chosen
            .iter()
            .map(|c| c.performance().unwrap().criteria()[0].average)
            .collect();
        firsts.sort_by(f64::total_cmp);
        assert_eq!(firsts[0], 0.0);
        assert_eq!(firsts[2], 4.0);
    }

    #[test]
    fn test_select_exact_fill() {
        let pool = vec![cand(&[1.0]), cand(&[2.0]), cand(&[3.0])];
        assert_eq!(select(&pool, 3).len(), 3);
        assert_eq!(select(&pool, 10).len(), 3);
    }
}
