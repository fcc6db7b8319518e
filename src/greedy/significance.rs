//! One-way ANOVA between two performance distributions.
//!
//! The greedy search only ever sees summary statistics (mean, variance,
//! sample count) of each round's cross-validated score, so the test is
//! computed from those sums rather than raw observations.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::error::{Result, SearchError};
use crate::performance::Criterion;

/// Computes the p-value of a one-way ANOVA between two groups given as
/// summary statistics.
///
/// `F = MS_between / MS_within` with 1 and `n1 + n2 - 2` degrees of
/// freedom. Degenerate input is a fatal [`SearchError::Significance`],
/// never a silent "not significant": both groups need at least two
/// samples and the pooled within-group variance must be nonzero.
pub fn anova_p_value(previous: &Criterion, current: &Criterion) -> Result<f64> {
    let n1 = previous.sample_count;
    let n2 = current.sample_count;
    if n1 < 2 || n2 < 2 {
        return Err(SearchError::Significance(format!(
            "need at least 2 samples per group, got {n1} and {n2}"
        )));
    }
    if previous.variance < 0.0 || current.variance < 0.0 {
        return Err(SearchError::Significance(format!(
            "negative variance ({} and {})",
            previous.variance, current.variance
        )));
    }

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let grand_mean = (n1f * previous.average + n2f * current.average) / (n1f + n2f);

    let ss_between = n1f * (previous.average - grand_mean).powi(2)
        + n2f * (current.average - grand_mean).powi(2);
    let ss_within = (n1f - 1.0) * previous.variance + (n2f - 1.0) * current.variance;
    let df_within = n1f + n2f - 2.0;

    if ss_within <= 0.0 {
        return Err(SearchError::Significance(
            "zero within-group variance, F statistic is undefined".into(),
        ));
    }

    let f_stat = ss_between / (ss_within / df_within);
    let dist = FisherSnedecor::new(1.0, df_within)
        .map_err(|e| SearchError::Significance(e.to_string()))?;

    Ok(1.0 - dist.cdf(f_stat))
}
