//! The evaluation oracle contract and the attribute set it scores.
//!
//! The search engines never train or evaluate the downstream model
//! themselves. They hand a transient [`Subset`] projection of a fixed,
//! ordered, named [`AttributeSet`] to a user-supplied [`FitnessOracle`]
//! (typically a cross-validation wrapper) and receive a
//! [`PerformanceVector`] back.

use crate::error::Result;
use crate::performance::PerformanceVector;

/// A read-only, ordered, named attribute set of fixed size.
///
/// The search engines propose inclusion vectors over this set; the set
/// itself is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet {
    names: Vec<String>,
}

impl AttributeSet {
    /// Creates an attribute set from its ordered names.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Builds an attribute set from any iterable of name-like values.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Into::into).collect())
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the attribute at `index`.
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// All attribute names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A transient projection of an [`AttributeSet`] through an inclusion mask.
///
/// Borrowed by the oracle for the duration of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Subset<'a> {
    set: &'a AttributeSet,
    mask: &'a [bool],
}

impl<'a> Subset<'a> {
    /// Creates a projection. `mask.len()` must equal `set.len()`.
    pub fn new(set: &'a AttributeSet, mask: &'a [bool]) -> Self {
        debug_assert_eq!(set.len(), mask.len(), "mask length must match attribute count");
        Self { set, mask }
    }

    /// The underlying attribute set.
    pub fn attribute_set(&self) -> &AttributeSet {
        self.set
    }

    /// The raw inclusion mask, one flag per attribute.
    pub fn mask(&self) -> &[bool] {
        self.mask
    }

    /// Indices of the included attributes, ascending.
    pub fn indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect()
    }

    /// Names of the included attributes, in attribute order.
    pub fn names(&self) -> Vec<&'a str> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then(|| self.set.name(i)))
            .collect()
    }

    /// Number of included attributes.
    pub fn included_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}

/// External evaluation oracle.
///
/// Implementations score an attribute subset and return the resulting
/// performance distribution. Called once per unevaluated candidate per
/// generation (evolutionary) or once per tentative flip (greedy).
///
/// Evaluation must be deterministic for identical inputs within one run;
/// tie-break reproducibility depends on it.
///
/// # Thread safety
///
/// `Send + Sync` is required because the `parallel` feature evaluates
/// independent candidates of one generation concurrently.
pub trait FitnessOracle: Send + Sync {
    /// Evaluates one attribute subset.
    ///
    /// An error aborts the surrounding search immediately: no retry, no
    /// partial result beyond what was already committed.
    fn evaluate(&self, subset: &Subset<'_>) -> Result<PerformanceVector>;

    /// Progress notification in `[0, 1]`, reported by the greedy search.
    ///
    /// The default implementation is a no-op.
    fn on_progress(&self, _fraction: f64) {}
}
