//! Crate-wide error type.
//!
//! All fatal failures surface as [`SearchError`]; non-fatal anomalies
//! (empty population after selection, unreachable cardinality target)
//! terminate the run normally and report the best candidate found instead
//! of raising.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the search engines.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Invalid configuration, detected before the search starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The external evaluation oracle failed. Aborts the search
    /// immediately; no partial result is synthesized.
    #[error("oracle evaluation failed: {source}")]
    Oracle {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Degenerate statistics in the ANOVA significance test
    /// (zero variance, sample count below two). Never treated as
    /// "not significant".
    #[error("significance test failed: {0}")]
    Significance(String),

    /// Writing the checkpoint file failed. Fatal, but already-computed
    /// search state is left intact.
    #[error("cannot write checkpoint to {path}: {source}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checkpoint serialization failed.
    #[error("checkpoint serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SearchError {
    /// Wraps an arbitrary error as an oracle evaluation failure.
    pub fn oracle<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        SearchError::Oracle {
            source: source.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SearchError>;
