//! Periodic checkpoint sink for the evolutionary search.
//!
//! Every N generations the loop serializes the best-ever candidate as a
//! `{attribute_name: weight}` JSON object to a configured path. A write
//! failure is fatal and names both path and cause, but already-computed
//! search state stays intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SearchError};
use crate::oracle::AttributeSet;

/// Writes the `{attribute_name: weight}` map for one inclusion-weight
/// vector to `path` as pretty-printed JSON.
///
/// `weights.len()` must equal `attributes.len()`. Attribute order is not
/// preserved in the output; keys are sorted for stable diffs.
pub fn write_checkpoint(path: &Path, attributes: &AttributeSet, weights: &[f64]) -> Result<()> {
    debug_assert_eq!(attributes.len(), weights.len());

    let map: BTreeMap<&str, f64> = attributes
        .names()
        .iter()
        .map(String::as_str)
        .zip(weights.iter().copied())
        .collect();

    let json = serde_json::to_string_pretty(&map)?;
    fs::write(path, json).map_err(|source| SearchError::Checkpoint {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let set = AttributeSet::from_names(["alpha", "beta", "gamma"]);

        write_checkpoint(&path, &set, &[1.0, 0.0, 1.0]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let map: BTreeMap<String, f64> = serde_json::from_str(&text).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["alpha"], 1.0);
        assert_eq!(map["beta"], 0.0);
        assert_eq!(map["gamma"], 1.0);
    }

    #[test]
    fn test_checkpoint_write_failure_names_path() {
        let set = AttributeSet::from_names(["a"]);
        let path = Path::new("/nonexistent-dir/weights.json");

        let err = write_checkpoint(path, &set, &[1.0]).unwrap_err();
        match err {
            SearchError::Checkpoint { path, .. } => {
                assert!(path.to_string_lossy().contains("nonexistent-dir"));
            }
            other => panic!("expected checkpoint error, got {other}"),
        }
    }
}
