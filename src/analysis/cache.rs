use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::outcome::AnalysisOutcome;

const LAST_OUTCOME_KEY: &str = "analysis:last";

/// Get the platform-appropriate cache directory for analysis results
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("monasib/results"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/monasib/results",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Remember the most recent successful analysis so `export`, `open` and
/// `report` can work on it from a later invocation.
pub fn store_last_outcome(cache_path: &Path, outcome: &AnalysisOutcome) -> Result<()> {
    let json = serde_json::to_vec(outcome).context("Failed to serialize analysis result")?;
    cacache::write_sync(cache_path, LAST_OUTCOME_KEY, &json)
        .context("Failed to write analysis result cache")?;
    Ok(())
}

/// Read the cached analysis. Missing or unreadable entries are treated as absent.
pub fn load_last_outcome(cache_path: &Path) -> Option<AnalysisOutcome> {
    let bytes = cacache::read_sync(cache_path, LAST_OUTCOME_KEY).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Forget the cached analysis.
pub fn clear_last_outcome(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove result cache"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::request::{AnalysisRequest, Criterion};
    use crate::analysis::response::AnalysisResponse;
    use std::collections::BTreeMap;

    fn temp_cache(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "monasib-cache-test-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn outcome() -> AnalysisOutcome {
        let mut criteria = BTreeMap::new();
        criteria.insert(
            "parking".to_string(),
            Criterion {
                value: 6,
                weight: 100,
            },
        );
        let request = AnalysisRequest {
            criteria,
            total_weight: 100,
        };
        let response: AnalysisResponse = serde_json::from_str(
            r#"{"best_location": {"coordinates": "40.7, -74.0", "suitability_score": 77.0}}"#,
        )
        .unwrap();
        AnalysisOutcome::merge(&request, response)
    }

    #[test]
    fn test_store_and_load_last_outcome() {
        let dir = temp_cache("roundtrip");
        assert!(load_last_outcome(&dir).is_none());

        let outcome = outcome();
        store_last_outcome(&dir, &outcome).unwrap();
        let loaded = load_last_outcome(&dir).unwrap();
        assert_eq!(loaded, outcome);

        clear_last_outcome(&dir).unwrap();
        assert!(load_last_outcome(&dir).is_none());
    }

    #[test]
    fn test_clear_missing_cache_is_ok() {
        let dir = temp_cache("missing");
        assert!(clear_last_outcome(&dir).is_ok());
    }
}
