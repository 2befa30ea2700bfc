use super::store::{ParameterState, ParameterStore};
use crate::catalog::Catalog;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

const SESSION_VERSION: u32 = 1;

/// On-disk snapshot of a parameter session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterState>,
}

impl SessionSnapshot {
    pub fn capture(store: &ParameterStore) -> Self {
        let parameters = store
            .iter()
            .map(|(def, state)| (def.id.to_string(), *state))
            .collect();
        Self {
            version: SESSION_VERSION,
            parameters,
        }
    }
}

/// Get the default session file path (~/.config/monasib/session.json)
pub fn get_session_path() -> PathBuf {
    crate::config::get_config_dir().join("session.json")
}

/// Load a saved session and rebuild the store from it.
///
/// Returns `Ok(None)` if the file doesn't exist. Every entry goes through the
/// store's validated setters, so a hand-edited file with out-of-range values
/// is rejected. Ids the catalog doesn't know are skipped with a warning.
pub fn load_session(path: &Path, catalog: &Catalog) -> Result<Option<ParameterStore>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open session file at {}", path.display()))?;

    let snapshot: SessionSnapshot =
        serde_json::from_reader(file).context("Failed to load session")?;

    if snapshot.version != SESSION_VERSION {
        anyhow::bail!("Unsupported session version: {}", snapshot.version);
    }

    let mut store = ParameterStore::initialize(catalog.clone());
    for (id, state) in &snapshot.parameters {
        if catalog.get(id).is_err() {
            crate::diag_warn!("Skipping unknown parameter '{}' in {}", id, path.display());
            continue;
        }
        store
            .set_value(id, state.value)
            .and_then(|_| store.set_weight(id, state.weight))
            .and_then(|_| store.set_active(id, state.active))
            .with_context(|| format!("Invalid session entry for '{}'", id))?;
    }

    Ok(Some(store))
}

/// Save the session atomically, creating the parent directory if needed.
pub fn save_session(path: &Path, store: &ParameterStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory at {}", parent.display())
            })?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, &SessionSnapshot::capture(store))
        .context("Failed to serialize session")?;

    file.commit().context("Failed to save session")?;

    Ok(())
}

/// Delete the saved session. A missing file is not an error.
pub fn clear_session(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove session file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_missing_file_returns_none() {
        let temp_path = env::temp_dir().join("monasib_test_session_missing.json");
        let _ = std::fs::remove_file(&temp_path);

        let loaded = load_session(&temp_path, &Catalog::restaurant()).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("monasib_test_session_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut store = ParameterStore::initialize(Catalog::restaurant());
        store.toggle("competitors").unwrap();
        store.set_value("competitors", 900).unwrap();
        store.set_weight("safety_level", 3).unwrap();

        save_session(&temp_path, &store).unwrap();
        let loaded = load_session(&temp_path, &Catalog::restaurant())
            .unwrap()
            .unwrap();

        let competitors = loaded.get("competitors").unwrap();
        assert!(competitors.active);
        assert_eq!(competitors.value, 900);
        assert_eq!(loaded.get("safety_level").unwrap().weight, 3);
        assert_eq!(loaded.total_weight(), 15);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unsupported_version_is_error() {
        let temp_path = env::temp_dir().join("monasib_test_session_version.json");
        std::fs::write(&temp_path, r#"{"version": 7, "parameters": {}}"#).unwrap();

        let err = load_session(&temp_path, &Catalog::restaurant()).unwrap_err();
        assert!(err.to_string().contains("Unsupported session version"));

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_out_of_range_entry_is_rejected() {
        let temp_path = env::temp_dir().join("monasib_test_session_range.json");
        std::fs::write(
            &temp_path,
            r#"{"version": 1, "parameters": {"parking": {"active": true, "value": 42, "weight": 10}}}"#,
        )
        .unwrap();

        let err = load_session(&temp_path, &Catalog::restaurant()).unwrap_err();
        assert!(err.to_string().contains("parking"));

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unknown_ids_are_skipped() {
        let temp_path = env::temp_dir().join("monasib_test_session_unknown.json");
        std::fs::write(
            &temp_path,
            r#"{"version": 1, "parameters": {"helipad": {"active": true, "value": 1, "weight": 10}}}"#,
        )
        .unwrap();

        let loaded = load_session(&temp_path, &Catalog::restaurant())
            .unwrap()
            .unwrap();
        assert_eq!(loaded.active_count(), 0);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_clear_missing_session_is_ok() {
        let temp_path = env::temp_dir().join("monasib_test_session_clear.json");
        let _ = std::fs::remove_file(&temp_path);
        assert!(clear_session(&temp_path).is_ok());
    }
}
