use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8888";
pub const DEFAULT_TIMEOUT: &str = "30s";
pub const DEFAULT_RETRIES: usize = 2;

/// Application configuration.
///
/// Example YAML:
/// ```yaml
/// service_url: "http://127.0.0.1:8888"
/// timeout: "30s"
/// retries: 2
/// export_dir: "exports"
/// theme: auto
/// parameters:
///   competitors: { active: true, weight: 25 }
///   foot_traffic: { active: true, value: 8, weight: 30 }
///   public_transport: { active: true, weight: 20 }
///   rent_cost: { active: true, weight: 25 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the scoring service
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Per-request timeout, humantime format (e.g. "30s", "2m")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Extra attempts for connection failures and timeouts
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Where exported files are written (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    #[serde(default)]
    pub theme: ThemeMode,

    /// Starting state per parameter id, applied over catalog defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterPreset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            timeout: default_timeout(),
            retries: DEFAULT_RETRIES,
            export_dir: None,
            theme: ThemeMode::default(),
            parameters: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parsed request timeout. Falls back to the default when the configured
    /// string is invalid (validation reports that separately at startup).
    pub fn request_timeout(&self) -> std::time::Duration {
        humantime::parse_duration(&self.timeout)
            .unwrap_or_else(|_| std::time::Duration::from_secs(30))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Starting state for one parameter. Unset fields keep catalog defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParameterPreset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

/// Theme selection for the TUI.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

fn default_retries() -> usize {
    DEFAULT_RETRIES
}
