use super::schema::Config;
use crate::catalog::{Catalog, MAX_WEIGHT, MIN_WEIGHT};

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config, catalog: &Catalog) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let url = config.service_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!(
            "service_url: '{}' must start with http:// or https://",
            config.service_url
        ));
    }

    if let Err(e) = humantime::parse_duration(&config.timeout) {
        errors.push(format!("timeout: invalid duration '{}' - {}", config.timeout, e));
    }

    for (id, preset) in &config.parameters {
        let def = match catalog.get(id) {
            Ok(def) => def,
            Err(_) => {
                errors.push(format!("parameters.{}: unknown parameter", id));
                continue;
            }
        };

        if let Some(value) = preset.value {
            if !def.contains(value) {
                errors.push(format!(
                    "parameters.{}.value: {} outside [{}, {}]",
                    id, value, def.min, def.max
                ));
            }
        }

        if let Some(weight) = preset.weight {
            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
                errors.push(format!(
                    "parameters.{}.weight: {} outside [{}, {}]",
                    id, weight, MIN_WEIGHT, MAX_WEIGHT
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
