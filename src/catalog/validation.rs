use std::collections::HashSet;

use super::{Catalog, MAX_WEIGHT, MIN_WEIGHT};

/// Validate catalog definitions at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_catalog(catalog: &Catalog) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    if catalog.is_empty() {
        errors.push("catalog: no parameters defined".to_string());
    }

    for (i, def) in catalog.list().iter().enumerate() {
        if def.id.trim().is_empty() {
            errors.push(format!("catalog[{}].id: must not be empty", i));
        } else if !seen.insert(def.id) {
            errors.push(format!("catalog[{}].id: duplicate id '{}'", i, def.id));
        }

        if def.min > def.max {
            errors.push(format!(
                "catalog.{}: min {} is greater than max {}",
                def.id, def.min, def.max
            ));
        } else if !def.contains(def.default_value) {
            errors.push(format!(
                "catalog.{}.default_value: {} outside [{}, {}]",
                def.id, def.default_value, def.min, def.max
            ));
        }

        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&def.default_weight) {
            errors.push(format!(
                "catalog.{}.default_weight: {} outside [{}, {}]",
                def.id, def.default_weight, MIN_WEIGHT, MAX_WEIGHT
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
