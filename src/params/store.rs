use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::catalog::{Catalog, ParameterDefinition, MAX_WEIGHT, MIN_WEIGHT};
use crate::config::ParameterPreset;
use crate::error::{ModelError, RangeField};

/// Mutable per-parameter state for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterState {
    pub active: bool,
    pub value: i64,
    pub weight: u32,
}

/// Owns the state of every catalog parameter, keyed by id.
///
/// All mutations go through validated setters, so every value stays inside
/// its definition's bounds and every weight inside `[MIN_WEIGHT, MAX_WEIGHT]`
/// regardless of whether the parameter is active.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    catalog: Catalog,
    states: HashMap<&'static str, ParameterState>,
}

impl ParameterStore {
    /// Build fresh state from catalog defaults: everything inactive.
    pub fn initialize(catalog: Catalog) -> Self {
        let states = default_states(&catalog);
        Self { catalog, states }
    }

    /// Replace all state with catalog defaults.
    pub fn reset(&mut self) {
        self.states = default_states(&self.catalog);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn get(&self, id: &str) -> Result<&ParameterState, ModelError> {
        self.states
            .get(id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut ParameterState, ModelError> {
        self.states
            .get_mut(id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    /// Definitions paired with their state, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParameterDefinition, &ParameterState)> {
        self.catalog
            .list()
            .iter()
            .filter_map(|def| self.states.get(def.id).map(|state| (def, state)))
    }

    /// Flip `active` for `id` and return the new flag.
    pub fn toggle(&mut self, id: &str) -> Result<bool, ModelError> {
        let state = self.get_mut(id)?;
        state.active = !state.active;
        Ok(state.active)
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> Result<(), ModelError> {
        self.get_mut(id)?.active = active;
        Ok(())
    }

    pub fn set_value(&mut self, id: &str, new_value: i64) -> Result<(), ModelError> {
        let def = self.catalog.get(id)?;
        if !def.contains(new_value) {
            return Err(ModelError::OutOfRange {
                id: id.to_string(),
                field: RangeField::Value,
                min: def.min,
                max: def.max,
                got: new_value,
            });
        }
        self.get_mut(id)?.value = new_value;
        Ok(())
    }

    pub fn set_weight(&mut self, id: &str, new_weight: u32) -> Result<(), ModelError> {
        // Resolve the id first so unknown ids report NotFound, not OutOfRange
        self.get(id)?;
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&new_weight) {
            return Err(ModelError::OutOfRange {
                id: id.to_string(),
                field: RangeField::Weight,
                min: i64::from(MIN_WEIGHT),
                max: i64::from(MAX_WEIGHT),
                got: i64::from(new_weight),
            });
        }
        self.get_mut(id)?.weight = new_weight;
        Ok(())
    }

    /// Move the value by `delta`, clamped to the definition's bounds.
    pub fn adjust_value(&mut self, id: &str, delta: i64) -> Result<i64, ModelError> {
        let def = self.catalog.get(id)?;
        let current = self.get(id)?.value;
        let next = def.clamp(current.saturating_add(delta));
        self.set_value(id, next)?;
        Ok(next)
    }

    /// Move the weight by `delta`, clamped to `[MIN_WEIGHT, MAX_WEIGHT]`.
    pub fn adjust_weight(&mut self, id: &str, delta: i64) -> Result<u32, ModelError> {
        let current = i64::from(self.get(id)?.weight);
        let clamped = current
            .saturating_add(delta)
            .clamp(i64::from(MIN_WEIGHT), i64::from(MAX_WEIGHT));
        let next = u32::try_from(clamped).unwrap_or(MIN_WEIGHT);
        self.set_weight(id, next)?;
        Ok(next)
    }

    /// Sum of weights over active parameters (0 when none are active).
    pub fn total_weight(&self) -> u32 {
        self.states
            .values()
            .filter(|state| state.active)
            .map(|state| state.weight)
            .sum()
    }

    pub fn active_count(&self) -> usize {
        self.states.values().filter(|state| state.active).count()
    }

    /// Apply configured presets through the validated setters.
    ///
    /// Stops at the first failure; presets applied before it stay applied.
    pub fn apply_presets(
        &mut self,
        presets: &BTreeMap<String, ParameterPreset>,
    ) -> Result<(), ModelError> {
        for (id, preset) in presets {
            if let Some(value) = preset.value {
                self.set_value(id, value)?;
            }
            if let Some(weight) = preset.weight {
                self.set_weight(id, weight)?;
            }
            if let Some(active) = preset.active {
                self.set_active(id, active)?;
            }
        }
        Ok(())
    }
}

fn default_states(catalog: &Catalog) -> HashMap<&'static str, ParameterState> {
    catalog
        .list()
        .iter()
        .map(|def| {
            (
                def.id,
                ParameterState {
                    active: false,
                    value: def.default_value,
                    weight: def.default_weight,
                },
            )
        })
        .collect()
}
