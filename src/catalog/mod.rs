mod definition;
pub mod validation;

pub use definition::{ParameterDefinition, ParameterKind};
pub use validation::validate_catalog;

use crate::error::ModelError;

/// Lowest weight an individual parameter may carry.
pub const MIN_WEIGHT: u32 = 1;
/// Highest weight an individual parameter may carry.
pub const MAX_WEIGHT: u32 = 30;
/// Active weights must add up to exactly this before submission.
pub const REQUIRED_TOTAL_WEIGHT: u32 = 100;

const RESTAURANT_PARAMETERS: [ParameterDefinition; 10] = [
    ParameterDefinition {
        id: "competitors",
        name: "Competitors Distance",
        description: "Distance from nearest competing restaurants",
        kind: ParameterKind::Distance,
        unit: "meters",
        min: 50,
        max: 2000,
        default_value: 500,
        default_weight: 15,
        inverted: false,
    },
    ParameterDefinition {
        id: "foot_traffic",
        name: "Foot Traffic Density",
        description: "Pedestrian traffic intensity in the area",
        kind: ParameterKind::Scale,
        unit: "density",
        min: 1,
        max: 10,
        default_value: 7,
        default_weight: 20,
        inverted: false,
    },
    ParameterDefinition {
        id: "public_transport",
        name: "Public Transport Access",
        description: "Proximity to public transportation",
        kind: ParameterKind::Distance,
        unit: "meters",
        min: 100,
        max: 1000,
        default_value: 300,
        default_weight: 12,
        inverted: false,
    },
    ParameterDefinition {
        id: "parking",
        name: "Parking Availability",
        description: "Available parking spaces nearby",
        kind: ParameterKind::Scale,
        unit: "availability",
        min: 1,
        max: 10,
        default_value: 6,
        default_weight: 10,
        inverted: false,
    },
    ParameterDefinition {
        id: "rent_cost",
        name: "Rental Cost",
        description: "Commercial rent prices in the area",
        kind: ParameterKind::Scale,
        unit: "cost_level",
        min: 1,
        max: 10,
        default_value: 5,
        default_weight: 18,
        inverted: true,
    },
    ParameterDefinition {
        id: "population_density",
        name: "Population Density",
        description: "Residential population density",
        kind: ParameterKind::Scale,
        unit: "people/km²",
        min: 1,
        max: 10,
        default_value: 7,
        default_weight: 15,
        inverted: false,
    },
    ParameterDefinition {
        id: "office_buildings",
        name: "Office Buildings Proximity",
        description: "Distance to business districts",
        kind: ParameterKind::Distance,
        unit: "meters",
        min: 100,
        max: 2000,
        default_value: 800,
        default_weight: 8,
        inverted: false,
    },
    ParameterDefinition {
        id: "shopping_centers",
        name: "Shopping Centers",
        description: "Proximity to shopping areas",
        kind: ParameterKind::Distance,
        unit: "meters",
        min: 200,
        max: 1500,
        default_value: 600,
        default_weight: 10,
        inverted: false,
    },
    ParameterDefinition {
        id: "safety_level",
        name: "Safety Level",
        description: "Crime rate and safety index",
        kind: ParameterKind::Scale,
        unit: "safety_index",
        min: 1,
        max: 10,
        default_value: 8,
        default_weight: 7,
        inverted: false,
    },
    ParameterDefinition {
        id: "visibility",
        name: "Street Visibility",
        description: "How visible the location is from street",
        kind: ParameterKind::Scale,
        unit: "visibility",
        min: 1,
        max: 10,
        default_value: 8,
        default_weight: 5,
        inverted: false,
    },
];

/// Fixed, ordered list of parameter definitions.
///
/// Built once at startup and never mutated; the order is the display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    definitions: Vec<ParameterDefinition>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::restaurant()
    }
}

impl Catalog {
    /// The restaurant site-selection catalog.
    pub fn restaurant() -> Self {
        Self::from_definitions(RESTAURANT_PARAMETERS.to_vec())
    }

    pub fn from_definitions(definitions: Vec<ParameterDefinition>) -> Self {
        Self { definitions }
    }

    pub fn list(&self) -> &[ParameterDefinition] {
        &self.definitions
    }

    pub fn get(&self, id: &str) -> Result<&ParameterDefinition, ModelError> {
        self.definitions
            .iter()
            .find(|def| def.id == id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_catalog_order_is_stable() {
        let catalog = Catalog::restaurant();
        let ids: Vec<&str> = catalog.list().iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec![
                "competitors",
                "foot_traffic",
                "public_transport",
                "parking",
                "rent_cost",
                "population_density",
                "office_buildings",
                "shopping_centers",
                "safety_level",
                "visibility",
            ]
        );
    }

    #[test]
    fn test_get_known_and_unknown() {
        let catalog = Catalog::restaurant();
        let rent = catalog.get("rent_cost").unwrap();
        assert!(rent.inverted);
        assert_eq!(rent.kind, ParameterKind::Scale);

        let err = catalog.get("helipad").unwrap_err();
        assert_eq!(err, ModelError::NotFound("helipad".to_string()));
    }

    #[test]
    fn test_default_weights_do_not_sum_to_required_total() {
        let total: u32 = Catalog::restaurant()
            .list()
            .iter()
            .map(|d| d.default_weight)
            .sum();
        assert_eq!(total, 120);
        assert_ne!(total, REQUIRED_TOTAL_WEIGHT);
    }

    #[test]
    fn test_kind_step_and_label() {
        assert_eq!(ParameterKind::Distance.step(), 50);
        assert_eq!(ParameterKind::Scale.step(), 1);
        assert_eq!(ParameterKind::Distance.value_label(), "Maximum Distance");
        assert_eq!(ParameterKind::Scale.value_label(), "Required Level");
    }

    #[test]
    fn test_definition_clamp() {
        let catalog = Catalog::restaurant();
        let competitors = catalog.get("competitors").unwrap();
        assert_eq!(competitors.clamp(10), 50);
        assert_eq!(competitors.clamp(5000), 2000);
        assert!(competitors.contains(2000));
        assert!(!competitors.contains(2001));
    }
}
