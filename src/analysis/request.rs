use serde::Serialize;
use std::collections::BTreeMap;

use crate::params::ParameterStore;

/// Threshold and weight submitted for one active parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Criterion {
    pub value: i64,
    pub weight: u32,
}

/// Body of `POST /analysis`. Built fresh for every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub criteria: BTreeMap<String, Criterion>,
    #[serde(rename = "totalWeight")]
    pub total_weight: u32,
}

impl AnalysisRequest {
    /// The weight map recorded locally for this request.
    pub fn weights(&self) -> BTreeMap<String, u32> {
        self.criteria
            .iter()
            .map(|(id, criterion)| (id.clone(), criterion.weight))
            .collect()
    }
}

/// Build the request from the active parameters.
///
/// Callers validate first (see `validate_for_submission`); this only reads
/// the store.
pub fn build_request(store: &ParameterStore) -> AnalysisRequest {
    let criteria = store
        .iter()
        .filter(|(_, state)| state.active)
        .map(|(def, state)| {
            (
                def.id.to_string(),
                Criterion {
                    value: state.value,
                    weight: state.weight,
                },
            )
        })
        .collect();

    AnalysisRequest {
        criteria,
        total_weight: store.total_weight(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::validate_for_submission;
    use crate::catalog::Catalog;
    use crate::error::ModelError;

    #[test]
    fn test_all_defaults_need_adjusting_before_request() {
        let mut store = ParameterStore::initialize(Catalog::restaurant());
        let ids: Vec<&str> = store.catalog().list().iter().map(|d| d.id).collect();
        for id in &ids {
            store.toggle(id).unwrap();
        }
        assert_eq!(store.total_weight(), 120);
        assert_eq!(
            validate_for_submission(&store),
            Err(ModelError::WeightMismatch(120))
        );

        // Take 20 points off the two heaviest parameters
        store.set_weight("foot_traffic", 10).unwrap();
        store.set_weight("rent_cost", 8).unwrap();
        assert!(validate_for_submission(&store).is_ok());

        let request = build_request(&store);
        assert_eq!(request.total_weight, 100);
        assert_eq!(request.criteria.len(), 10);
        assert_eq!(
            request.criteria["foot_traffic"],
            Criterion {
                value: 7,
                weight: 10
            }
        );
        assert_eq!(
            request.criteria["competitors"],
            Criterion {
                value: 500,
                weight: 15
            }
        );
    }

    #[test]
    fn test_request_contains_exactly_active_ids() {
        let mut store = ParameterStore::initialize(Catalog::restaurant());
        for (id, weight) in [
            ("competitors", 30),
            ("foot_traffic", 30),
            ("rent_cost", 20),
            ("visibility", 20),
        ] {
            store.toggle(id).unwrap();
            store.set_weight(id, weight).unwrap();
        }
        store.set_value("rent_cost", 2).unwrap();
        // Changed but inactive: must not leak into the request
        store.set_value("parking", 9).unwrap();

        let request = build_request(&store);
        let ids: Vec<&str> = request.criteria.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["competitors", "foot_traffic", "rent_cost", "visibility"]);
        assert_eq!(request.criteria["rent_cost"].value, 2);
        assert_eq!(request.weights()["visibility"], 20);
    }

    #[test]
    fn test_request_wire_format() {
        let mut store = ParameterStore::initialize(Catalog::restaurant());
        store.toggle("parking").unwrap();

        let json = serde_json::to_value(build_request(&store)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "criteria": { "parking": { "value": 6, "weight": 10 } },
                "totalWeight": 10
            })
        );
    }
}
