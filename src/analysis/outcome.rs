use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::request::AnalysisRequest;
use super::response::{AnalysisResponse, Coordinate};

/// A successful analysis: the service reply merged with the weights that
/// were actually submitted.
///
/// The weight map comes from the local request, never from the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub response: AnalysisResponse,
    pub weights: BTreeMap<String, u32>,
    pub total_weight: u32,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisOutcome {
    pub fn merge(request: &AnalysisRequest, response: AnalysisResponse) -> Self {
        Self {
            response,
            weights: request.weights(),
            total_weight: request.total_weight,
            completed_at: Utc::now(),
        }
    }

    pub fn best_score(&self) -> Option<f64> {
        self.response
            .best_location
            .as_ref()
            .map(|best| best.suitability_score)
    }

    pub fn best_coordinate(&self) -> Option<Coordinate> {
        self.response
            .best_location
            .as_ref()
            .map(|best| best.coordinates)
    }

    /// Display name for the best location.
    pub fn best_name(&self) -> String {
        self.response
            .best_location
            .as_ref()
            .and_then(|best| best.address.clone())
            .unwrap_or_else(|| "Best Location".to_string())
    }

    pub fn total_locations(&self) -> Option<u64> {
        self.response.total_locations_analyzed
    }

    pub fn suitable_locations(&self) -> Option<u64> {
        self.response.suitable_locations_found
    }
}
