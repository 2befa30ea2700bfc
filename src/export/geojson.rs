use serde::Serialize;

use super::{ExportError, ExportPoint};

#[derive(Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature<'a>>,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: Properties<'a>,
}

#[derive(Serialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// GeoJSON order: longitude first
    coordinates: [f64; 2],
}

#[derive(Serialize)]
struct Properties<'a> {
    name: &'a str,
    suitability_score: f64,
}

/// Encode the point as a one-feature `FeatureCollection`.
pub fn encode(point: &ExportPoint) -> Result<Vec<u8>, ExportError> {
    let collection = FeatureCollection {
        kind: "FeatureCollection",
        features: vec![Feature {
            kind: "Feature",
            geometry: Geometry {
                kind: "Point",
                coordinates: [point.coordinate.lng, point.coordinate.lat],
            },
            properties: Properties {
                name: &point.name,
                suitability_score: point.score,
            },
        }],
    };
    Ok(serde_json::to_vec_pretty(&collection)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::outcome_with_best;
    use crate::export::ExportFormat;

    #[test]
    fn test_feature_collection_shape() {
        let bytes = ExportFormat::GeoJson.encode(&outcome_with_best()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let features = json["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(
            feature["geometry"]["coordinates"],
            serde_json::json!([-73.9851, 40.7589])
        );
        assert_eq!(feature["properties"]["name"], "Sample Location 17");
        assert_eq!(feature["properties"]["suitability_score"], 91.25);
    }
}
