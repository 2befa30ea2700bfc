use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// WGS 84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinateRepr")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Parse the `"lat, lng"` form the scoring service reports.
    pub fn parse(text: &str) -> Option<Self> {
        let (lat, lng) = text.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        let coord = Self { lat, lng };
        coord.is_valid().then_some(coord)
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Text(String),
    Object {
        #[serde(alias = "latitude")]
        lat: f64,
        #[serde(alias = "lon", alias = "longitude")]
        lng: f64,
    },
}

impl TryFrom<CoordinateRepr> for Coordinate {
    type Error = String;

    fn try_from(repr: CoordinateRepr) -> Result<Self, Self::Error> {
        match repr {
            CoordinateRepr::Text(text) => {
                Coordinate::parse(&text).ok_or_else(|| format!("invalid coordinates '{}'", text))
            }
            CoordinateRepr::Object { lat, lng } => {
                let coord = Coordinate { lat, lng };
                if coord.is_valid() {
                    Ok(coord)
                } else {
                    Err(format!("coordinates out of range: {}", coord))
                }
            }
        }
    }
}

/// Highest-scoring candidate reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestLocation {
    pub coordinates: Coordinate,
    pub suitability_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One entry of the service's ranked candidate list.
///
/// Every field is decoded leniently: a value of the wrong type reads as
/// absent instead of failing the whole reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Raw per-parameter values measured at this location
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub suitability_score: Option<f64>,
}

impl RankedLocation {
    /// Address when known, otherwise the position, otherwise the id.
    pub fn label(&self) -> String {
        if let Some(address) = &self.address {
            return address.clone();
        }
        match (self.latitude, self.longitude, self.id) {
            (Some(lat), Some(lng), _) => format!("{:.6}, {:.6}", lat, lng),
            (_, _, Some(id)) => format!("Location {}", id),
            _ => "Unknown location".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub median_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub parameters_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<u64>,
}

/// Reply of `POST /analysis`.
///
/// Only `best_location` is decoded strictly, since display and export depend
/// on it. Everything else is supplementary: missing or mistyped values stay
/// `None` rather than being filled with placeholders, and a supplementary
/// section that cannot be read at all is kept verbatim in `extra` along with
/// every key not listed here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_locations_analyzed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suitable_locations_found: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_location: Option<BestLocation>,
    #[serde(default, rename = "top_10_locations", skip_serializing_if = "Vec::is_empty")]
    pub top_locations: Vec<RankedLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_summary: Option<AnalysisSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for AnalysisResponse {
    type Error = String;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let best_location = match fields.remove("best_location") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value(raw).map_err(|e| format!("invalid best_location: {}", e))?,
            ),
        };

        let status = take_text(&mut fields, "status");
        let message = take_text(&mut fields, "message");
        let total_locations_analyzed = take_count(&mut fields, "total_locations_analyzed");
        let suitable_locations_found = take_count(&mut fields, "suitable_locations_found");

        let top_locations = match fields.remove("top_10_locations") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .into_iter()
                .filter_map(|entry| match serde_json::from_value(entry) {
                    Ok(location) => Some(location),
                    Err(e) => {
                        crate::diag_verbose!("Skipping unreadable ranked location: {}", e);
                        None
                    }
                })
                .collect(),
            Some(raw) => {
                crate::diag_verbose!("Keeping unreadable top_10_locations as raw data");
                fields.insert("top_10_locations".to_string(), raw);
                Vec::new()
            }
        };

        let analysis_summary = match fields.remove("analysis_summary") {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    crate::diag_verbose!("Keeping unreadable analysis_summary as raw data: {}", e);
                    fields.insert("analysis_summary".to_string(), raw);
                    None
                }
            },
        };

        Ok(Self {
            status,
            message,
            total_locations_analyzed,
            suitable_locations_found,
            best_location,
            top_locations,
            analysis_summary,
            extra: fields,
        })
    }
}

/// Remove a string field, leaving a mistyped value in place as raw data.
fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::String(text) => Some(text),
        Value::Null => None,
        raw => {
            fields.insert(key.to_string(), raw);
            None
        }
    }
}

/// Remove a count field, leaving a mistyped value in place as raw data.
fn take_count(fields: &mut Map<String, Value>, key: &str) -> Option<u64> {
    let raw = fields.remove(key)?;
    let count = lenient::as_count(&raw);
    if count.is_none() && !raw.is_null() {
        fields.insert(key.to_string(), raw);
    }
    count
}

/// Field decoders that read a mistyped value as absent.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Whole non-negative numbers, including `200.0`.
    pub fn as_count(value: &Value) -> Option<u64> {
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
                .map(|n| n as u64)
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(as_count(&Value::deserialize(deserializer)?))
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(Value::deserialize(deserializer)?.as_f64())
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Some(text),
            _ => None,
        })
    }
}
