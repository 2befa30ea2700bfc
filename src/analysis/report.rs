use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::response::AnalysisResponse;

/// Narrative report generated by the service from a finished analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: String,
    #[serde(default)]
    pub generated_at: Option<String>,
    pub title: String,
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub methodology: BTreeMap<String, Value>,
    #[serde(default)]
    pub download_formats: Vec<String>,
}

impl AnalysisReport {
    /// Executive summary with the service's indentation and line breaks folded away.
    pub fn summary_text(&self) -> String {
        self.executive_summary
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Body of `POST /report`.
#[derive(Debug, Serialize)]
pub(crate) struct ReportRequest<'a> {
    #[serde(rename = "analysisResults")]
    pub analysis_results: &'a AnalysisResponse,
}

/// Wire envelope of `POST /report`.
#[derive(Debug, Deserialize)]
pub(crate) struct ReportEnvelope {
    pub report: AnalysisReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_report_envelope() {
        let json = r#"{
            "report": {
                "report_id": "RPT_123456",
                "generated_at": "2025-06-30T12:00:00Z",
                "title": "Restaurant Location Suitability Analysis Report",
                "executive_summary": "\n    Based on 200 potential locations\n    we identified 23.\n  ",
                "key_findings": ["Average suitability score: 54.1%"],
                "recommendations": ["Focus on the top 3-5 locations"],
                "methodology": {"analysis_type": "Multi-criteria GIS suitability analysis"},
                "download_formats": ["GeoJSON", "Shapefile"]
            },
            "status": "generated"
        }"#;

        let envelope: ReportEnvelope = serde_json::from_str(json).unwrap();
        let report = envelope.report;
        assert_eq!(report.report_id, "RPT_123456");
        assert_eq!(report.key_findings.len(), 1);
        assert_eq!(
            report.summary_text(),
            "Based on 200 potential locations we identified 23."
        );
        assert_eq!(
            report.methodology["analysis_type"],
            Value::String("Multi-criteria GIS suitability analysis".to_string())
        );
    }
}
