//! Downloadable artifacts for the best location of an analysis.

pub mod geojson;
pub mod shapefile;

use atomic_write_file::AtomicWriteFile;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::analysis::{AnalysisOutcome, Coordinate};

/// Base name shared by every artifact.
pub const EXPORT_BASENAME: &str = "monasib_analysis";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no best location to export; run an analysis first")]
    NoLocation,

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build shapefile archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    GeoJson,
    Shapefile,
}

impl ExportFormat {
    pub fn file_name(self) -> String {
        match self {
            ExportFormat::GeoJson => format!("{}.geojson", EXPORT_BASENAME),
            ExportFormat::Shapefile => format!("{}.zip", EXPORT_BASENAME),
        }
    }

    /// Encode the best location of `outcome` in this format.
    pub fn encode(self, outcome: &AnalysisOutcome) -> Result<Vec<u8>, ExportError> {
        let point = ExportPoint::from_outcome(outcome)?;
        match self {
            ExportFormat::GeoJson => geojson::encode(&point),
            ExportFormat::Shapefile => shapefile::encode_zip(&point, outcome),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::GeoJson => write!(f, "geojson"),
            ExportFormat::Shapefile => write!(f, "shapefile"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geojson" | "json" => Ok(ExportFormat::GeoJson),
            "shapefile" | "shp" | "zip" => Ok(ExportFormat::Shapefile),
            other => Err(format!(
                "unknown export format '{}' (expected geojson or shapefile)",
                other
            )),
        }
    }
}

/// The single feature every export carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPoint {
    pub name: String,
    pub score: f64,
    pub coordinate: Coordinate,
}

impl ExportPoint {
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Result<Self, ExportError> {
        let best = outcome
            .response
            .best_location
            .as_ref()
            .ok_or(ExportError::NoLocation)?;
        Ok(Self {
            name: outcome.best_name(),
            score: best.suitability_score,
            coordinate: best.coordinates,
        })
    }
}

/// Write the export for `outcome` into `dir`, returning the file path.
///
/// The file is replaced atomically, so a failed export never leaves a
/// truncated artifact behind.
pub fn write_export(
    outcome: &AnalysisOutcome,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = format.encode(outcome)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name());

    let mut file = AtomicWriteFile::open(&path)?;
    file.write_all(&bytes)?;
    file.commit()?;

    crate::diag_verbose!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "monasib-export-test-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("geojson".parse::<ExportFormat>(), Ok(ExportFormat::GeoJson));
        assert_eq!("SHP".parse::<ExportFormat>(), Ok(ExportFormat::Shapefile));
        assert!("kml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_formats_produce_different_files() {
        let outcome = outcome_with_best();
        let dir = temp_dir("both");

        let geojson = write_export(&outcome, ExportFormat::GeoJson, &dir).unwrap();
        let shapefile = write_export(&outcome, ExportFormat::Shapefile, &dir).unwrap();

        assert_eq!(geojson.file_name().unwrap(), "monasib_analysis.geojson");
        assert_eq!(shapefile.file_name().unwrap(), "monasib_analysis.zip");

        let geojson_bytes = std::fs::read(&geojson).unwrap();
        let zip_bytes = std::fs::read(&shapefile).unwrap();
        assert_ne!(geojson_bytes, zip_bytes);
        assert_eq!(&zip_bytes[..2], b"PK");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_without_best_location() {
        let outcome = outcome_without_best();
        let dir = temp_dir("none");

        let err = write_export(&outcome, ExportFormat::GeoJson, &dir).unwrap_err();
        assert!(matches!(err, ExportError::NoLocation));
        // Nothing written
        assert!(!dir.join("monasib_analysis.geojson").exists());
    }
}
