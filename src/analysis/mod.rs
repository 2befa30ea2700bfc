pub mod cache;
pub mod client;
pub mod outcome;
pub mod report;
pub mod request;
pub mod response;
pub mod session;
pub mod validation;

pub use cache::{clear_last_outcome, get_cache_path, load_last_outcome, store_last_outcome};
pub use client::{ScoringClient, ScoringService};
pub use outcome::AnalysisOutcome;
pub use report::AnalysisReport;
pub use request::{build_request, AnalysisRequest, Criterion};
pub use response::{AnalysisResponse, AnalysisSummary, BestLocation, Coordinate, RankedLocation};
pub use session::{AnalysisSession, SubmissionState};
pub use validation::{validate_for_submission, WeightStatus};
