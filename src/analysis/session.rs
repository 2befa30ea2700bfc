use super::client::ScoringService;
use super::outcome::AnalysisOutcome;
use super::request::{build_request, AnalysisRequest};
use super::response::AnalysisResponse;
use super::validation::validate_for_submission;
use crate::error::{ServiceError, SubmitError};
use crate::params::ParameterStore;

/// Where the submission cycle stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting { request: AnalysisRequest },
}

/// Owns the analysis lifecycle: `Idle -> Submitting -> Idle`, plus the most
/// recent successful outcome.
///
/// The submitting flag is advisory. Interactive callers split a submission
/// into [`begin`](Self::begin) and [`complete`](Self::complete) so the
/// network call can run on a task while the UI keeps drawing. The flag keeps
/// a second submission out while the first is in flight.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: SubmissionState,
    result: Option<AnalysisOutcome>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the session with a previously cached outcome.
    pub fn with_result(result: Option<AnalysisOutcome>) -> Self {
        Self {
            state: SubmissionState::Idle,
            result,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting { .. })
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn result(&self) -> Option<&AnalysisOutcome> {
        self.result.as_ref()
    }

    /// Validate the store and move to `Submitting`.
    ///
    /// On rejection nothing changes: the state stays `Idle` and any previous
    /// result is kept. On success the previous result is cleared.
    pub fn begin(&mut self, store: &ParameterStore) -> Result<AnalysisRequest, SubmitError> {
        if self.is_analyzing() {
            return Err(SubmitError::AlreadyAnalyzing);
        }

        validate_for_submission(store)?;

        let request = build_request(store);
        self.result = None;
        self.state = SubmissionState::Submitting {
            request: request.clone(),
        };
        Ok(request)
    }

    /// Finish the in-flight submission. Always returns to `Idle`.
    pub fn complete(
        &mut self,
        reply: Result<AnalysisResponse, ServiceError>,
    ) -> Result<&AnalysisOutcome, SubmitError> {
        let request = match std::mem::take(&mut self.state) {
            SubmissionState::Submitting { request } => request,
            SubmissionState::Idle => return Err(SubmitError::NotAnalyzing),
        };

        let response = reply?;
        let outcome = self.result.insert(AnalysisOutcome::merge(&request, response));
        Ok(&*outcome)
    }

    /// Validate, call the service, and record the outcome in one step.
    pub async fn submit<S>(
        &mut self,
        store: &ParameterStore,
        service: &S,
    ) -> Result<&AnalysisOutcome, SubmitError>
    where
        S: ScoringService + ?Sized,
    {
        let request = self.begin(store)?;
        let reply = service.analyze(&request).await;
        self.complete(reply)
    }

    /// Return to `Idle` when the in-flight call was lost without a reply
    /// (e.g. its task panicked). No result is recorded.
    pub fn abort(&mut self) {
        self.state = SubmissionState::Idle;
    }

    /// Drop the current result, returning it.
    pub fn dismiss(&mut self) -> Option<AnalysisOutcome> {
        self.result.take()
    }
}
