use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::outcome::AnalysisOutcome;
use super::report::{AnalysisReport, ReportEnvelope, ReportRequest};
use super::request::AnalysisRequest;
use super::response::AnalysisResponse;
use crate::config::Config;
use crate::error::ServiceError;

/// Anything that can score a set of weighted criteria.
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ServiceError>;
}

/// HTTP client for the scoring service.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
}

impl ScoringClient {
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("monasib/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(base_url, client, retries))
    }

    pub fn with_http_client(base_url: &str, client: reqwest::Client, retries: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Self::new(&config.service_url, config.request_timeout(), config.retries)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Ask the service to write up a finished analysis.
    pub async fn report(&self, outcome: &AnalysisOutcome) -> Result<AnalysisReport, ServiceError> {
        let body = ReportRequest {
            analysis_results: &outcome.response,
        };
        let envelope: ReportEnvelope = self.post_json("report", &body).await?;
        Ok(envelope.report)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);

        // Only connection failures and timeouts are retried
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(self.retries);

        let bytes = RetryIf::spawn(
            retry_strategy,
            || self.send_once(&url, body),
            ServiceError::is_transient,
        )
        .await?;

        serde_json::from_slice(&bytes).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    async fn send_once<B>(&self, url: &str, body: &B) -> Result<Vec<u8>, ServiceError>
    where
        B: Serialize + ?Sized,
    {
        crate::diag_verbose!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ScoringService for ScoringClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ServiceError> {
        self.post_json("analysis", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::request::Criterion;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    fn request() -> AnalysisRequest {
        let mut criteria = BTreeMap::new();
        criteria.insert(
            "competitors".to_string(),
            Criterion {
                value: 500,
                weight: 60,
            },
        );
        criteria.insert(
            "parking".to_string(),
            Criterion {
                value: 6,
                weight: 40,
            },
        );
        AnalysisRequest {
            criteria,
            total_weight: 100,
        }
    }

    fn test_client(base_url: &str, retries: usize) -> ScoringClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        ScoringClient::with_http_client(base_url, http, retries)
    }

    /// Read one HTTP/1.1 request: headers, then `Content-Length` bytes of body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve a single canned response and hand back the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(raw);
        });

        (format!("http://{}", addr), rx)
    }

    /// Answer connections in turn: `Some((status, body))` replies, `None`
    /// reads the request and hangs up. Counts accepted connections.
    async fn serve_sequence(
        replies: Vec<Option<(&'static str, &'static str)>>,
    ) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        tokio::spawn(async move {
            for reply in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let Some((status_line, body)) = reply else {
                    drop(socket);
                    continue;
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), accepted)
    }

    #[tokio::test]
    async fn test_analyze_posts_criteria_and_decodes_reply() {
        let (url, raw) = serve_once(
            "200 OK",
            r#"{"status": "success", "total_locations_analyzed": 200,
                "best_location": {"coordinates": "40.758900, -73.985100", "suitability_score": 91.2}}"#,
        )
        .await;

        let client = test_client(&url, 0);
        let response = client.analyze(&request()).await.unwrap();
        assert_eq!(response.total_locations_analyzed, Some(200));
        assert_eq!(response.best_location.unwrap().suitability_score, 91.2);

        let raw = raw.await.unwrap();
        assert!(raw.starts_with("POST /analysis HTTP/1.1"));
        let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["totalWeight"], 100);
        assert_eq!(json["criteria"]["competitors"]["weight"], 60);
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let (url, _raw) = serve_once(
            "500 Internal Server Error",
            r#"{"detail": "Analysis error: boom"}"#,
        )
        .await;

        let err = test_client(&url, 0).analyze(&request()).await.unwrap_err();
        match err {
            ServiceError::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let error = Some(("500 Internal Server Error", r#"{"detail": "boom"}"#));
        let (url, accepted) = serve_sequence(vec![error, error, error]).await;

        let err = test_client(&url, 2).analyze(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Status { status: 500, .. }));
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_connection_is_retried() {
        let ok = Some((
            "200 OK",
            r#"{"best_location": {"coordinates": "40.7, -74.0", "suitability_score": 77.0}}"#,
        ));
        let (url, accepted) = serve_sequence(vec![None, ok]).await;

        let response = test_client(&url, 2).analyze(&request()).await.unwrap();
        assert_eq!(response.best_location.unwrap().suitability_score, 77.0);
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropped_connection_without_retries_fails() {
        let (url, accepted) = serve_sequence(vec![None]).await;

        let err = test_client(&url, 0).analyze(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)));
        assert!(err.is_transient());
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_invalid_response() {
        let (url, _raw) = serve_once("200 OK", "not json").await;

        let err = test_client(&url, 0).analyze(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = test_client(&format!("http://{}", addr), 0)
            .analyze(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_report_wraps_analysis_results() {
        let (url, raw) = serve_once(
            "200 OK",
            r#"{"report": {"report_id": "RPT_1", "title": "Report", "executive_summary": "ok"}, "status": "generated"}"#,
        )
        .await;

        let outcome = AnalysisOutcome::merge(&request(), AnalysisResponse::default());
        let report = test_client(&url, 0).report(&outcome).await.unwrap();
        assert_eq!(report.report_id, "RPT_1");

        let raw = raw.await.unwrap();
        assert!(raw.starts_with("POST /report HTTP/1.1"));
        assert!(raw.contains("\"analysisResults\""));
    }

    #[tokio::test]
    async fn test_endpoint_joins_cleanly() {
        let client = test_client("http://127.0.0.1:8888/", 0);
        assert_eq!(client.base_url(), "http://127.0.0.1:8888");
        assert_eq!(client.endpoint("/analysis"), "http://127.0.0.1:8888/analysis");
    }
}
