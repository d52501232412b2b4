//! HTTP client for the benchmarked endpoints
//!
//! Issues `POST <base>/process` requests and turns every transport or
//! protocol problem into a [`CallError`] value.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::BattleError;
use crate::models::{Document, Endpoint, ProcessResponse, ProcessingResult};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Why a single call produced no result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

impl CallError {
    /// Network unreachable, refused or timed out
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CallError::Timeout(_) | CallError::Connect(_) | CallError::Transport(_)
        )
    }

    /// Non-2xx status or an unusable body
    pub fn is_protocol(&self) -> bool {
        !self.is_transport()
    }
}

/// Something that can process a document on behalf of an endpoint.
///
/// The benchmarkers only depend on this trait.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Send one document to one endpoint
    async fn process(
        &self,
        endpoint: &Endpoint,
        document: &Document,
    ) -> Result<ProcessingResult, CallError>;

    /// Like [`Processor::process`], with failures collapsed into `None`
    async fn call(&self, endpoint: &Endpoint, document: &Document) -> Option<ProcessingResult> {
        match self.process(endpoint, document).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Call to {} failed: {}", endpoint.label, e);
                None
            }
        }
    }
}

#[derive(Serialize)]
struct ProcessRequest<'a> {
    document_text: &'a str,
}

/// HTTP implementation of [`Processor`]
#[derive(Clone, Debug)]
pub struct EndpointClient {
    client: Client,
    timeout_secs: u64,
}

impl EndpointClient {
    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, BattleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BattleError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> CallError {
        if e.is_timeout() {
            CallError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            CallError::Connect(url.to_string())
        } else {
            CallError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl Processor for EndpointClient {
    async fn process(
        &self,
        endpoint: &Endpoint,
        document: &Document,
    ) -> Result<ProcessingResult, CallError> {
        let url = endpoint.process_url();
        debug!("Sending {} bytes to {}", document.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&ProcessRequest {
                document_text: document.as_str(),
            })
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let parsed: ProcessResponse = serde_json::from_slice(&body)
            .map_err(|e| CallError::MalformedBody(e.to_string()))?;

        if !parsed.processing_time_ms.is_finite() || parsed.processing_time_ms < 0.0 {
            return Err(CallError::MalformedBody(format!(
                "invalid processing_time_ms: {}",
                parsed.processing_time_ms
            )));
        }

        debug!(
            "Response from {}: {} in {}ms",
            endpoint.label, parsed.status, parsed.processing_time_ms
        );

        Ok(ProcessingResult::from_response(endpoint.id, parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointId, ProcessingStatus};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn echo_length(Json(body): Json<Value>) -> Json<Value> {
        let text = body["document_text"].as_str().unwrap_or_default();
        Json(json!({
            "status": "success",
            "complexity_score": "1.50",
            "document_hash": format!("len-{}", text.len()),
            "processed_by": "mock-api",
            "processing_time_ms": 5.23
        }))
    }

    fn endpoint(base_url: &str) -> Endpoint {
        Endpoint::new(EndpointId::A, "Endpoint A", base_url)
    }

    #[tokio::test]
    async fn test_process_success() {
        let base = spawn_server(Router::new().route("/process", post(echo_length))).await;
        let client = EndpointClient::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();

        let result = client
            .process(&endpoint(&base), &Document::from("hello world"))
            .await
            .unwrap();

        assert_eq!(result.endpoint, EndpointId::A);
        assert_eq!(result.status, ProcessingStatus::Success);
        assert_eq!(result.document_hash, "len-11");
        assert_eq!(result.processed_by, "mock-api");
        assert_eq!(result.processing_time_ms, 5.23);
    }

    #[tokio::test]
    async fn test_non_success_status_is_protocol_error() {
        let router = Router::new().route(
            "/process",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_server(router).await;
        let client = EndpointClient::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();

        let err = client
            .process(&endpoint(&base), &Document::from("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::Status { status: 500, .. }));
        assert!(err.is_protocol());
    }

    #[tokio::test]
    async fn test_malformed_body_is_protocol_error() {
        let router = Router::new().route("/process", post(|| async { "not json" }));
        let base = spawn_server(router).await;
        let client = EndpointClient::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();

        let err = client
            .process(&endpoint(&base), &Document::from("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_negative_processing_time_rejected() {
        let router = Router::new().route(
            "/process",
            post(|| async {
                Json(json!({
                    "status": "success",
                    "complexity_score": "1",
                    "document_hash": "h",
                    "processed_by": "mock",
                    "processing_time_ms": -1.0
                }))
            }),
        );
        let base = spawn_server(router).await;
        let client = EndpointClient::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();

        let err = client
            .process(&endpoint(&base), &Document::from("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = EndpointClient::with_timeout(5).unwrap();
        let err = client
            .process(&endpoint(&format!("http://{addr}")), &Document::from("x"))
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let router = Router::new().route(
            "/process",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
        let base = spawn_server(router).await;
        let client = EndpointClient::with_timeout(1).unwrap();

        let err = client
            .process(&endpoint(&base), &Document::from("x"))
            .await
            .unwrap_err();

        assert_eq!(err, CallError::Timeout(1));
    }

    #[tokio::test]
    async fn test_call_collapses_failure_to_none() {
        let router = Router::new().route(
            "/process",
            post(|| async { (StatusCode::BAD_REQUEST, "bad") }),
        );
        let base = spawn_server(router).await;
        let client = EndpointClient::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();

        let result = client.call(&endpoint(&base), &Document::from("x")).await;
        assert!(result.is_none());
    }
}
