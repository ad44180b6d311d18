//! Core `StudioService` trait and `HttpStudioService` implementation.
//!
//! `HttpStudioService` speaks JSON over HTTP to the studio service that owns
//! corpus storage, text generation and speech synthesis.  All connection
//! details come from [`ServiceConfig`]; nothing is hardcoded except the
//! endpoint paths.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::types::{
    CorpusRecord, CreateCorpusRequest, ErrorBody, GenerateRequest, GenerateResponse,
    SpeechRequest, SpeechResponse,
};
use crate::config::ServiceConfig;

const CORPORA_PATH: &str = "/api/corpora";
const GENERATE_PATH: &str = "/api/generate";
const SPEECH_PATH: &str = "/api/tts";

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the studio service.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.  `detail` is the
    /// human-readable explanation from the response body, when it sent one.
    #[error("service returned HTTP {status}")]
    Service { status: u16, detail: Option<String> },

    /// The request could not be completed (connection, timeout, …).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The response body could not be parsed as expected.
    #[error("failed to parse service response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// StudioService trait
// ---------------------------------------------------------------------------

/// The four remote operations the session controller depends on.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn StudioService>`.  Every call is fallible and none is retried.
#[async_trait]
pub trait StudioService: Send + Sync {
    async fn list_corpora(&self) -> Result<Vec<CorpusRecord>, ApiError>;

    async fn create_corpus(&self, request: CreateCorpusRequest) -> Result<CorpusRecord, ApiError>;

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError>;

    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpStudioService
// ---------------------------------------------------------------------------

/// Calls the studio service's JSON endpoints.
pub struct HttpStudioService {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpStudioService {
    /// Build an `HttpStudioService` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Attach auth, send, and decode the body — or turn a non-success status
    /// into [`ApiError::Service`] carrying the body's `detail`.
    async fn send<T: DeserializeOwned>(
        &self,
        mut req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Service {
                status: status.as_u16(),
                detail: service_detail(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl StudioService for HttpStudioService {
    async fn list_corpora(&self) -> Result<Vec<CorpusRecord>, ApiError> {
        self.send(self.client.get(self.url(CORPORA_PATH))).await
    }

    async fn create_corpus(&self, request: CreateCorpusRequest) -> Result<CorpusRecord, ApiError> {
        self.send(self.client.post(self.url(CORPORA_PATH)).json(&request))
            .await
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError> {
        self.send(self.client.post(self.url(GENERATE_PATH)).json(&request))
            .await
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse, ApiError> {
        self.send(self.client.post(self.url(SPEECH_PATH)).json(&request))
            .await
    }
}

/// Pull a human-readable `detail` out of an error body.
///
/// A string detail is used verbatim; structured details (validation error
/// lists) are passed through as compact JSON.  Empty or non-JSON bodies
/// yield `None`.
pub(crate) fn service_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(base_url: &str, api_key: Option<&str>) -> ServiceConfig {
        ServiceConfig {
            base_url: base_url.into(),
            api_key: api_key.map(|s| s.to_string()),
            timeout_secs: 5,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _service = HttpStudioService::from_config(&make_config("http://localhost:8000", None));
    }

    #[test]
    fn from_config_accepts_empty_api_key() {
        let _service =
            HttpStudioService::from_config(&make_config("http://localhost:8000", Some("")));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let service = HttpStudioService::from_config(&make_config("http://host:8000/", None));
        assert_eq!(service.url(GENERATE_PATH), "http://host:8000/api/generate");
    }

    #[test]
    fn service_is_object_safe() {
        let service: Box<dyn StudioService> = Box::new(HttpStudioService::from_config(
            &make_config("http://localhost:8000", None),
        ));
        drop(service);
    }

    #[test]
    fn string_detail_is_passed_through() {
        assert_eq!(
            service_detail(r#"{"detail":"Text too short for order 3"}"#).as_deref(),
            Some("Text too short for order 3")
        );
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let detail = service_detail(r#"{"detail":[{"loc":["body","text"]}]}"#).unwrap();
        assert!(detail.contains("loc"));
    }

    #[test]
    fn missing_or_blank_detail_is_none() {
        assert_eq!(service_detail(""), None);
        assert_eq!(service_detail("<html>502</html>"), None);
        assert_eq!(service_detail(r#"{"error":"x"}"#), None);
        assert_eq!(service_detail(r#"{"detail":"  "}"#), None);
    }

    /// Nothing listens on port 9; the call must surface as a transport error.
    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let service = HttpStudioService::from_config(&make_config("http://127.0.0.1:9", None));
        let err = service.list_corpora().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    }
}
