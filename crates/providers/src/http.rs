//! Shared HTTP plumbing: endpoint addressing, auth headers, status mapping.

use dualchat_config::ApiFlavor;
use dualchat_core::error::{CompletionError, EmbeddingError, SynthesisError};
use tracing::warn;

/// Default request timeout for every outbound call.
const REQUEST_TIMEOUT_SECS: u64 = 120;

pub(crate) const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub(crate) fn client() -> reqwest::Client {
    let built = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build();
    with_fallback(built)
}

fn with_fallback(built: reqwest::Result<reqwest::Client>) -> reqwest::Client {
    match built {
        Ok(client) => client,
        Err(e) => {
            warn!(
                error = %e,
                "Could not build HTTP client, falling back to one without a request timeout"
            );
            reqwest::Client::new()
        }
    }
}

/// Where and how to reach an OpenAI-style API.
#[derive(Clone)]
pub struct Endpoint {
    pub(crate) flavor: ApiFlavor,
    pub(crate) base_url: String,
    api_key: String,
    api_version: String,
}

impl Endpoint {
    pub fn new(
        flavor: ApiFlavor,
        base_url: Option<&str>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let base_url = base_url.unwrap_or(OPENAI_BASE_URL);
        Self {
            flavor,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: api_version.into(),
        }
    }

    /// Plain OpenAI endpoint (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(ApiFlavor::Openai, None, api_key, "")
    }

    /// URL of `path` (e.g. `chat/completions`) for `model`.
    ///
    /// Azure addresses models as deployments and requires `api-version`.
    pub fn url(&self, model: &str, path: &str) -> String {
        match self.flavor {
            ApiFlavor::Openai => format!("{}/{path}", self.base_url),
            ApiFlavor::Azure => format!(
                "{}/openai/deployments/{model}/{path}?api-version={}",
                self.base_url, self.api_version
            ),
        }
    }

    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.flavor {
            ApiFlavor::Openai => request.bearer_auth(&self.api_key),
            ApiFlavor::Azure => request.header("api-key", &self.api_key),
        }
    }
}

/// A non-success HTTP outcome, before it is mapped onto a bounded-context error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HttpFailure {
    RateLimited { retry_after_secs: u64 },
    Unauthorized,
    Status { status_code: u16, message: String },
    Network(String),
}

impl HttpFailure {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Classify a status code; `None` means success.
pub(crate) fn classify(status: u16, retry_after: Option<u64>, body: &str) -> Option<HttpFailure> {
    match status {
        200..=299 => None,
        429 => Some(HttpFailure::RateLimited {
            retry_after_secs: retry_after.unwrap_or(5),
        }),
        401 | 403 => Some(HttpFailure::Unauthorized),
        _ => Some(HttpFailure::Status {
            status_code: status,
            message: body.to_string(),
        }),
    }
}

/// Pass a successful response through, or turn it into an `HttpFailure`.
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, HttpFailure> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let body = response.text().await.unwrap_or_default();
    warn!(status, body = %body, "Service returned error");

    Err(classify(status, retry_after, &body).unwrap_or(HttpFailure::Status {
        status_code: status,
        message: body,
    }))
}

impl From<HttpFailure> for CompletionError {
    fn from(f: HttpFailure) -> Self {
        match f {
            HttpFailure::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            HttpFailure::Unauthorized => {
                Self::AuthenticationFailed("Invalid API key or insufficient permissions".into())
            }
            HttpFailure::Status {
                status_code,
                message,
            } => Self::ApiError {
                status_code,
                message,
            },
            HttpFailure::Network(m) => Self::Network(m),
        }
    }
}

impl From<HttpFailure> for EmbeddingError {
    fn from(f: HttpFailure) -> Self {
        match f {
            HttpFailure::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            HttpFailure::Unauthorized => Self::AuthenticationFailed("Invalid API key".into()),
            HttpFailure::Status {
                status_code,
                message,
            } => Self::ApiError {
                status_code,
                message,
            },
            HttpFailure::Network(m) => Self::Network(m),
        }
    }
}

impl From<HttpFailure> for SynthesisError {
    fn from(f: HttpFailure) -> Self {
        match f {
            HttpFailure::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            HttpFailure::Unauthorized => Self::AuthenticationFailed("Invalid speech key".into()),
            HttpFailure::Status {
                status_code,
                message,
            } => Self::ApiError {
                status_code,
                message,
            },
            HttpFailure::Network(m) => Self::Network(m),
        }
    }
}
