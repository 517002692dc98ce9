//! Generation Client: one POST to the résumé generation backend per call.
//!
//! The client never retries and never enforces its own timeout. Every reply is
//! classified into an [`Outcome`]; transport failures become `Outcome::Error`
//! so callers handle exactly one type.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::generation::clarification::ClarificationQuestion;

/// Path appended to the configured base URL.
pub const GENERATE_PATH: &str = "/api/generate-resume";

/// Shown when the backend reports `success: false` without an `error` field.
const FALLBACK_ERROR: &str = "Resume generation failed";

/// Answers sent alongside the prompt, keyed by field.
pub type Answers = BTreeMap<String, Value>;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("Invalid response body: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub answers: Answers,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    pub success: Option<bool>,
    pub status: Option<String>,
    pub data: Option<Value>,
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Outcomes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network failure, non-2xx status, or an unparseable body.
    Transport,
    /// The backend answered `success: false`.
    Application,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NeedsClarification {
        questions: Vec<ClarificationQuestion>,
        extracted: Map<String, Value>,
    },
    Success(Value),
    QaFailed(Vec<String>),
    Error {
        kind: FailureKind,
        message: String,
    },
    /// A status outside the recognised set (or none at all).
    Unclassified(Option<String>),
}

impl Outcome {
    fn transport(err: &GenerationError) -> Self {
        Outcome::Error {
            kind: FailureKind::Transport,
            message: err.to_string(),
        }
    }
}

/// Maps a decoded backend reply onto an [`Outcome`].
pub fn classify(response: GenerationResponse) -> Outcome {
    if response.success == Some(false) {
        return Outcome::Error {
            kind: FailureKind::Application,
            message: response
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR.to_string()),
        };
    }

    let data = response.data.unwrap_or(Value::Null);

    match response.status.as_deref() {
        Some("needs_clarification") => {
            let questions = data
                .get("questions")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, q)| ClarificationQuestion::from_wire(i, q))
                        .collect()
                })
                .unwrap_or_default();
            let extracted = data
                .get("extractedData")
                .or_else(|| data.get("extracted_data"))
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Outcome::NeedsClarification {
                questions,
                extracted,
            }
        }
        Some("success") => {
            // Two backend shapes: the résumé nested under `final_resume`, or `data` itself.
            let payload = match data.get("final_resume") {
                Some(inner) if !inner.is_null() => inner.clone(),
                _ => data,
            };
            Outcome::Success(payload)
        }
        Some("qa_failed") => {
            let issues = data
                .get("issues")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .map(|i| match i {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Outcome::QaFailed(issues)
        }
        other => Outcome::Unclassified(other.map(String::from)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend trait + HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can turn a prompt plus answers into an [`Outcome`].
///
/// Carried in `AppState` as `Arc<dyn GenerationBackend>`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn submit(&self, request: &GenerationRequest) -> Outcome;
}

#[derive(Clone)]
pub struct HttpGenerationClient {
    client: Client,
    endpoint: String,
}

impl HttpGenerationClient {
    pub fn new(base_url: &str) -> Result<Self, GenerationError> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and decodes the reply. Non-2xx is a transport failure
    /// even when the body carries `success: false`.
    pub async fn send(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    async fn submit(&self, request: &GenerationRequest) -> Outcome {
        debug!(
            "Submitting prompt ({} chars) with {} answers",
            request.prompt.len(),
            request.answers.len()
        );
        match self.send(request).await {
            Ok(response) => classify(response),
            Err(e) => {
                warn!("Generation request failed: {e}");
                Outcome::transport(&e)
            }
        }
    }
}
