//! Pipeline State Machine: owns the user-visible generation status of one
//! editor session and sequences the client, the clarification session, and
//! the normalizer.
//!
//! ```text
//! idle → submitting → generating → { needs_clarification | done | error }
//! needs_clarification → submitting            (clarification resubmit)
//! needs_clarification | done | error → idle   (fresh submission / prompt edit)
//! ```
//!
//! Only one request is ever in flight: a submit while `submitting` or
//! `generating` is dropped, not queued.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::generation::clarification::ClarificationSession;
use crate::generation::client::{Answers, GenerationBackend, GenerationRequest, Outcome};
use crate::generation::normalizer::normalize;
use crate::models::resume::ResumeRecord;
use crate::sessions::SharedSession;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Submitting,
    Generating,
    NeedsClarification,
    Done,
    Error,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Idle => "idle",
            PipelineStatus::Submitting => "submitting",
            PipelineStatus::Generating => "generating",
            PipelineStatus::NeedsClarification => "needs_clarification",
            PipelineStatus::Done => "done",
            PipelineStatus::Error => "error",
        }
    }

    /// A request is being prepared or is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineStatus::Submitting | PipelineStatus::Generating)
    }

    /// The complete edge set of the state machine.
    pub fn can_transition_to(&self, next: PipelineStatus) -> bool {
        use PipelineStatus::*;
        matches!(
            (*self, next),
            (Idle, Submitting)
                | (Submitting, Generating)
                | (Generating, NeedsClarification)
                | (Generating, Done)
                | (Generating, Error)
                | (NeedsClarification, Submitting)
                | (NeedsClarification, Idle)
                | (Done, Idle)
                | (Error, Idle)
        )
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitKind {
    /// A brand-new prompt; clarification state starts over.
    Fresh,
    /// Answers to the outstanding questions of the current submission.
    Clarification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// A request is already in flight.
    Busy(PipelineStatus),
    /// A clarification resubmit was requested with no questions outstanding.
    NoClarificationPending(PipelineStatus),
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    status: PipelineStatus,
    error: Option<String>,
    clarification: ClarificationSession,
    /// Statuses entered since the last fresh submission began.
    history: Vec<PipelineStatus>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            history: vec![PipelineStatus::Idle],
            ..Default::default()
        }
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clarification(&self) -> &ClarificationSession {
        &self.clarification
    }

    #[cfg(test)]
    pub fn history(&self) -> &[PipelineStatus] {
        &self.history
    }

    /// Stores an in-flight clarification answer.
    pub fn record_answer(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.clarification.record_answer(key, value);
    }

    /// Editing the prompt after a failure clears the error and returns to idle.
    pub fn prompt_edited(&mut self) {
        if self.status == PipelineStatus::Error {
            self.error = None;
            self.transition(PipelineStatus::Idle);
        }
    }

    /// Moves to `generating` and returns the request to send.
    ///
    /// Fails without touching any state when a request is already in flight,
    /// or when `kind` is a clarification resubmit and no questions are open.
    pub fn begin(
        &mut self,
        kind: SubmitKind,
        prompt: &str,
    ) -> Result<GenerationRequest, SubmitRejection> {
        if self.status.is_busy() {
            debug!("Dropping {kind:?} submit while {}", self.status);
            return Err(SubmitRejection::Busy(self.status));
        }

        match kind {
            SubmitKind::Fresh => {
                self.history = vec![self.status];
                if self.status != PipelineStatus::Idle {
                    self.transition(PipelineStatus::Idle);
                }
            }
            SubmitKind::Clarification => {
                if self.status != PipelineStatus::NeedsClarification {
                    return Err(SubmitRejection::NoClarificationPending(self.status));
                }
            }
        }

        self.transition(PipelineStatus::Submitting);
        self.error = None;
        let answers = match kind {
            SubmitKind::Fresh => {
                self.clarification.reset();
                Answers::new()
            }
            SubmitKind::Clarification => self.clarification.merge_for_resubmit(),
        };

        self.transition(PipelineStatus::Generating);
        Ok(GenerationRequest {
            prompt: prompt.to_string(),
            answers,
        })
    }

    /// Applies the outcome of the in-flight request. A successful payload is
    /// normalized and merged into `record`.
    pub fn complete(&mut self, outcome: Outcome, record: &mut ResumeRecord) -> PipelineStatus {
        if self.status != PipelineStatus::Generating {
            warn!("Ignoring generation outcome while {}", self.status);
            return self.status;
        }

        match outcome {
            Outcome::NeedsClarification {
                questions,
                extracted,
            } => {
                info!("Generation needs clarification ({} questions)", questions.len());
                self.clarification.begin_round(questions, extracted);
                self.transition(PipelineStatus::NeedsClarification);
            }
            Outcome::Success(payload) => {
                record.merge_patch(normalize(&payload));
                info!("Generation succeeded");
                self.transition(PipelineStatus::Done);
            }
            Outcome::QaFailed(issues) => {
                self.fail(format!("Quality check failed: {}", issues.join(", ")));
            }
            Outcome::Error { kind, message } => {
                debug!("Generation failed ({kind:?})");
                self.fail(message);
            }
            Outcome::Unclassified(status) => {
                let status = status.unwrap_or_else(|| "<none>".to_string());
                warn!("Unrecognized generation status '{status}'");
                self.fail(format!("Unrecognized response status: {status}"));
            }
        }
        self.status
    }

    fn fail(&mut self, message: String) {
        warn!("Generation failed: {message}");
        self.error = Some(message);
        self.transition(PipelineStatus::Error);
    }

    fn transition(&mut self, next: PipelineStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal pipeline transition {} -> {}",
            self.status,
            next
        );
        debug!("Pipeline {} -> {}", self.status, next);
        self.status = next;
        self.history.push(next);
    }
}

/// Sends `request` and applies the outcome to the session.
///
/// The session lock is not held across the network call, so pollers keep
/// seeing `generating` while the request is in flight.
pub async fn run_generation(
    session: SharedSession,
    backend: Arc<dyn GenerationBackend>,
    request: GenerationRequest,
) -> PipelineStatus {
    let outcome = backend.submit(&request).await;
    let mut session = session.lock().await;
    session.complete(outcome)
}
