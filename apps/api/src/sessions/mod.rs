//! Editor sessions: one résumé record plus its generation pipeline,
//! held in memory for the lifetime of a browser editing session.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::clarification::ClarificationQuestion;
use crate::generation::client::{Answers, GenerationRequest, Outcome};
use crate::generation::pipeline::{Pipeline, PipelineStatus, SubmitKind, SubmitRejection};
use crate::generation::presentation::{DisplayPolicy, PresentedStatus};
use crate::models::resume::{value_to_text, FieldEdit, ResumeRecord, Section};
use crate::models::validation::validate_field;

pub type SharedSession = Arc<Mutex<EditorSession>>;

#[derive(Debug)]
pub struct EditorSession {
    id: Uuid,
    prompt: String,
    resume: ResumeRecord,
    pipeline: Pipeline,
    /// When the in-flight (or last) request was sent.
    request_started: Option<Instant>,
    /// Monotonic twin of `updated_at`, used for idle eviction.
    last_active: Instant,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// What the front end polls.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub prompt: String,
    #[serde(flatten)]
    pub presented: PresentedStatus,
    /// The state machine's own status, ahead of `status` while a success is held back.
    pub pipeline_status: PipelineStatus,
    pub error: Option<String>,
    pub questions: Vec<ClarificationQuestion>,
    pub answers: Answers,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EditorSession {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            prompt: String::new(),
            resume: ResumeRecord::new(),
            pipeline: Pipeline::new(),
            request_started: None,
            last_active: Instant::now(),
            created_at: now,
            updated_at: now,
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[cfg(test)]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn resume(&self) -> &ResumeRecord {
        &self.resume
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.last_active = Instant::now();
    }

    /// Untouched for at least `ttl` and not waiting on the backend.
    pub fn is_idle(&self, ttl: Duration) -> bool {
        !self.pipeline.status().is_busy() && self.last_active.elapsed() >= ttl
    }

    pub fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
        self.pipeline.prompt_edited();
        self.touch();
    }

    /// Starts a submission. A fresh submission may carry replacement prompt text.
    pub fn begin_submit(
        &mut self,
        kind: SubmitKind,
        prompt: Option<String>,
    ) -> Result<GenerationRequest, SubmitRejection> {
        if self.pipeline.status().is_busy() {
            return Err(SubmitRejection::Busy(self.pipeline.status()));
        }
        if let (SubmitKind::Fresh, Some(prompt)) = (kind, prompt) {
            self.prompt = prompt;
        }

        let request = self.pipeline.begin(kind, &self.prompt)?;
        self.request_started = Some(Instant::now());
        self.touch();
        Ok(request)
    }

    pub fn complete(&mut self, outcome: Outcome) -> PipelineStatus {
        let status = self.pipeline.complete(outcome, &mut self.resume);
        self.touch();
        status
    }

    pub fn record_answer(&mut self, field: String, value: String) {
        self.pipeline.record_answer(field, value);
        self.touch();
    }

    /// Applies a form edit and returns the inline validation message, if any.
    pub fn apply_edit(&mut self, edit: &FieldEdit) -> Result<Option<String>, AppError> {
        self.resume.apply_edit(edit)?;
        self.touch();
        Ok(validate_field(
            edit.section,
            &edit.field,
            &value_to_text(&edit.value),
        ))
    }

    pub fn add_entry(&mut self, section: Section) -> Result<(), AppError> {
        self.resume.add_entry(section)?;
        self.touch();
        Ok(())
    }

    pub fn remove_entry(&mut self, section: Section, index: usize) -> Result<(), AppError> {
        self.resume.remove_entry(section, index)?;
        self.touch();
        Ok(())
    }

    pub fn view(&self, policy: &DisplayPolicy) -> SessionView {
        let status = self.pipeline.status();
        let elapsed = self.request_started.map(|started| started.elapsed());
        let clarification = self.pipeline.clarification();
        SessionView {
            id: self.id,
            prompt: self.prompt.clone(),
            presented: policy.present(status, elapsed),
            pipeline_status: status,
            error: self.pipeline.error().map(String::from),
            questions: clarification.questions().to_vec(),
            answers: clarification.answers().clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// All live sessions, keyed by id.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SharedSession {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(EditorSession::new(id)));
        self.sessions.write().await.insert(id, session.clone());
        info!("Opened editor session {id}");
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Closed editor session {id}"))
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for `ttl`. Sessions locked by a request are
    /// in use and kept. Returns how many were evicted.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => !session.is_idle(ttl),
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle editor sessions");
        }
        evicted
    }

    /// Runs [`SessionStore::evict_idle`] every `every` until the task is aborted.
    pub fn spawn_idle_sweeper(&self, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(ttl).await;
                debug!("Idle sweep done ({evicted} evicted)");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_store_create_get_remove() {
        let store = SessionStore::new();
        let session = store.create().await;
        let id = session.lock().await.id();

        assert!(store.get(id).await.is_ok());
        assert_eq!(store.len().await, 1);

        store.remove(id).await.unwrap();
        assert!(matches!(store.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.remove(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fresh_submit_replaces_prompt() {
        let mut session = EditorSession::new(Uuid::new_v4());
        session.set_prompt("draft".to_string());

        let request = session
            .begin_submit(SubmitKind::Fresh, Some("Senior backend engineer, 5 years".to_string()))
            .unwrap();

        assert_eq!(request.prompt, "Senior backend engineer, 5 years");
        assert_eq!(session.prompt(), "Senior backend engineer, 5 years");
    }

    #[tokio::test]
    async fn test_busy_submit_keeps_prompt() {
        let mut session = EditorSession::new(Uuid::new_v4());
        session
            .begin_submit(SubmitKind::Fresh, Some("first".to_string()))
            .unwrap();

        let rejected = session.begin_submit(SubmitKind::Fresh, Some("second".to_string()));

        assert_eq!(rejected, Err(SubmitRejection::Busy(PipelineStatus::Generating)));
        assert_eq!(session.prompt(), "first");
    }

    #[tokio::test]
    async fn test_apply_edit_returns_validation_message() {
        let mut session = EditorSession::new(Uuid::new_v4());
        let message = session
            .apply_edit(&FieldEdit {
                section: None,
                index: 0,
                field: "email".to_string(),
                value: json!("not-an-email"),
            })
            .unwrap();
        assert_eq!(message.as_deref(), Some("Enter a valid email."));
        assert_eq!(session.resume().email, "not-an-email");
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_holds_success_for_minimum_display() {
        let policy = DisplayPolicy {
            min_success_display: Duration::from_secs(8),
        };
        let mut session = EditorSession::new(Uuid::new_v4());
        session
            .begin_submit(SubmitKind::Fresh, Some("p".to_string()))
            .unwrap();
        session.complete(Outcome::Success(json!({"summary": "X"})));

        let early = session.view(&policy);
        assert_eq!(early.pipeline_status, PipelineStatus::Done);
        assert_eq!(early.presented.status, PipelineStatus::Generating);

        tokio::time::advance(Duration::from_secs(8)).await;
        let late = session.view(&policy);
        assert_eq!(late.presented.status, PipelineStatus::Done);
        assert_eq!(session.resume().summary, "X");
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_keeps_recently_touched() {
        let store = SessionStore::new();
        let stale = store.create().await;
        let fresh = store.create().await;
        let stale_id = stale.lock().await.id();
        let fresh_id = fresh.lock().await.id();

        tokio::time::advance(Duration::from_secs(30 * 60)).await;
        fresh.lock().await.set_prompt("still typing".to_string());
        tokio::time::advance(Duration::from_secs(31 * 60)).await;

        assert_eq!(store.evict_idle(Duration::from_secs(3600)).await, 1);
        assert!(matches!(store.get(stale_id).await, Err(AppError::NotFound(_))));
        assert!(store.get(fresh_id).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_skips_busy_and_locked_sessions() {
        let store = SessionStore::new();
        let generating = store.create().await;
        generating
            .lock()
            .await
            .begin_submit(SubmitKind::Fresh, Some("p".to_string()))
            .unwrap();
        let held = store.create().await;

        tokio::time::advance(Duration::from_secs(7200)).await;
        let _guard = held.lock().await;

        assert_eq!(store.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sweeper_evicts_abandoned_sessions() {
        let store = SessionStore::new();
        store.create().await;
        let sweeper = store.spawn_idle_sweeper(Duration::from_secs(3600), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30 * 60)).await;
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_secs(32 * 60)).await;
        assert_eq!(store.len().await, 0);
        sweeper.abort();
    }
}
