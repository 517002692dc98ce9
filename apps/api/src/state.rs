use std::sync::Arc;

use crate::generation::client::GenerationBackend;
use crate::generation::presentation::DisplayPolicy;
use crate::llm_client::LlmClient;
use crate::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable generation backend. Default: HttpGenerationClient.
    pub generator: Arc<dyn GenerationBackend>,
    pub llm: LlmClient,
    pub display: DisplayPolicy,
}
