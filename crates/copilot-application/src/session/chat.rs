use crate::pipeline::{IntegrationPipeline, SubmitRequest};
use copilot_core::backend::ModelId;
use copilot_core::credentials::PlatformCredentialSet;
use copilot_core::error::PipelineError;
use copilot_core::platform::Platform;
use copilot_core::session::ConversationTurn;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// First assistant turn of every fresh session.
pub const GREETING: &str =
    "Hello! I'm your Logistics Integration Co-pilot. How can I help you generate integration code today?";

/// Rejections that happen before the pipeline runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("A request is already in progress")]
    Busy,

    #[error("Message is empty")]
    EmptyPrompt,
}

/// What happened to a submitted message.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The assistant turn that was appended.
    Replied(ConversationTurn),
    /// An error turn was appended; `error` keeps the structured cause.
    Failed {
        turn: ConversationTurn,
        error: PipelineError,
    },
    /// The session was reset while the request was running; nothing was appended.
    Discarded,
}

/// Per-session inputs that are not part of the conversation itself.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub platform: Platform,
    pub preferred_model: Option<ModelId>,
    pub api_key: Option<String>,
    pub credentials: PlatformCredentialSet,
}

struct SessionState {
    /// Always starts with the greeting turn.
    turns: Vec<ConversationTurn>,
    settings: SessionSettings,
    /// Bumped by `reset`; replies from an older epoch are dropped.
    epoch: u64,
    /// Epoch of the request currently running, if any.
    in_flight: Option<u64>,
}

/// Ordered message log plus the single-request guard around the pipeline.
///
/// All state sits behind one lock that is never held across the pipeline
/// call, so `turns()` and `reset()` stay responsive while a request runs.
pub struct ChatSession {
    pipeline: Arc<IntegrationPipeline>,
    state: RwLock<SessionState>,
}

impl ChatSession {
    pub fn new(pipeline: Arc<IntegrationPipeline>, settings: SessionSettings) -> Self {
        Self {
            pipeline,
            state: RwLock::new(SessionState {
                turns: vec![ConversationTurn::assistant_text(GREETING)],
                settings,
                epoch: 0,
                in_flight: None,
            }),
        }
    }

    /// Snapshot of the message log.
    pub async fn turns(&self) -> Vec<ConversationTurn> {
        self.state.read().await.turns.clone()
    }

    pub async fn is_busy(&self) -> bool {
        let state = self.state.read().await;
        state.in_flight == Some(state.epoch)
    }

    pub async fn platform(&self) -> Platform {
        self.state.read().await.settings.platform
    }

    pub async fn set_platform(&self, platform: Platform) {
        self.state.write().await.settings.platform = platform;
    }

    pub async fn preferred_model(&self) -> Option<ModelId> {
        self.state.read().await.settings.preferred_model.clone()
    }

    /// `None` goes back to the cached model and the fallback list.
    pub async fn set_preferred_model(&self, model: Option<ModelId>) {
        self.state.write().await.settings.preferred_model = model;
    }

    /// Key typed into the session; `None` falls back to `secret.json` and the environment.
    pub async fn set_api_key(&self, api_key: Option<String>) {
        self.state.write().await.settings.api_key = api_key;
    }

    pub async fn set_credentials(&self, credentials: PlatformCredentialSet) {
        self.state.write().await.settings.credentials = credentials;
    }

    /// Starts a new conversation.
    ///
    /// A request still running keeps going but its reply is discarded, and
    /// the session accepts new messages immediately.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.in_flight = None;
        state.turns = vec![ConversationTurn::assistant_text(GREETING)];
        tracing::info!(epoch = state.epoch, "Session reset");
    }

    /// Appends `text` as a user turn, runs the pipeline and appends the reply.
    ///
    /// Pipeline failures are not returned as `Err`: they become an error turn
    /// and a [`SubmitOutcome::Failed`].
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }

        let (epoch, request) = {
            let mut state = self.state.write().await;
            if state.in_flight == Some(state.epoch) {
                return Err(SessionError::Busy);
            }
            state.in_flight = Some(state.epoch);

            let request = SubmitRequest {
                prompt: text.to_string(),
                // the greeting is display-only and never replayed
                history: state.turns.iter().skip(1).cloned().collect(),
                api_key: state.settings.api_key.clone(),
                platform: state.settings.platform,
                preferred_model: state.settings.preferred_model.clone(),
                credentials: state.settings.credentials.clone(),
            };
            state.turns.push(ConversationTurn::user(text));
            (state.epoch, request)
        };

        let result = self.pipeline.submit(request).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(epoch, current = state.epoch, "Discarding reply from a reset session");
            return Ok(SubmitOutcome::Discarded);
        }
        state.in_flight = None;

        let outcome = match result {
            Ok(reply) => {
                let turn = reply.into_turn();
                state.turns.push(turn.clone());
                SubmitOutcome::Replied(turn)
            }
            Err(error) => {
                tracing::error!(kind = ?error.kind(), "Request failed: {}", error);
                let turn = ConversationTurn::assistant_error(format!(
                    "Sorry, I encountered an error: {}",
                    error.diagnostic()
                ));
                state.turns.push(turn.clone());
                SubmitOutcome::Failed { turn, error }
            }
        };
        Ok(outcome)
    }
}
