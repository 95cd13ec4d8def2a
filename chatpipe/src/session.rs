// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Chat session: request dispatch for one conversation.
//
// Responsibilities:
// - Reject blank prompts without side effects
// - Record the user entry, build the request body and its digest
// - Open the agent stream and allocate the assistant entry
// - Run the stream pump to completion
// - Turn any failure into a visible error and clear the loading flag

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::{AgentBackend, AgentRequest, BackendError};
use crate::config::{ChatConfig, HistoryMode};
use crate::frame::MalformedFramePolicy;
use crate::message::{ConversationEntry, Role, WireMessage};
use crate::store::{MessageStore, StoreError, StoreObserver};
use crate::stream::{PumpError, StreamPump};

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Failure of one submission. Always caught by `submit` and turned into
/// the session's visible error string.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("agent backend returned no response stream")]
    BackendUnavailable,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Stream(#[from] PumpError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What a call to `submit` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank prompt: nothing recorded, nothing sent.
    Ignored,
    /// The reply streamed to completion.
    Completed { user_id: u64, assistant_id: u64 },
    /// The submission failed; `error` is what the session now displays.
    Failed {
        user_id: u64,
        assistant_id: Option<u64>,
        error: String,
    },
}

/// Per-session behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub history: HistoryMode,
    pub on_malformed_frame: MalformedFramePolicy,
}

impl From<&ChatConfig> for SessionOptions {
    fn from(config: &ChatConfig) -> Self {
        Self {
            history: config.history,
            on_malformed_frame: config.on_malformed_frame,
        }
    }
}

#[derive(Serialize)]
struct RequestBody<M: Serialize> {
    messages: Vec<M>,
}

// ---------------------------------------------------------------------------
// ChatSession
// ---------------------------------------------------------------------------

/// One conversation with one agent.
///
/// `submit` takes `&mut self`, so a second prompt cannot be dispatched
/// while a reply is still streaming.
pub struct ChatSession {
    backend: Arc<dyn AgentBackend>,
    store: MessageStore,
    pump: StreamPump,
    history: HistoryMode,
    loading: bool,
    error: Option<String>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn AgentBackend>, options: SessionOptions) -> Self {
        Self {
            backend,
            store: MessageStore::new(),
            pump: StreamPump::new(options.on_malformed_frame),
            history: options.history,
            loading: false,
            error: None,
        }
    }

    /// Attach the rendering surface's change hook.
    pub fn with_observer(mut self, observer: Box<dyn StoreObserver>) -> Self {
        self.store.set_observer(observer);
        self
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        self.store.entries()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// True between dispatching a request and receiving its stream.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error from the most recent failed submission, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Send `prompt` to the agent and stream the reply into the store.
    ///
    /// Never fails outward: errors end up in `error()` and in the
    /// returned outcome, and the loading flag is always cleared.
    pub async fn submit(&mut self, prompt: &str) -> SubmitOutcome {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            tracing::debug!("ignoring blank prompt");
            return SubmitOutcome::Ignored;
        }

        let request_id = Uuid::new_v4();
        let user_id = self.store.push_user(prompt);
        self.error = None;
        self.loading = true;

        let mut assistant_id = None;
        let result = self
            .dispatch(prompt, request_id, &mut assistant_id)
            .await;
        self.loading = false;

        match result {
            Ok(assistant_id) => {
                tracing::info!(%request_id, user_id, assistant_id, "reply complete");
                SubmitOutcome::Completed {
                    user_id,
                    assistant_id,
                }
            }
            Err(e) => {
                tracing::error!(%request_id, user_id, error = %e, "submission failed");
                if let Some(id) = assistant_id {
                    // The pump leaves a failed entry in progress; close it
                    // here so the next submission can open a new one.
                    if let Err(finish_err) = self.store.finish(id) {
                        tracing::warn!(%request_id, id, error = %finish_err, "could not finish failed entry");
                    }
                }
                let message = e.to_string();
                self.error = Some(message.clone());
                SubmitOutcome::Failed {
                    user_id,
                    assistant_id,
                    error: message,
                }
            }
        }
    }

    async fn dispatch(
        &mut self,
        prompt: &str,
        request_id: Uuid,
        assistant_slot: &mut Option<u64>,
    ) -> Result<u64, ChatError> {
        let request = self.build_request(prompt)?;
        tracing::info!(
            %request_id,
            bytes = request.body.len(),
            content_sha256 = %request.content_sha256,
            "dispatching prompt"
        );

        let response = self.backend.stream(request).await?;
        let body = response.body.ok_or(ChatError::BackendUnavailable)?;
        self.loading = false;

        let id = self.store.push_assistant()?;
        *assistant_slot = Some(id);
        tracing::debug!(%request_id, message_id = id, status = %response.status, "streaming reply");

        self.pump.consume(body, id, &mut self.store).await?;
        Ok(id)
    }

    /// Serialize the conversation once and digest exactly those bytes.
    fn build_request(&self, prompt: &str) -> Result<AgentRequest, ChatError> {
        let body = match self.history {
            HistoryMode::PromptOnly => serde_json::to_vec(&RequestBody {
                messages: vec![prompt],
            })?,
            HistoryMode::Full => serde_json::to_vec(&RequestBody {
                messages: self
                    .store
                    .entries()
                    .iter()
                    .filter(|e| e.role == Role::User || !e.text.is_empty())
                    .map(WireMessage::from)
                    .collect(),
            })?,
        };
        Ok(AgentRequest::from_body(body))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
