// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Agent backend client
//
// Responsibilities:
// - Carry a serialized request body together with its SHA-256 digest
// - Open a streamed response from the agent's stream endpoint
// - Map transport failures and non-success statuses to BackendError
// - Hand back the response body as a byte stream (no buffering)

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::Stream;
use futures_util::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::pin::Pin;
use std::time::Duration;

use crate::config::ChatConfig;

/// Header carrying the hex SHA-256 of the request body.
pub const CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";

/// Longest error body kept when the backend answers with a failure status.
const MAX_ERROR_BODY_CHARS: usize = 512;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Streamed response body. Owned by whoever consumes it; dropping it
/// releases the underlying connection.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, BackendError>> + Send>>;

/// An outbound request to the agent: the exact body bytes and their digest.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRequest {
    pub body: Bytes,
    /// Lowercase hex SHA-256 of `body`.
    pub content_sha256: String,
}

impl AgentRequest {
    pub fn from_body(body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let content_sha256 = content_sha256(&body);
        Self {
            body,
            content_sha256,
        }
    }
}

/// Response from the agent backend.
pub struct AgentResponse {
    pub status: StatusCode,
    /// `None` when the backend answered without a body to stream.
    pub body: Option<BodyStream>,
}

impl std::fmt::Debug for AgentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentResponse")
            .field("status", &self.status)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Errors talking to the agent backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("agent request failed: {0}")]
    Transport(String),

    #[error("agent request timed out: {0}")]
    Timeout(String),

    #[error("agent returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to read response stream: {0}")]
    Read(String),

    #[error("invalid agent endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Lowercase hex SHA-256 digest of `body`.
pub fn content_sha256(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Trait: AgentBackend (dependency injection point)
// ---------------------------------------------------------------------------

/// Opens a streamed reply from the agent.
///
/// The session only talks to this trait, so tests can substitute an
/// in-memory backend.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn stream(&self, request: AgentRequest) -> Result<AgentResponse, BackendError>;
}

// ---------------------------------------------------------------------------
// Reqwest backend
// ---------------------------------------------------------------------------

pub struct ReqwestAgentBackend {
    client: reqwest::Client,
    stream_url: String,
}

impl ReqwestAgentBackend {
    /// Backend posting to `{endpoint}/api/agents/{agent_id}/stream`.
    pub fn new(client: reqwest::Client, endpoint: &str, agent_id: &str) -> Self {
        let stream_url = format!(
            "{}/api/agents/{}/stream",
            endpoint.trim_end_matches('/'),
            agent_id
        );
        Self { client, stream_url }
    }

    /// Build a client from config. Only the connect phase is bounded;
    /// reading the stream may take as long as the agent needs.
    pub fn from_config(config: &ChatConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::InvalidEndpoint(e.to_string()))?;
        Ok(Self::new(client, &config.endpoint, &config.agent_id))
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }
}

#[async_trait]
impl AgentBackend for ReqwestAgentBackend {
    async fn stream(&self, request: AgentRequest) -> Result<AgentResponse, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let digest = HeaderValue::from_str(&request.content_sha256)
            .map_err(|e| BackendError::Transport(format!("invalid digest header: {e}")))?;
        headers.insert(CONTENT_SHA256_HEADER, digest);

        tracing::debug!(
            url = %self.stream_url,
            bytes = request.body.len(),
            "opening agent stream"
        );

        let resp = self
            .client
            .post(&self.stream_url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(e.to_string())
                } else if e.is_builder() {
                    BackendError::InvalidEndpoint(e.to_string())
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(AgentResponse { status, body: None });
        }

        let stream = resp
            .bytes_stream()
            .map_err(|e| BackendError::Read(e.to_string()));
        Ok(AgentResponse {
            status,
            body: Some(Box::pin(stream)),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
