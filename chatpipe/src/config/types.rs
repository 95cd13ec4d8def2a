// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

use crate::frame::MalformedFramePolicy;

/// Agent endpoint used when neither config nor environment names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4111";

/// Agent addressed when none is configured.
pub const DEFAULT_AGENT_ID: &str = "weatherAgent";

/// Parsed and validated client config.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Base URL of the agent server, without trailing slash.
    pub endpoint: String,
    /// Agent to address under `/api/agents/{agent_id}/stream`.
    pub agent_id: String,
    /// Bound on establishing the connection. Stream reads are unbounded.
    pub connect_timeout_ms: Option<u64>,
    /// Which part of the conversation goes into each request.
    pub history: HistoryMode,
    /// How the stream pump treats lines it cannot parse.
    pub on_malformed_frame: MalformedFramePolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            connect_timeout_ms: None,
            history: HistoryMode::default(),
            on_malformed_frame: MalformedFramePolicy::default(),
        }
    }
}

/// Conversation content sent with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// `{"messages": ["<prompt>"]}`: only the prompt just submitted.
    #[default]
    PromptOnly,
    /// Every user entry and every non-empty assistant reply, with roles.
    Full,
}
