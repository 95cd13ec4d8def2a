// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Frame types
//
// Core types for the line-oriented data stream: frame kinds, parsed
// frames, malformed-record policy, and parse errors.

use std::fmt;

// ---------------------------------------------------------------------------
// Frame kinds
// ---------------------------------------------------------------------------

/// Discriminator of a data-stream frame.
///
/// Each line on the wire is `<code>:<json>`. Only `Text` carries a payload
/// the consumer uses; the other kinds are recognized so they can be
/// skipped (and occasionally logged) without guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// `0` — a fragment of assistant text to append.
    Text,
    /// `2` — arbitrary JSON data array.
    Data,
    /// `3` — an error string reported by the backend.
    Error,
    /// `8` — message annotations.
    MessageAnnotations,
    /// `9` — a complete tool call.
    ToolCall,
    /// `a` — a tool result.
    ToolResult,
    /// `b` — start of a streamed tool call.
    ToolCallStreamingStart,
    /// `c` — tool call argument delta.
    ToolCallDelta,
    /// `d` — end of the message, with finish reason and usage.
    FinishMessage,
    /// `e` — end of one model step.
    FinishStep,
    /// `f` — start of one model step.
    StartStep,
    /// `g` — reasoning text.
    Reasoning,
    /// `h` — a cited source.
    Source,
    /// `i` — redacted reasoning.
    RedactedReasoning,
    /// `j` — reasoning signature.
    ReasoningSignature,
    /// `k` — a file part.
    File,
    /// A code this consumer does not know. Skipped, never an error.
    Unknown(String),
}

impl FrameKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => FrameKind::Text,
            "2" => FrameKind::Data,
            "3" => FrameKind::Error,
            "8" => FrameKind::MessageAnnotations,
            "9" => FrameKind::ToolCall,
            "a" => FrameKind::ToolResult,
            "b" => FrameKind::ToolCallStreamingStart,
            "c" => FrameKind::ToolCallDelta,
            "d" => FrameKind::FinishMessage,
            "e" => FrameKind::FinishStep,
            "f" => FrameKind::StartStep,
            "g" => FrameKind::Reasoning,
            "h" => FrameKind::Source,
            "i" => FrameKind::RedactedReasoning,
            "j" => FrameKind::ReasoningSignature,
            "k" => FrameKind::File,
            other => FrameKind::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Unknown(code) => write!(f, "unknown({code})"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsed frame
// ---------------------------------------------------------------------------

/// One parsed line of the data stream. Transient: produced and consumed
/// within a single extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    pub kind: FrameKind,
    /// Present only for `FrameKind::Text`.
    pub payload: Option<String>,
}

// ---------------------------------------------------------------------------
// Malformed record handling
// ---------------------------------------------------------------------------

/// What to do with a line that does not follow the framing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedFramePolicy {
    /// Fail the whole fragment.
    #[default]
    Abort,
    /// Drop the line, log a warning, keep going.
    Skip,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A line that could not be parsed as a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame has no type separator: {line:?}")]
    MissingSeparator { line: String },

    #[error("frame has an empty type code: {line:?}")]
    EmptyCode { line: String },

    #[error("frame value is not valid JSON: {line:?}: {source}")]
    InvalidJson {
        line: String,
        source: serde_json::Error,
    },

    #[error("text frame value is not a string: {line:?}")]
    TextNotString { line: String },
}
