// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Conversation entry representation
//
// These are the canonical types the message store holds and the
// rendering surface displays. The dispatcher creates them; only the
// stream pump mutates assistant entries afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single turn in the conversation.
///
/// User entries are complete at creation. Assistant entries start empty
/// with `in_progress = true` and grow by append until the producing
/// stream completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    /// Unique within the conversation, strictly increasing, starts at 1.
    pub id: u64,
    pub role: Role,
    pub text: String,
    /// True while an assistant entry is still receiving deltas.
    pub in_progress: bool,
    pub created_at: DateTime<Utc>,
}

impl ConversationEntry {
    /// A finished user entry.
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            text: text.into(),
            in_progress: false,
            created_at: Utc::now(),
        }
    }

    /// An empty assistant entry awaiting streamed text.
    pub fn pending_assistant(id: u64) -> Self {
        Self {
            id,
            role: Role::Assistant,
            text: String::new(),
            in_progress: true,
            created_at: Utc::now(),
        }
    }
}

/// One message in the outbound request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage<'a> {
    pub role: Role,
    pub content: &'a str,
}

impl<'a> From<&'a ConversationEntry> for WireMessage<'a> {
    fn from(entry: &'a ConversationEntry) -> Self {
        Self {
            role: entry.role,
            content: &entry.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_entry_is_finished_at_creation() {
        let entry = ConversationEntry::user(1, "Hello");
        assert_eq!(entry.id, 1);
        assert_eq!(entry.role, Role::User);
        assert_eq!(entry.text, "Hello");
        assert!(!entry.in_progress);
    }

    #[test]
    fn pending_assistant_starts_empty_and_in_progress() {
        let entry = ConversationEntry::pending_assistant(2);
        assert_eq!(entry.role, Role::Assistant);
        assert!(entry.text.is_empty());
        assert!(entry.in_progress);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
        assert_eq!(
            serde_json::to_value(Role::Assistant).unwrap(),
            json!("assistant")
        );
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn wire_message_borrows_entry_text() {
        let entry = ConversationEntry::user(1, "Tokyo weather?");
        let wire = WireMessage::from(&entry);
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({"role": "user", "content": "Tokyo weather?"})
        );
    }
}
