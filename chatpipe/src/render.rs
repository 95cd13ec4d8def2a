// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Terminal rendering surface
//
// Follows the message store and writes assistant text as it streams in.
// Every change flushes the writer, the terminal's version of keeping the
// latest entry scrolled into view.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::message::{ConversationEntry, Role};
use crate::store::{StoreEvent, StoreObserver};

/// Label printed before assistant replies.
pub const AGENT_LABEL: &str = "agent> ";

/// Writes streamed replies to a shared writer (stdout in the binary).
pub struct TerminalRenderer<W: Write + Send> {
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: Arc<Mutex<W>>) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> StoreObserver for TerminalRenderer<W> {
    fn on_change(&self, event: StoreEvent<'_>, _entries: &[ConversationEntry]) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let result = match event {
            StoreEvent::EntryAdded {
                role: Role::Assistant,
                ..
            } => write!(out, "{AGENT_LABEL}"),
            StoreEvent::EntryAdded { .. } => Ok(()),
            StoreEvent::TextAppended { delta, .. } => write!(out, "{delta}"),
            StoreEvent::Finished { .. } => writeln!(out),
        };
        if let Err(e) = result.and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }
}

/// Plain-text transcript of the conversation, one block per entry.
pub fn format_transcript(entries: &[ConversationEntry]) -> String {
    let mut transcript = String::new();
    for entry in entries {
        let marker = if entry.in_progress { " (streaming)" } else { "" };
        transcript.push_str(&format!(
            "[{}] {} {}{}:\n{}\n",
            entry.id,
            entry.created_at.format("%H:%M:%S"),
            entry.role.as_str(),
            marker,
            entry.text
        ));
    }
    transcript
}
