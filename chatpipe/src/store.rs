// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Message store
//
// Ordered, append-only history of conversation entries for one session.
// The dispatcher appends entries; the stream pump grows and finalizes the
// in-progress assistant entry. Every change is reported to an optional
// observer so a rendering surface can follow along (scroll to latest,
// repaint the growing message).

use crate::message::{ConversationEntry, Role};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no entry with id {0}")]
    UnknownEntry(u64),

    #[error("entry {0} is not an assistant entry")]
    NotAssistant(u64),

    #[error("entry {0} is already finished")]
    Finalized(u64),

    #[error("assistant entry {0} is still streaming")]
    StreamInFlight(u64),
}

// ---------------------------------------------------------------------------
// Observer hook
// ---------------------------------------------------------------------------

/// A change applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent<'a> {
    /// A new entry was appended at the end of the history.
    EntryAdded { id: u64, role: Role },
    /// Text was appended to an in-progress assistant entry.
    TextAppended { id: u64, delta: &'a str },
    /// An assistant entry stopped receiving text.
    Finished { id: u64 },
}

/// Notified after every store mutation.
///
/// The rendering surface implements this to reflect the store and keep
/// the latest entry in view.
pub trait StoreObserver: Send + Sync {
    fn on_change(&self, event: StoreEvent<'_>, entries: &[ConversationEntry]);
}

// ---------------------------------------------------------------------------
// MessageStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MessageStore {
    entries: Vec<ConversationEntry>,
    observer: Option<Box<dyn StoreObserver>>,
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("entries", &self.entries)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: Box<dyn StoreObserver>) -> Self {
        Self {
            entries: Vec::new(),
            observer: Some(observer),
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn StoreObserver>) {
        self.observer = Some(observer);
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&ConversationEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `max(existing ids, 0) + 1`.
    pub fn next_id(&self) -> u64 {
        self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    /// Id of the assistant entry currently receiving text, if any.
    pub fn in_flight(&self) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.role == Role::Assistant && e.in_progress)
            .map(|e| e.id)
    }

    /// Append a finished user entry and return its id.
    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        let id = self.next_id();
        self.entries.push(ConversationEntry::user(id, text));
        self.notify(StoreEvent::EntryAdded {
            id,
            role: Role::User,
        });
        id
    }

    /// Append an empty in-progress assistant entry and return its id.
    ///
    /// Fails if another assistant entry is still streaming.
    pub fn push_assistant(&mut self) -> Result<u64, StoreError> {
        if let Some(busy) = self.in_flight() {
            return Err(StoreError::StreamInFlight(busy));
        }
        let id = self.next_id();
        self.entries.push(ConversationEntry::pending_assistant(id));
        self.notify(StoreEvent::EntryAdded {
            id,
            role: Role::Assistant,
        });
        Ok(id)
    }

    /// Append `delta` to the in-progress assistant entry `id`.
    ///
    /// An empty delta changes nothing and is not reported.
    pub fn append(&mut self, id: u64, delta: &str) -> Result<(), StoreError> {
        let entry = self.streaming_entry_mut(id)?;
        if delta.is_empty() {
            return Ok(());
        }
        entry.text.push_str(delta);
        self.notify(StoreEvent::TextAppended { id, delta });
        Ok(())
    }

    /// Mark assistant entry `id` as finished.
    ///
    /// Returns `true` on the transition, `false` if it was already
    /// finished. The text is frozen from here on.
    pub fn finish(&mut self, id: u64) -> Result<bool, StoreError> {
        let entry = self.assistant_entry_mut(id)?;
        if !entry.in_progress {
            return Ok(false);
        }
        entry.in_progress = false;
        self.notify(StoreEvent::Finished { id });
        Ok(true)
    }

    fn assistant_entry_mut(&mut self, id: u64) -> Result<&mut ConversationEntry, StoreError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::UnknownEntry(id))?;
        if entry.role != Role::Assistant {
            return Err(StoreError::NotAssistant(id));
        }
        Ok(entry)
    }

    fn streaming_entry_mut(&mut self, id: u64) -> Result<&mut ConversationEntry, StoreError> {
        let entry = self.assistant_entry_mut(id)?;
        if !entry.in_progress {
            return Err(StoreError::Finalized(id));
        }
        Ok(entry)
    }

    fn notify(&self, event: StoreEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer.on_change(event, &self.entries);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
