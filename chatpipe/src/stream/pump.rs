// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Stream pump
//
// Takes a response byte stream, decodes it incrementally, cuts it into
// complete data-stream lines, extracts text deltas, and grows the target
// assistant entry in the message store until the stream ends.

use bytes::Bytes;
use tokio_stream::{Stream, StreamExt};

use super::decoder::Utf8Decoder;
use crate::backend::BackendError;
use crate::frame::{extract_text, FrameError, MalformedFramePolicy};
use crate::store::{MessageStore, StoreError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a stream stopped before completing.
///
/// In every case the target entry stays in progress; finalizing it is the
/// caller's decision.
#[derive(Debug, thiserror::Error)]
pub enum PumpError {
    #[error("response stream failed: {0}")]
    Read(#[source] BackendError),

    #[error("malformed response frame: {0}")]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Pump
// ---------------------------------------------------------------------------

/// Drains a response stream into one assistant entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamPump {
    policy: MalformedFramePolicy,
}

impl StreamPump {
    pub fn new(policy: MalformedFramePolicy) -> Self {
        Self { policy }
    }

    /// Consume `body` to completion, appending text deltas to entry
    /// `message_id`.
    ///
    /// On a clean end of stream the entry is finished. On error the entry
    /// keeps whatever text arrived and remains in progress. The stream is
    /// dropped on every return path.
    pub async fn consume<S>(
        &self,
        mut body: S,
        message_id: u64,
        store: &mut MessageStore,
    ) -> Result<(), PumpError>
    where
        S: Stream<Item = Result<Bytes, BackendError>> + Unpin,
    {
        let mut state = PumpState::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(PumpError::Read)?;
            state.chunks += 1;
            state.bytes += chunk.len();

            let decoded = state.decoder.decode(&chunk);
            state.line_buffer.push_str(&decoded);

            let complete = state.take_complete_lines();
            if complete.is_empty() {
                continue;
            }

            let delta = extract_text(&complete, self.policy)?;
            store.append(message_id, &delta)?;
        }

        // End of stream: whatever is left is the final record.
        let tail = state.take_remainder();
        if !tail.is_empty() {
            let delta = extract_text(&tail, self.policy)?;
            store.append(message_id, &delta)?;
        }

        store.finish(message_id)?;

        tracing::debug!(
            message_id,
            chunks = state.chunks,
            bytes = state.bytes,
            "response stream complete"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pump state
// ---------------------------------------------------------------------------

/// Mutable state carried through the read loop.
struct PumpState {
    decoder: Utf8Decoder,
    /// Decoded text not yet terminated by a newline.
    line_buffer: String,
    chunks: usize,
    bytes: usize,
}

impl PumpState {
    fn new() -> Self {
        Self {
            decoder: Utf8Decoder::new(),
            line_buffer: String::new(),
            chunks: 0,
            bytes: 0,
        }
    }

    /// Split off every complete line, keeping a partial trailing line
    /// buffered for the next chunk.
    fn take_complete_lines(&mut self) -> String {
        match self.line_buffer.rfind('\n') {
            Some(pos) => {
                let partial = self.line_buffer.split_off(pos + 1);
                std::mem::replace(&mut self.line_buffer, partial)
            }
            None => String::new(),
        }
    }

    /// Flush the decoder and return everything still buffered.
    fn take_remainder(&mut self) -> String {
        let flushed = self.decoder.finish();
        self.line_buffer.push_str(&flushed);
        std::mem::take(&mut self.line_buffer)
    }
}
