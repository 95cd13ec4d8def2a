// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Incremental UTF-8 decoding
//
// Network chunks split wherever they like, including in the middle of a
// multi-byte character. The decoder holds back an incomplete trailing
// sequence until the next chunk completes it.

/// Stateful UTF-8 decoder for a chunked byte stream.
///
/// Invalid sequences decode to U+FFFD rather than failing the stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of an incomplete sequence carried over from the last chunk.
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, holding back a trailing incomplete sequence.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes.
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of stream. A dangling incomplete sequence becomes a
    /// single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
