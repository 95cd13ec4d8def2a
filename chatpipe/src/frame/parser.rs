// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Frame parsing
//
// Turns complete data-stream lines into typed frames and folds the text
// deltas of a fragment into one string.

use super::types::{FrameError, FrameKind, MalformedFramePolicy, WireFrame};

/// Parse one line of the data stream.
///
/// Format:
/// ```text
/// <code>:<json value>
/// ```
///
/// The code is everything before the first `:`. Only text frames have
/// their value checked: it must be a JSON string. Any other kind, known or
/// not, is returned without a payload whatever its value. A trailing `\r`
/// is ignored.
pub fn parse_frame(line: &str) -> Result<WireFrame, FrameError> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    let (code, raw_value) = line
        .split_once(':')
        .ok_or_else(|| FrameError::MissingSeparator {
            line: line.to_string(),
        })?;

    if code.is_empty() {
        return Err(FrameError::EmptyCode {
            line: line.to_string(),
        });
    }

    let kind = FrameKind::from_code(code);
    match kind {
        FrameKind::Text => {
            let value: serde_json::Value =
                serde_json::from_str(raw_value).map_err(|source| FrameError::InvalidJson {
                    line: line.to_string(),
                    source,
                })?;
            match value {
                serde_json::Value::String(text) => Ok(WireFrame {
                    kind,
                    payload: Some(text),
                }),
                _ => Err(FrameError::TextNotString {
                    line: line.to_string(),
                }),
            }
        }
        FrameKind::Error => {
            match serde_json::from_str::<serde_json::Value>(raw_value) {
                Ok(value) => tracing::warn!(error = %value, "backend reported an error frame"),
                Err(_) => tracing::warn!(raw = raw_value, "backend reported an error frame"),
            }
            Ok(WireFrame {
                kind,
                payload: None,
            })
        }
        // Values of other kinds are never read.
        _ => Ok(WireFrame {
            kind,
            payload: None,
        }),
    }
}

/// Concatenate the payloads of all text frames in `fragment`, in order.
///
/// `fragment` must hold only complete lines; withholding a partial
/// trailing line is the caller's job. Empty lines and non-text frames
/// contribute nothing. Malformed lines are handled per `policy`.
pub fn extract_text(fragment: &str, policy: MalformedFramePolicy) -> Result<String, FrameError> {
    let mut text = String::new();

    for line in fragment.split('\n') {
        if line.is_empty() || line == "\r" {
            continue;
        }

        match parse_frame(line) {
            Ok(WireFrame {
                payload: Some(payload),
                ..
            }) => text.push_str(&payload),
            Ok(frame) => {
                tracing::trace!(kind = %frame.kind, "skipping non-text frame");
            }
            Err(e) => match policy {
                MalformedFramePolicy::Abort => return Err(e),
                MalformedFramePolicy::Skip => {
                    tracing::warn!(error = %e, "skipping malformed frame");
                }
            },
        }
    }

    Ok(text)
}
