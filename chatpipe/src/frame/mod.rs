// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Data-stream frame parsing
//
// Responsibilities:
// - Split a decoded fragment into newline-delimited frames
// - Parse each frame into a typed kind + payload
// - Keep text-delta frames, skip every other kind (known or unknown)
// - Apply the configured policy to malformed lines

mod parser;
mod types;

pub use parser::{extract_text, parse_frame};
pub use types::{FrameError, FrameKind, MalformedFramePolicy, WireFrame};
