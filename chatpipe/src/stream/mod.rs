// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Response stream consumption
//
// Responsibilities:
// - Pull chunks from the response body until it ends or fails
// - Decode bytes incrementally, carrying split characters across chunks
// - Withhold partial trailing lines until their newline arrives
// - Append extracted text deltas to the target assistant entry
// - Finish the entry on a clean end of stream, leave it in progress on error

mod decoder;
mod pump;

pub use decoder::Utf8Decoder;
pub use pump::{PumpError, StreamPump};
