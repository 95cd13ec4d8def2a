// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Raw YAML deserialization types (internal)
// Strings stay unvalidated here; interpolation and enum parsing happen in
// the loader so errors can name the offending value.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    pub endpoint: Option<String>,
    pub agent_id: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub history: Option<String>,
    pub on_malformed_frame: Option<String>,
}
