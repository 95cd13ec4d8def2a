// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

use crate::frame::MalformedFramePolicy;

use super::error::ConfigError;
use super::interpolation::resolve_variables;
use super::raw;
use super::source::ConfigSource;
use super::types::*;

/// Load and validate client config from the given source.
///
/// Steps:
/// 1. Read raw YAML (absent source means all defaults)
/// 2. Parse YAML into raw deserialization types
/// 3. Resolve variable interpolation in string fields
/// 4. Validate endpoint, agent id, and enum-valued fields
/// 5. Build typed ChatConfig
pub fn load_config(source: &dyn ConfigSource) -> Result<ChatConfig, ConfigError> {
    let raw: raw::RawConfig = match source.load()? {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(&yaml)?,
        _ => raw::RawConfig::default(),
    };

    let endpoint = match raw.endpoint {
        Some(e) => resolve_field("endpoint", &e)?,
        None => DEFAULT_ENDPOINT.to_string(),
    };
    let endpoint = validate_endpoint(&endpoint)?;

    let agent_id = match raw.agent_id {
        Some(a) => resolve_field("agent_id", &a)?,
        None => DEFAULT_AGENT_ID.to_string(),
    };
    validate_agent_id(&agent_id)?;

    if raw.connect_timeout_ms == Some(0) {
        return Err(ConfigError::invalid(
            "connect_timeout_ms",
            "must be greater than 0",
        ));
    }

    let history = match raw.history.as_deref() {
        Some("prompt_only") | None => HistoryMode::PromptOnly,
        Some("full") => HistoryMode::Full,
        Some(other) => {
            return Err(ConfigError::invalid(
                "history",
                format!("\"{other}\", expected \"prompt_only\" or \"full\""),
            ));
        }
    };

    let on_malformed_frame = match raw.on_malformed_frame.as_deref() {
        Some("abort") | None => MalformedFramePolicy::Abort,
        Some("skip") => MalformedFramePolicy::Skip,
        Some(other) => {
            return Err(ConfigError::invalid(
                "on_malformed_frame",
                format!("\"{other}\", expected \"abort\" or \"skip\""),
            ));
        }
    };

    Ok(ChatConfig {
        endpoint,
        agent_id,
        connect_timeout_ms: raw.connect_timeout_ms,
        history,
        on_malformed_frame,
    })
}

/// Endpoint must be an absolute http(s) URL. Trailing slashes are dropped.
pub fn validate_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            ConfigError::invalid(
                "endpoint",
                format!("\"{endpoint}\" must start with http:// or https://"),
            )
        })?;
    if host.is_empty() {
        return Err(ConfigError::invalid(
            "endpoint",
            format!("\"{endpoint}\" has no host"),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_agent_id(agent_id: &str) -> Result<(), ConfigError> {
    if agent_id.is_empty() {
        return Err(ConfigError::invalid("agent_id", "must not be empty"));
    }
    if agent_id.contains(['/', '?', '#']) || agent_id.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(
            "agent_id",
            format!("\"{agent_id}\" must be a single path segment"),
        ));
    }
    Ok(())
}

/// Interpolate a field, naming the field when a variable is missing.
fn resolve_field(field: &'static str, value: &str) -> Result<String, ConfigError> {
    resolve_variables(value).map_err(|e| match e {
        ConfigError::UndefinedVariable { .. } => ConfigError::invalid(field, e.to_string()),
        other => other,
    })
}
