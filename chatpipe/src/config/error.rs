// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

/// Why a client config could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field parsed but holds a value the client cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("${{{name}}} is not set and has no fallback")]
    UndefinedVariable { name: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
