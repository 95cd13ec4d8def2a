// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use super::error::ConfigError;

/// Where config YAML comes from.
pub trait ConfigSource {
    /// Returns `None` when the source has nothing to offer and defaults
    /// should apply.
    fn load(&self) -> Result<Option<String>, ConfigError>;
}

/// Reads config from a file on disk. A missing file is not an error
/// unless `required` is set.
pub struct FileSource {
    pub path: PathBuf,
    pub required: bool,
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<Option<String>, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !self.required => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                Ok(None)
            }
            Err(source) => Err(ConfigError::Read {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }
}

/// Provides config content directly as a string. Used for testing.
pub struct StringSource {
    pub content: String,
}

impl ConfigSource for StringSource {
    fn load(&self) -> Result<Option<String>, ConfigError> {
        Ok(Some(self.content.clone()))
    }
}
