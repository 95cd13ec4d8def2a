// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

use super::error::ConfigError;

/// Expands `${VAR}` and `${VAR:-fallback}` from the environment.
///
/// An unset variable without a fallback is an error. An empty variable
/// counts as unset when a fallback is given. Unterminated references are
/// kept literally.
pub fn resolve_variables(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return Ok(result);
        };

        let reference = &after[..end];
        let (name, fallback) = match reference.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (reference, None),
        };

        if name.is_empty() {
            result.push_str(&rest[start..start + 2 + end + 1]);
        } else {
            let value = std::env::var(name).ok().filter(|v| !v.is_empty() || fallback.is_none());
            match (value, fallback) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(fallback)) => result.push_str(fallback),
                (None, None) => {
                    return Err(ConfigError::UndefinedVariable {
                        name: name.to_string(),
                    })
                }
            }
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}
