// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

// Config loader and validator
//
// Loads chatpipe.yaml, resolves variable interpolation, validates the
// endpoint and enum-valued fields, and fills in defaults for everything
// left out.

mod error;
mod interpolation;
mod loader;
mod raw;
mod source;
mod types;

pub use error::ConfigError;
pub use interpolation::resolve_variables;
pub use loader::{load_config, validate_endpoint};
pub use source::{ConfigSource, FileSource, StringSource};
pub use types::{ChatConfig, HistoryMode, DEFAULT_AGENT_ID, DEFAULT_ENDPOINT};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MalformedFramePolicy;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env<F: FnOnce()>(key: &str, value: Option<&str>, f: F) {
        with_envs(&[(key, value)], f);
    }

    /// Set (or clear) every listed variable for the duration of `f`.
    fn with_envs<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();
        let previous: Vec<Option<String>> =
            vars.iter().map(|(key, _)| std::env::var(key).ok()).collect();
        for (key, value) in vars {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        f();
        for ((key, _), old) in vars.iter().zip(previous) {
            match old {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    fn make_source(yaml: &str) -> StringSource {
        StringSource {
            content: yaml.to_string(),
        }
    }

    const EXAMPLE_YAML: &str = r#"
endpoint: "https://chat.example.com/agent/"
agent_id: weatherAgent
connect_timeout_ms: 3000
history: full
on_malformed_frame: skip
"#;

    #[test]
    fn valid_config_parses_all_fields() {
        let config = load_config(&make_source(EXAMPLE_YAML)).unwrap();
        assert_eq!(config.endpoint, "https://chat.example.com/agent");
        assert_eq!(config.agent_id, "weatherAgent");
        assert_eq!(config.connect_timeout_ms, Some(3000));
        assert_eq!(config.history, HistoryMode::Full);
        assert_eq!(config.on_malformed_frame, MalformedFramePolicy::Skip);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config(&make_source("")).unwrap();
        assert_eq!(config, ChatConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.history, HistoryMode::PromptOnly);
        assert_eq!(config.on_malformed_frame, MalformedFramePolicy::Abort);
    }

    #[test]
    fn missing_optional_file_uses_defaults() {
        let source = FileSource {
            path: std::path::PathBuf::from("/nonexistent/chatpipe.yaml"),
            required: false,
        };
        assert_eq!(load_config(&source).unwrap(), ChatConfig::default());
    }

    #[test]
    fn missing_required_file_is_read_error() {
        let source = FileSource {
            path: std::path::PathBuf::from("/nonexistent/chatpipe.yaml"),
            required: true,
        };
        let err = load_config(&source).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/chatpipe.yaml"));
    }

    #[test]
    fn endpoint_without_scheme_rejected() {
        let err = load_config(&make_source("endpoint: /agent\n")).unwrap_err();
        assert!(
            err.to_string().contains("http://"),
            "error should explain the scheme requirement, got: {err}"
        );
    }

    #[test]
    fn endpoint_without_host_rejected() {
        let err = validate_endpoint("https://").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { .. }));
    }

    #[test]
    fn agent_id_with_slash_rejected() {
        let err = load_config(&make_source("agent_id: a/b\n")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "agent_id",
                ..
            }
        ));
    }

    #[test]
    fn zero_connect_timeout_rejected() {
        let err = load_config(&make_source("connect_timeout_ms: 0\n")).unwrap_err();
        assert!(err.to_string().contains("connect_timeout_ms"));
    }

    #[test]
    fn unknown_history_mode_rejected() {
        let err = load_config(&make_source("history: everything\n")).unwrap_err();
        assert!(err.to_string().contains("everything"));
    }

    #[test]
    fn unknown_malformed_policy_rejected() {
        let err = load_config(&make_source("on_malformed_frame: ignore\n")).unwrap_err();
        assert!(err.to_string().contains("abort"));
    }

    #[test]
    fn invalid_yaml_is_yaml_error() {
        let err = load_config(&make_source("endpoint: [unclosed\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn endpoint_interpolated_from_environment() {
        with_env("CHATPIPE_TEST_HOST", Some("agent.internal:8080"), || {
            let config =
                load_config(&make_source("endpoint: \"http://${CHATPIPE_TEST_HOST}\"\n")).unwrap();
            assert_eq!(config.endpoint, "http://agent.internal:8080");
        });
    }

    #[test]
    fn undefined_variable_fails_with_clear_error() {
        with_env("CHATPIPE_TEST_UNSET", None, || {
            let err =
                load_config(&make_source("endpoint: \"${CHATPIPE_TEST_UNSET}\"\n")).unwrap_err();
            assert!(
                err.to_string().contains("CHATPIPE_TEST_UNSET"),
                "error should name the variable, got: {err}"
            );
            assert!(matches!(
                err,
                ConfigError::InvalidField {
                    field: "endpoint",
                    ..
                }
            ));
            assert!(matches!(
                resolve_variables("${CHATPIPE_TEST_UNSET}"),
                Err(ConfigError::UndefinedVariable { .. })
            ));
        });
    }

    #[test]
    fn fallback_used_when_variable_unset_or_empty() {
        with_env("CHATPIPE_TEST_URL", None, || {
            assert_eq!(
                resolve_variables("${CHATPIPE_TEST_URL:-http://localhost:4111}").unwrap(),
                "http://localhost:4111"
            );
        });
        with_env("CHATPIPE_TEST_URL", Some(""), || {
            assert_eq!(
                resolve_variables("${CHATPIPE_TEST_URL:-http://fallback}").unwrap(),
                "http://fallback"
            );
        });
        with_env("CHATPIPE_TEST_URL", Some("http://set"), || {
            assert_eq!(
                resolve_variables("${CHATPIPE_TEST_URL:-http://fallback}").unwrap(),
                "http://set"
            );
        });
    }

    #[test]
    fn multiple_variables_in_one_string() {
        with_envs(
            &[("CHATPIPE_TEST_A", Some("one")), ("CHATPIPE_TEST_B", None)],
            || {
                assert_eq!(
                    resolve_variables("${CHATPIPE_TEST_A}-${CHATPIPE_TEST_B:-two}").unwrap(),
                    "one-two"
                );
            },
        );
        with_envs(
            &[("CHATPIPE_TEST_A", Some("one")), ("CHATPIPE_TEST_B", Some("three"))],
            || {
                assert_eq!(
                    resolve_variables("${CHATPIPE_TEST_A}-${CHATPIPE_TEST_B:-two}").unwrap(),
                    "one-three"
                );
            },
        );
    }

    #[test]
    fn string_without_variables_unchanged() {
        assert_eq!(
            resolve_variables("http://localhost:4111").unwrap(),
            "http://localhost:4111"
        );
    }

    #[test]
    fn unterminated_reference_kept_literally() {
        assert_eq!(resolve_variables("abc${OPEN").unwrap(), "abc${OPEN");
        assert_eq!(resolve_variables("x${}y").unwrap(), "x${}y");
    }
}
