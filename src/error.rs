// SPDX-License-Identifier: MIT

//! Typed error handling for rule sets, the registry and the service

use crate::condition::EvalError;
use thiserror::Error;

/// Top-level error type for condition-rs
#[derive(Debug, Error)]
pub enum RulesError {
    /// A rule's condition failed to compile
    #[error("Rule '{rule}' failed to compile: {source}")]
    Compile {
        rule: String,
        #[source]
        source: EvalError,
    },

    /// Two rules in one set share a name
    #[error("Duplicate rule '{0}'")]
    DuplicateRule(String),

    /// No rule registered under this name
    #[error("Rule '{0}' not found")]
    UnknownRule(String),

    /// Evaluating a registered rule failed
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Configuration errors (invalid env vars, bad flags)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl RulesError {
    /// Create a compile error for a named rule
    pub fn compile(rule: impl Into<String>, source: EvalError) -> Self {
        Self::Compile {
            rule: rule.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
