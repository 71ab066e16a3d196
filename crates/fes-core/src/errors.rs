//! Structured error types shared across the FES crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`FesError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, line numbers, shapes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the free-energy pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum FesError {
    /// Filesystem failures while reading inputs or writing outputs.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Malformed trajectory or numeric text.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// Array length or dimension mismatches.
    #[error("shape error: {0}")]
    Shape(ErrorInfo),
    /// Regression failures (singular systems, non-finite losses).
    #[error("fit error: {0}")]
    Fit(ErrorInfo),
    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl FesError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            FesError::Io(info)
            | FesError::Parse(info)
            | FesError::Shape(info)
            | FesError::Fit(info)
            | FesError::Config(info)
            | FesError::Serde(info) => info,
        }
    }

    /// Builds a shape error describing an expected versus observed length.
    pub fn shape(code: &str, what: &str, expected: usize, found: usize) -> Self {
        FesError::Shape(
            ErrorInfo::new(code, format!("{what} length mismatch"))
                .with_context("expected", expected.to_string())
                .with_context("found", found.to_string()),
        )
    }
}
