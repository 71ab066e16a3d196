use std::fs;
use std::path::Path;

use fes_core::errors::{ErrorInfo, FesError};
use serde::{Deserialize, Serialize};

use crate::hash::sha256_hex;

/// Column layout of a trajectory file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Zero-based column holding the reaction coordinate.
    #[serde(default = "ColumnSpec::default_x")]
    pub x: usize,
    /// Zero-based column holding the observable.
    #[serde(default = "ColumnSpec::default_y")]
    pub y: usize,
    /// Number of leading lines to discard before parsing.
    #[serde(default = "ColumnSpec::default_skip_rows")]
    pub skip_rows: usize,
}

impl ColumnSpec {
    fn default_x() -> usize {
        1
    }

    fn default_y() -> usize {
        2
    }

    fn default_skip_rows() -> usize {
        1
    }
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            x: Self::default_x(),
            y: Self::default_y(),
            skip_rows: Self::default_skip_rows(),
        }
    }
}

/// Reaction coordinate / observable pairs read from one replica.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColvarSamples {
    /// Reaction coordinate values.
    pub x: Vec<f64>,
    /// Observable values, aligned with `x`.
    pub y: Vec<f64>,
}

impl ColvarSamples {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether no samples were read.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn parse_error(code: &str, message: impl Into<String>, origin: &str, line: usize) -> FesError {
    FesError::Parse(
        ErrorInfo::new(code, message)
            .with_context("path", origin)
            .with_context("line", line.to_string()),
    )
}

/// Reads a whitespace-delimited trajectory file.
pub fn load_colvar<P: AsRef<Path>>(path: P, columns: &ColumnSpec) -> Result<ColvarSamples, FesError> {
    read_colvar(path, columns).map(|(samples, _)| samples)
}

/// Reads a trajectory file and returns its samples with the SHA256 of its bytes.
pub fn read_colvar<P: AsRef<Path>>(
    path: P,
    columns: &ColumnSpec,
) -> Result<(ColvarSamples, String), FesError> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let bytes = fs::read(path).map_err(|err| {
        FesError::Io(ErrorInfo::new("colvar_read", err.to_string()).with_context("path", &origin))
    })?;
    let text = std::str::from_utf8(&bytes).map_err(|err| {
        FesError::Parse(ErrorInfo::new("colvar_utf8", err.to_string()).with_context("path", &origin))
    })?;
    let samples = parse_colvar(text, columns, &origin)?;
    Ok((samples, sha256_hex(&bytes)))
}

/// Parses trajectory text; `origin` labels errors.
///
/// Lines after the header are stripped of `#` comments and skipped when blank.
pub fn parse_colvar(text: &str, columns: &ColumnSpec, origin: &str) -> Result<ColvarSamples, FesError> {
    let needed = columns.x.max(columns.y) + 1;
    let mut samples = ColvarSamples::default();
    for (idx, raw) in text.lines().enumerate().skip(columns.skip_rows) {
        let line_no = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() < needed {
            return Err(parse_error(
                "colvar_columns",
                format!("expected at least {needed} columns, found {}", fields.len()),
                origin,
                line_no,
            ));
        }
        let parse = |field: &str| {
            field.parse::<f64>().map_err(|err| {
                parse_error("colvar_number", format!("{field:?}: {err}"), origin, line_no)
            })
        };
        samples.x.push(parse(fields[columns.x])?);
        samples.y.push(parse(fields[columns.y])?);
    }
    if samples.is_empty() {
        return Err(FesError::Parse(
            ErrorInfo::new("colvar_empty", "no samples after header")
                .with_context("path", origin),
        ));
    }
    Ok(samples)
}
