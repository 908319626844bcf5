//! Transfer semantics selected on the command line.
//!
//! `OperationMode` is the closed set of accepted `--operation` values, and
//! `validate_operation` is the single place that turns user input into one.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How each file is transferred into its date folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    /// Relocate the file, removing it from the source directory.
    Move,
    /// Duplicate the file, leaving the original in place.
    #[default]
    Copy,
}

impl OperationMode {
    /// The literal accepted by `--operation`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationMode::Move => "move",
            OperationMode::Copy => "copy",
        }
    }

    /// Verb used in progress output.
    pub fn past_tense(&self) -> &'static str {
        match self {
            OperationMode::Move => "Moved",
            OperationMode::Copy => "Copied",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_operation(s)
    }
}

/// Errors raised while validating command-line values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `--operation` was neither `move` nor `copy`.
    #[error("The value for --operation must be move or copy (got '{value}').")]
    InvalidOperation { value: String },
}

/// Parses an `--operation` value.
///
/// Surrounding whitespace is ignored; the remaining text must be exactly
/// `move` or `copy`.
///
/// # Examples
///
/// ```
/// use files2folders::operation::{validate_operation, OperationMode};
///
/// assert_eq!(validate_operation(" move ").unwrap(), OperationMode::Move);
/// assert!(validate_operation("Copy").is_err());
/// ```
pub fn validate_operation(value: &str) -> Result<OperationMode, ValidationError> {
    match value.trim() {
        "move" => Ok(OperationMode::Move),
        "copy" => Ok(OperationMode::Copy),
        other => Err(ValidationError::InvalidOperation {
            value: other.to_string(),
        }),
    }
}

/// What to do when a file with the same name already sits in the date folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Record the file as failed and leave both copies untouched.
    #[default]
    Error,
    /// Record the file as skipped.
    Skip,
    /// Replace the existing destination file.
    Overwrite,
}
