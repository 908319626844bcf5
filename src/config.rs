//! Run options and file filtering rules.
//!
//! Everything here is built in-process from the parsed command line; the tool
//! reads no configuration files. Filtering supports several strategies, all
//! matched against the file name only (the scan is never recursive):
//! - Exact filename matching
//! - File extension matching (case-insensitive)
//! - Glob pattern matching
//! - Regex pattern matching
//!
//! Hidden files (names starting with `.`) are always excluded and cannot be
//! re-enabled.

use crate::operation::{ConflictPolicy, OperationMode};
use glob::Pattern;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while compiling filter rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    /// Exact filenames to exclude (e.g., "Thumbs.db", "desktop.ini").
    pub filenames: Vec<String>,
    /// File extensions to exclude (e.g., "tmp", ".part").
    pub extensions: Vec<String>,
    /// Glob patterns matched against the file name (e.g., "*.tmp", "IMG_00??.jpg").
    pub patterns: Vec<String>,
    /// Regex patterns matched against the file name.
    pub regex: Vec<String>,
}

impl FilterRules {
    /// Compile the rules into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(&self) -> Result<CompiledFilters, ConfigError> {
        let patterns = self
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = self
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledFilters {
            filenames: self.filenames.iter().cloned().collect(),
            extensions: self
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            patterns,
            regexes,
        })
    }
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    filenames: HashSet<String>,
    extensions: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl CompiledFilters {
    /// Check if a file should be organized.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Hidden file - always excluded
    /// 2. Exact filename match
    /// 3. File extension match
    /// 4. Glob pattern match
    /// 5. Regex pattern match
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = match file_path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };

        if is_hidden(&file_name) {
            return false;
        }

        if self.filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.patterns.iter().any(|p| p.matches(&file_name)) {
            return false;
        }

        !self.regexes.iter().any(|r| r.is_match(&file_name))
    }
}

/// Hidden/system files start with a period.
pub fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('.')
}

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Directory whose top-level files are organized.
    pub source: PathBuf,
    /// Root under which `YYYY/MM` folders are created.
    pub dest: PathBuf,
    pub mode: OperationMode,
    pub conflict: ConflictPolicy,
    /// Plan placements without touching the filesystem.
    pub dry_run: bool,
    pub filters: FilterRules,
}

impl OrganizeOptions {
    /// Options with the default conflict policy, no dry run and no extra filters.
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>, mode: OperationMode) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            mode,
            conflict: ConflictPolicy::default(),
            dry_run: false,
            filters: FilterRules::default(),
        }
    }
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self::new(".", ".", OperationMode::default())
    }
}
