//! files2folders - sort files into year/month folders
//!
//! This library enumerates the top-level files of a source directory, derives
//! a `YYYY/MM` folder from each file's creation time, and copies or moves the
//! file into that folder under a destination directory.

pub mod cli;
pub mod config;
pub mod date_folder;
pub mod file_organizer;
pub mod operation;
pub mod output;

pub use config::{CompiledFilters, ConfigError, FilterRules, OrganizeOptions};
pub use date_folder::{DateFolder, creation_time, destination_folder};
pub use file_organizer::{
    FileOrganizer, FileOutcome, OrganizeError, OrganizeReport, OrganizeResult, organize,
};
pub use operation::{ConflictPolicy, OperationMode, ValidationError, validate_operation};

pub use cli::{Cli, run_cli};
