/// File organization into year/month folders.
///
/// This module scans the top level of a source directory, works out the
/// `YYYY/MM` folder for each eligible file from its creation time, and copies
/// or moves the file there. Per-file failures are recorded in the run report
/// instead of aborting the batch; only an unreadable source directory or an
/// invalid filter stops a run.
use crate::config::{CompiledFilters, ConfigError, OrganizeOptions};
use crate::date_folder::{DateFolder, creation_time};
use crate::operation::{ConflictPolicy, OperationMode};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, FileTimes, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during file organization.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source directory is missing, unreadable, or not a directory.
    #[error("Source directory {} is unavailable: {source}", .path.display())]
    SourceUnavailable { path: PathBuf, source: io::Error },
    /// A filter pattern failed to compile.
    #[error(transparent)]
    InvalidFilter(#[from] ConfigError),
    /// Failed to read a file's metadata or creation time.
    #[error("Failed to read metadata of {}: {source}", .path.display())]
    MetadataUnavailable { path: PathBuf, source: io::Error },
    /// Failed to create a date folder.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to copy or move a file into its date folder.
    #[error("Failed to {mode} {} to {}: {source}", .from.display(), .to.display())]
    TransferFailed {
        mode: OperationMode,
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The destination file exists and the conflict policy forbids replacing it.
    #[error("Destination {} already exists", .path.display())]
    DestinationExists { path: PathBuf },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A regular file found directly inside the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub file_name: OsString,
}

impl SourceEntry {
    /// The file name for display purposes.
    pub fn display_name(&self) -> String {
        self.file_name.to_string_lossy().into_owned()
    }
}

/// Where a file went (or would go, in a dry run).
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub folder: DateFolder,
    pub created: DateTime<Local>,
    /// Set when the file was transferred but its timestamps could not be carried over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// The result of processing a single source entry.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Transferred(Placement),
    Planned(Placement),
    Skipped { source: PathBuf, reason: String },
    Failed { source: PathBuf, error: String },
}

impl FileOutcome {
    /// The placement, if the file was (or would be) transferred.
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            FileOutcome::Transferred(placement) | FileOutcome::Planned(placement) => {
                Some(placement)
            }
            _ => None,
        }
    }
}

/// The eligible entries of a source directory.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    /// Entries to process, sorted by file name.
    pub entries: Vec<SourceEntry>,
    /// Regular files left out because they are hidden or matched a filter.
    pub excluded: usize,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub mode: OperationMode,
    pub dry_run: bool,
    pub excluded: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl OrganizeReport {
    /// Creates an empty report for a run with the given options.
    pub fn new(options: &OrganizeOptions, excluded: usize) -> Self {
        Self {
            source: options.source.clone(),
            dest: options.dest.clone(),
            mode: options.mode,
            dry_run: options.dry_run,
            excluded,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn transferred(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Transferred(_)))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Planned(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    /// Transfers whose timestamps could not be preserved.
    pub fn warnings(&self) -> usize {
        self.count(|o| o.placement().is_some_and(|p| p.warning.is_some()))
    }

    /// True if at least one file could not be organized.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Number of transferred or planned files per date folder, sorted by folder.
    pub fn folder_counts(&self) -> BTreeMap<DateFolder, usize> {
        let mut counts = BTreeMap::new();
        for placement in self.outcomes.iter().filter_map(FileOutcome::placement) {
            *counts.entry(placement.folder).or_insert(0) += 1;
        }
        counts
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|&o| predicate(o)).count()
    }
}

/// Organizes the top-level files of a directory into `YYYY/MM` folders.
pub struct FileOrganizer {
    options: OrganizeOptions,
    filters: CompiledFilters,
}

impl FileOrganizer {
    /// Creates an organizer, compiling the filter rules up front.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidFilter` if a glob or regex is invalid.
    pub fn new(options: OrganizeOptions) -> OrganizeResult<Self> {
        let filters = options.filters.compile()?;
        Ok(Self { options, filters })
    }

    pub fn options(&self) -> &OrganizeOptions {
        &self.options
    }

    /// Lists the regular files of the source directory that should be organized.
    ///
    /// The listing is taken once, before anything is transferred, so files
    /// arriving in the source during the run are never visited.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::SourceUnavailable` if the source does not exist,
    /// is not a directory, or cannot be read.
    pub fn scan(&self) -> OrganizeResult<Scan> {
        let source = &self.options.source;
        let unavailable = |e: io::Error| OrganizeError::SourceUnavailable {
            path: source.clone(),
            source: e,
        };

        let metadata = fs::metadata(source).map_err(unavailable)?;
        if !metadata.is_dir() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::NotADirectory,
                "not a directory",
            )));
        }

        let mut scan = Scan::default();
        for entry in fs::read_dir(source).map_err(unavailable)? {
            let entry = entry.map_err(unavailable)?;
            let path = entry.path();
            // `DirEntry::file_type` does not follow links: only regular files are candidates.
            let file_type = entry.file_type().map_err(unavailable)?;
            if file_type.is_dir() {
                continue;
            }
            if file_type.is_file() && self.filters.should_include(&path) {
                scan.entries.push(SourceEntry {
                    file_name: entry.file_name(),
                    path,
                });
            } else {
                scan.excluded += 1;
            }
        }

        scan.entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(scan)
    }

    /// Places one entry, turning any error into a `Failed` outcome.
    pub fn process(&self, entry: &SourceEntry) -> FileOutcome {
        self.place(entry)
            .unwrap_or_else(|error| FileOutcome::Failed {
                source: entry.path.clone(),
                error: error.to_string(),
            })
    }

    /// Scans the source and processes every eligible entry.
    pub fn run(&self) -> OrganizeResult<OrganizeReport> {
        let scan = self.scan()?;
        let mut report = OrganizeReport::new(&self.options, scan.excluded);
        for entry in &scan.entries {
            report.record(self.process(entry));
        }
        Ok(report)
    }

    fn place(&self, entry: &SourceEntry) -> OrganizeResult<FileOutcome> {
        self.place_with(entry, preserve_timestamps)
    }

    /// Places one entry, using `preserve` for the advisory timestamp step.
    fn place_with(
        &self,
        entry: &SourceEntry,
        preserve: impl FnOnce(&Metadata, &Path) -> io::Result<()>,
    ) -> OrganizeResult<FileOutcome> {
        let metadata_error = |e: io::Error| OrganizeError::MetadataUnavailable {
            path: entry.path.clone(),
            source: e,
        };
        let metadata = fs::metadata(&entry.path).map_err(metadata_error)?;
        let created = creation_time(&metadata).map_err(metadata_error)?;

        let folder = DateFolder::from_datetime(&created);
        let folder_path = folder.resolve(&self.options.dest);
        let destination = folder_path.join(&entry.file_name);

        if is_same_file(&entry.path, &destination) {
            return Ok(FileOutcome::Skipped {
                source: entry.path.clone(),
                reason: "already in place".to_string(),
            });
        }

        if destination.exists() {
            match self.options.conflict {
                ConflictPolicy::Error => {
                    return Err(OrganizeError::DestinationExists { path: destination });
                }
                ConflictPolicy::Skip => {
                    return Ok(FileOutcome::Skipped {
                        source: entry.path.clone(),
                        reason: format!("{} already exists", destination.display()),
                    });
                }
                ConflictPolicy::Overwrite => {}
            }
        }

        let mut placement = Placement {
            source: entry.path.clone(),
            destination,
            folder,
            created,
            warning: None,
        };

        if self.options.dry_run {
            return Ok(FileOutcome::Planned(placement));
        }

        fs::create_dir_all(&folder_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: folder_path.clone(),
            source: e,
        })?;

        transfer(self.options.mode, &entry.path, &placement.destination)?;

        if let Err(e) = preserve(&metadata, &placement.destination) {
            placement.warning = Some(format!("could not preserve timestamps: {}", e));
        }

        Ok(FileOutcome::Transferred(placement))
    }
}

/// Organizes `source_dir` into `dest_dir` with default options.
///
/// # Examples
///
/// ```no_run
/// use files2folders::file_organizer::organize;
/// use files2folders::operation::OperationMode;
/// use std::path::Path;
///
/// let report = organize(Path::new("/camera"), Path::new("/photos"), OperationMode::Copy)?;
/// println!("{} files copied", report.transferred());
/// # Ok::<(), files2folders::file_organizer::OrganizeError>(())
/// ```
pub fn organize(
    source_dir: &Path,
    dest_dir: &Path,
    mode: OperationMode,
) -> OrganizeResult<OrganizeReport> {
    FileOrganizer::new(OrganizeOptions::new(source_dir, dest_dir, mode))?.run()
}

fn transfer(mode: OperationMode, from: &Path, to: &Path) -> OrganizeResult<()> {
    let result = match mode {
        OperationMode::Copy => fs::copy(from, to).map(|_| ()),
        OperationMode::Move => move_file(from, to),
    };

    result.map_err(|e| OrganizeError::TransferFailed {
        mode,
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })
}

/// Renames `from` to `to`, copying and deleting when they are on different filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        result => result,
    }
}

/// Carries the original's access, modification and (where the platform can
/// set it) creation times over to `destination`.
fn preserve_timestamps(original: &Metadata, destination: &Path) -> io::Result<()> {
    open_for_timestamps(destination)?.set_times(carried_times(original)?)
}

fn carried_times(original: &Metadata) -> io::Result<FileTimes> {
    let mut times = FileTimes::new().set_modified(original.modified()?);
    if let Ok(accessed) = original.accessed() {
        times = times.set_accessed(accessed);
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::FileTimesExt;
        if let Ok(created) = original.created() {
            times = times.set_created(created);
        }
    }
    #[cfg(target_os = "macos")]
    {
        use std::os::macos::fs::FileTimesExt;
        if let Ok(created) = original.created() {
            times = times.set_created(created);
        }
    }
    #[cfg(target_os = "ios")]
    {
        use std::os::ios::fs::FileTimesExt;
        if let Ok(created) = original.created() {
            times = times.set_created(created);
        }
    }

    Ok(times)
}

/// Opens `path` with just enough access to change its timestamps.
#[cfg(windows)]
fn open_for_timestamps(path: &Path) -> io::Result<fs::File> {
    use std::os::windows::fs::OpenOptionsExt;
    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    // Works on read-only files, unlike `write(true)`.
    fs::OpenOptions::new()
        .access_mode(FILE_WRITE_ATTRIBUTES)
        .open(path)
}

/// Opens `path` with just enough access to change its timestamps.
#[cfg(not(windows))]
fn open_for_timestamps(path: &Path) -> io::Result<fs::File> {
    // Unix only needs ownership, not write access, to change timestamps.
    fs::File::open(path)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn organizer(source: &Path, dest: &Path, mode: OperationMode) -> FileOrganizer {
        FileOrganizer::new(OrganizeOptions::new(source, dest, mode))
            .expect("Failed to create organizer")
    }

    fn expected_destination(dest: &Path, file: &Path) -> PathBuf {
        let metadata = fs::metadata(file).expect("Failed to read metadata");
        let created = creation_time(&metadata).expect("Failed to read creation time");
        DateFolder::from_datetime(&created)
            .resolve(dest)
            .join(file.file_name().unwrap())
    }

    #[test]
    fn test_scan_lists_regular_files_sorted() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("b.txt"), "b").unwrap();
        fs::write(base_path.join("a.txt"), "a").unwrap();
        fs::write(base_path.join(".hidden"), "h").unwrap();
        fs::create_dir(base_path.join("subdir")).unwrap();
        fs::write(base_path.join("subdir").join("nested.txt"), "n").unwrap();

        let scan = organizer(base_path, base_path, OperationMode::Copy)
            .scan()
            .expect("Failed to scan");

        let names: Vec<_> = scan.entries.iter().map(|e| e.display_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(scan.excluded, 1);
    }

    #[test]
    fn test_scan_missing_source_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");

        let result = organizer(&missing, temp_dir.path(), OperationMode::Copy).scan();
        assert!(matches!(
            result,
            Err(OrganizeError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_scan_source_that_is_a_file_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("file.txt");
        fs::write(&file_path, "content").unwrap();

        let result = organizer(&file_path, temp_dir.path(), OperationMode::Copy).scan();
        assert!(matches!(
            result,
            Err(OrganizeError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_copy_places_file_and_keeps_original() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let file_path = source.path().join("photo.jpg");
        fs::write(&file_path, b"jpeg bytes").unwrap();
        let expected = expected_destination(dest.path(), &file_path);

        let report = organizer(source.path(), dest.path(), OperationMode::Copy)
            .run()
            .expect("Run failed");

        assert_eq!(report.transferred(), 1);
        assert!(file_path.exists());
        assert_eq!(fs::read(&expected).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_move_removes_original() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let file_path = source.path().join("clip.mov");
        fs::write(&file_path, b"video").unwrap();
        let expected = expected_destination(dest.path(), &file_path);

        let report = organizer(source.path(), dest.path(), OperationMode::Move)
            .run()
            .expect("Run failed");

        assert_eq!(report.transferred(), 1);
        assert!(!file_path.exists());
        assert_eq!(fs::read(&expected).unwrap(), b"video");
    }

    #[test]
    fn test_copy_preserves_modification_time() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let file_path = source.path().join("old.txt");
        fs::write(&file_path, "old").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&file_path)
            .unwrap()
            .set_times(FileTimes::new().set_modified(old))
            .unwrap();

        let expected = expected_destination(dest.path(), &file_path);
        let report = organizer(source.path(), dest.path(), OperationMode::Copy)
            .run()
            .expect("Run failed");

        assert_eq!(report.warnings(), 0);
        let copied = fs::metadata(&expected).unwrap();
        assert_eq!(copied.modified().unwrap(), old);
    }

    #[test]
    fn test_timestamp_failure_is_a_warning_not_a_failure() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let file_path = source.path().join("notes.txt");
        fs::write(&file_path, "notes").unwrap();
        let expected = expected_destination(dest.path(), &file_path);

        let organizer = organizer(source.path(), dest.path(), OperationMode::Move);
        let scan = organizer.scan().unwrap();
        let outcome = organizer
            .place_with(&scan.entries[0], |_, _| {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "times are locked"))
            })
            .expect("Placement failed");

        match &outcome {
            FileOutcome::Transferred(placement) => {
                let warning = placement.warning.as_deref().expect("Missing warning");
                assert!(warning.contains("times are locked"));
                assert_eq!(placement.destination, expected);
            }
            other => panic!("Expected a transferred outcome, got {:?}", other),
        }

        let mut report = OrganizeReport::new(organizer.options(), scan.excluded);
        report.record(outcome);
        assert_eq!(report.transferred(), 1);
        assert_eq!(report.warnings(), 1);
        assert!(!report.has_failures());
        assert!(!file_path.exists());
        assert_eq!(fs::read_to_string(&expected).unwrap(), "notes");
    }

    #[cfg(unix)]
    fn assert_symlink_left_alone(mode: OperationMode) {
        use std::os::unix::fs::symlink;

        let outside = TempDir::new().expect("Failed to create temp directory");
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let target = outside.path().join("real.txt");
        fs::write(&target, "real").unwrap();
        let link = source.path().join("link.txt");
        symlink(&target, &link).unwrap();

        let report = organizer(source.path(), dest.path(), mode)
            .run()
            .expect("Run failed");

        assert!(report.outcomes.is_empty());
        assert_eq!(report.excluded, 1);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "real");
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_leaves_symlinked_file_alone() {
        assert_symlink_left_alone(OperationMode::Copy);
    }

    #[cfg(unix)]
    #[test]
    fn test_move_leaves_symlinked_file_alone() {
        assert_symlink_left_alone(OperationMode::Move);
    }

    #[test]
    fn test_conflict_error_leaves_both_files() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let file_path = source.path().join("doc.txt");
        fs::write(&file_path, "new").unwrap();
        let expected = expected_destination(dest.path(), &file_path);
        fs::create_dir_all(expected.parent().unwrap()).unwrap();
        fs::write(&expected, "existing").unwrap();

        let organizer = organizer(source.path(), dest.path(), OperationMode::Move);
        let scan = organizer.scan().unwrap();
        let outcome = organizer.process(&scan.entries[0]);

        assert!(matches!(outcome, FileOutcome::Failed { .. }));
        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&expected).unwrap(), "existing");
    }

    #[test]
    fn test_conflict_skip_and_overwrite() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let file_path = source.path().join("doc.txt");
        fs::write(&file_path, "new").unwrap();
        let expected = expected_destination(dest.path(), &file_path);
        fs::create_dir_all(expected.parent().unwrap()).unwrap();
        fs::write(&expected, "existing").unwrap();

        let mut options = OrganizeOptions::new(source.path(), dest.path(), OperationMode::Copy);
        options.conflict = ConflictPolicy::Skip;
        let report = FileOrganizer::new(options.clone()).unwrap().run().unwrap();
        assert_eq!(report.skipped(), 1);
        assert_eq!(fs::read_to_string(&expected).unwrap(), "existing");

        options.conflict = ConflictPolicy::Overwrite;
        let report = FileOrganizer::new(options).unwrap().run().unwrap();
        assert_eq!(report.transferred(), 1);
        assert_eq!(fs::read_to_string(&expected).unwrap(), "new");
    }

    #[test]
    fn test_dry_run_plans_without_touching_filesystem() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let dest = TempDir::new().expect("Failed to create temp directory");
        let file_path = source.path().join("song.mp3");
        fs::write(&file_path, "audio").unwrap();
        let expected = expected_destination(dest.path(), &file_path);

        let mut options = OrganizeOptions::new(source.path(), dest.path(), OperationMode::Move);
        options.dry_run = true;
        let report = FileOrganizer::new(options).unwrap().run().unwrap();

        assert_eq!(report.planned(), 1);
        let placement = report.outcomes[0].placement().unwrap();
        assert_eq!(placement.destination, expected);
        assert!(file_path.exists());
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_file_already_in_place_is_skipped() {
        let dest = TempDir::new().expect("Failed to create temp directory");
        let staging = dest.path().join("staging.txt");
        fs::write(&staging, "x").unwrap();
        let expected = expected_destination(dest.path(), &staging);
        fs::create_dir_all(expected.parent().unwrap()).unwrap();
        fs::rename(&staging, &expected).unwrap();

        let folder = expected.parent().unwrap();
        let report = organizer(folder, dest.path(), OperationMode::Copy)
            .run()
            .unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(fs::read_to_string(&expected).unwrap(), "x");
    }

    #[test]
    fn test_invalid_filter_rejected_at_construction() {
        let mut options = OrganizeOptions::default();
        options.filters.regex = vec!["(".to_string()];
        assert!(matches!(
            FileOrganizer::new(options),
            Err(OrganizeError::InvalidFilter(_))
        ));
    }
}
