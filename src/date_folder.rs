/// Mapping from a file's creation time to its `YYYY/MM` folder.
///
/// The folder depends only on the year and month of the timestamp, so two
/// files created in the same month always land side by side.
use chrono::{DateTime, Datelike, Local, TimeZone};
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

/// A year/month bucket under the destination root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateFolder {
    pub year: i32,
    pub month: u32,
}

impl DateFolder {
    /// Builds the folder for a timestamp in its own time zone.
    pub fn from_datetime<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// The folder relative to the destination root, e.g. `2023/03`.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(format!("{:04}", self.year)).join(format!("{:02}", self.month))
    }

    /// The folder resolved against `dest_root`.
    pub fn resolve(&self, dest_root: &Path) -> PathBuf {
        dest_root.join(self.relative_path())
    }
}

impl fmt::Display for DateFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

impl Serialize for DateFolder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Returns the creation time recorded in `metadata`, in local time.
///
/// Filesystems without a birth time report the modification time instead.
pub fn creation_time(metadata: &Metadata) -> io::Result<DateTime<Local>> {
    let time = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Local>::from(time))
}

/// Computes `dest_root/YYYY/MM` for a creation timestamp.
pub fn destination_folder<Tz: TimeZone>(dest_root: &Path, created: &DateTime<Tz>) -> PathBuf {
    DateFolder::from_datetime(created).resolve(dest_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_folder_is_zero_padded() {
        let created = Utc.with_ymd_and_hms(2023, 3, 15, 10, 0, 0).unwrap();
        let folder = destination_folder(Path::new("/out"), &created);
        assert_eq!(folder, PathBuf::from("/out/2023/03"));
    }

    #[test]
    fn test_small_years_are_padded_to_four_digits() {
        let created = Utc.with_ymd_and_hms(987, 11, 1, 0, 0, 0).unwrap();
        let folder = DateFolder::from_datetime(&created);
        assert_eq!(folder.relative_path(), PathBuf::from("0987/11"));
        assert_eq!(folder.to_string(), "0987/11");
    }

    #[test]
    fn test_same_month_maps_to_same_folder() {
        let first = Utc.with_ymd_and_hms(2021, 7, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2021, 7, 31, 23, 59, 59).unwrap();
        assert_eq!(
            destination_folder(Path::new("dest"), &first),
            destination_folder(Path::new("dest"), &last)
        );
    }

    #[test]
    fn test_different_months_map_to_different_folders() {
        let july = Utc.with_ymd_and_hms(2021, 7, 31, 12, 0, 0).unwrap();
        let august = Utc.with_ymd_and_hms(2021, 8, 1, 12, 0, 0).unwrap();
        assert_ne!(
            DateFolder::from_datetime(&july),
            DateFolder::from_datetime(&august)
        );
    }

    #[test]
    fn test_folder_uses_timestamp_time_zone() {
        // 23:30 on Dec 31 UTC is already January in UTC+2.
        let utc = Utc.with_ymd_and_hms(2022, 12, 31, 23, 30, 0).unwrap();
        let shifted = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());

        assert_eq!(DateFolder::from_datetime(&utc).to_string(), "2022/12");
        assert_eq!(DateFolder::from_datetime(&shifted).to_string(), "2023/01");
    }

    #[test]
    fn test_creation_time_reads_file_metadata() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("note.txt");
        std::fs::write(&file_path, "hello").expect("Failed to write test file");

        let metadata = std::fs::metadata(&file_path).expect("Failed to read metadata");
        let created = creation_time(&metadata).expect("Failed to read creation time");

        let now = Local::now();
        assert!(created <= now + chrono::Duration::seconds(5));
        assert!(created >= now - chrono::Duration::hours(1));
    }
}
