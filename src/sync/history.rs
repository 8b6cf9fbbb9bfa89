//! Local history backups of the project file.
//!
//! This module handles:
//! - Creating timestamped backups before an import saves the project
//! - Rotating backups based on count and age
//! - Listing backups

use crate::error::Result;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Name of the history directory created next to the project file.
pub const HISTORY_DIR: &str = ".relman_history";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Configuration for history backups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub max_count: usize,
    pub max_age_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_count: 20,
            max_age_days: 30,
        }
    }
}

/// Backup entry metadata.
#[derive(Debug, Clone)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub size: u64,
}

/// History directory for a project file.
#[must_use]
pub fn history_dir(project_path: &Path) -> PathBuf {
    project_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(HISTORY_DIR)
}

fn file_stem(project_path: &Path) -> String {
    project_path
        .file_stem()
        .map_or_else(|| "project".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Back up the project file before it is overwritten.
///
/// Returns the path of the new backup, or `None` when history is disabled,
/// the file does not exist yet, or it is identical to the latest backup.
///
/// # Errors
///
/// Returns an error if the backup cannot be created.
pub fn backup_before_save(project_path: &Path, config: &HistoryConfig) -> Result<Option<PathBuf>> {
    if !config.enabled || !project_path.exists() {
        return Ok(None);
    }

    let history_dir = history_dir(project_path);
    let stem = file_stem(project_path);
    fs::create_dir_all(&history_dir)?;

    if let Some(latest) = list_backups(&history_dir, &stem)?.into_iter().next() {
        if files_are_identical(project_path, &latest.path)? {
            tracing::debug!(
                latest = %latest.path.display(),
                "Skipping backup: identical to latest"
            );
            return Ok(None);
        }
    }

    let timestamp = Utc::now().format(TIMESTAMP_FORMAT);
    let backup_path = history_dir.join(format!("{stem}.{timestamp}.json"));

    fs::copy(project_path, &backup_path)?;
    tracing::debug!(backup = %backup_path.display(), "Created backup");

    rotate_history(&history_dir, &stem, config, Utc::now())?;
    Ok(Some(backup_path))
}

/// Delete backups beyond `max_count` or older than `max_age_days`.
fn rotate_history(
    history_dir: &Path,
    stem: &str,
    config: &HistoryConfig,
    now: DateTime<Utc>,
) -> Result<usize> {
    let cutoff = now - chrono::Duration::days(i64::from(config.max_age_days));
    let mut deleted = 0;

    for (idx, entry) in list_backups(history_dir, stem)?.iter().enumerate() {
        if entry.timestamp < cutoff || idx >= config.max_count {
            fs::remove_file(&entry.path)?;
            deleted += 1;
        }
    }

    if deleted > 0 {
        tracing::debug!(deleted, "Pruned old backup(s)");
    }
    Ok(deleted)
}

/// List backups of one project file, newest first.
///
/// Files are named `<stem>.YYYYMMDD_HHMMSS.json`; anything else in the
/// directory is ignored.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_backups(history_dir: &Path, stem: &str) -> Result<Vec<BackupEntry>> {
    if !history_dir.exists() {
        return Ok(Vec::new());
    }

    let prefix = format!("{stem}.");
    let mut backups = Vec::new();

    for entry in fs::read_dir(history_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(ts) = name
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_suffix(".json"))
        else {
            continue;
        };
        let Ok(naive) = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT) else {
            continue;
        };

        let size = fs::metadata(&path)?.len();
        backups.push(BackupEntry {
            path,
            timestamp: Utc.from_utc_datetime(&naive),
            size,
        });
    }

    backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(backups)
}

/// Compare two files byte for byte.
fn files_are_identical(p1: &Path, p2: &Path) -> Result<bool> {
    let f1 = File::open(p1)?;
    let f2 = File::open(p2)?;

    if f1.metadata()?.len() != f2.metadata()?.len() {
        return Ok(false);
    }

    let mut reader1 = BufReader::new(f1);
    let mut reader2 = BufReader::new(f2);
    let mut buf1 = [0u8; 8192];
    let mut buf2 = [0u8; 8192];

    loop {
        let n1 = reader1.read(&mut buf1)?;
        if n1 == 0 {
            return Ok(true);
        }

        let mut n2_total = 0;
        while n2_total < n1 {
            let n2 = reader2.read(&mut buf2[n2_total..n1])?;
            if n2 == 0 {
                return Ok(false);
            }
            n2_total += n2;
        }

        if buf1[..n1] != buf2[..n1] {
            return Ok(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    #[test]
    fn backup_copies_project_file() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("city.json");
        write(&project, "{}");

        let backup = backup_before_save(&project, &HistoryConfig::default())
            .unwrap()
            .unwrap();
        assert!(backup.starts_with(temp.path().join(HISTORY_DIR)));
        assert_eq!(fs::read_to_string(backup).unwrap(), "{}");
    }

    #[test]
    fn identical_content_is_not_backed_up_twice() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("city.json");
        write(&project, "content");

        let config = HistoryConfig::default();
        assert!(backup_before_save(&project, &config).unwrap().is_some());
        assert!(backup_before_save(&project, &config).unwrap().is_none());

        let backups = list_backups(&history_dir(&project), "city").unwrap();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn disabled_or_missing_file_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("city.json");

        assert!(backup_before_save(&project, &HistoryConfig::default()).unwrap().is_none());

        write(&project, "{}");
        let disabled = HistoryConfig {
            enabled: false,
            ..HistoryConfig::default()
        };
        assert!(backup_before_save(&project, &disabled).unwrap().is_none());
        assert!(!history_dir(&project).exists());
    }

    #[test]
    fn list_backups_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();

        write(&dir.join("city.20230101_100000.json"), "a");
        write(&dir.join("city.20230102_100000.json"), "b");
        write(&dir.join("city.invalid_name.json"), "c");
        write(&dir.join("other.20230103_100000.json"), "d");

        let backups = list_backups(dir, "city").unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].path.to_string_lossy().contains("20230102"));
        assert!(backups[1].path.to_string_lossy().contains("20230101"));
    }

    #[test]
    fn rotation_keeps_newest_within_limits() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        for day in 1..=4 {
            write(&dir.join(format!("city.2024010{day}_120000.json")), "x");
        }
        write(&dir.join("city.20230601_120000.json"), "old");

        let config = HistoryConfig {
            enabled: true,
            max_count: 3,
            max_age_days: 30,
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let deleted = rotate_history(dir, "city", &config, now).unwrap();
        assert_eq!(deleted, 2);

        let left: Vec<String> = list_backups(dir, "city")
            .unwrap()
            .iter()
            .map(|b| b.timestamp.format("%Y%m%d").to_string())
            .collect();
        assert_eq!(left, vec!["20240104", "20240103", "20240102"]);
    }
}
