//! Project file safety net.
//!
//! An import rewrites the project snapshot in place. Before that happens the
//! previous file is copied into a history directory next to it.

pub mod history;

pub use history::{BackupEntry, HistoryConfig, backup_before_save, history_dir, list_backups};
