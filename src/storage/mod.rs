pub mod json_backend;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{bills::Expense, errors::BillError};

pub type Result<T> = std::result::Result<T, BillError>;

/// Outcome of reading the persisted blob. Records that failed validation are
/// reported here instead of failing the load.
#[derive(Debug)]
pub struct LoadReport {
    pub expenses: Vec<Expense>,
    pub warnings: Vec<String>,
    pub path: PathBuf,
}

/// Describes a persisted backup snapshot of the expense blob.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Abstraction over persistence backends for the single expense blob and its
/// backup snapshots.
pub trait StorageBackend: Send + Sync {
    /// Persists the full collection. Last full write wins.
    fn save(&self, expenses: &[Expense]) -> Result<PathBuf>;
    /// Reads the blob; a missing file yields an empty report.
    fn load(&self) -> Result<LoadReport>;
    fn backup(&self, expenses: &[Expense], note: Option<&str>) -> Result<BackupInfo>;
    fn list_backups(&self) -> Result<Vec<BackupInfo>>;
    fn restore(&self, backup_id: &str) -> Result<LoadReport>;
    /// Path of the managed blob file.
    fn data_path(&self) -> PathBuf;
}

pub use json_backend::JsonStorage;
