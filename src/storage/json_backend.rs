//! Filesystem JSON persistence: one blob of expense records plus timestamped
//! backup snapshots with bounded retention.

use std::{
    cmp::Reverse,
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{
    bills::Expense,
    errors::BillError,
    storage::{BackupInfo, LoadReport, StorageBackend},
    utils,
};

/// Fixed storage key: the blob lives at `<data dir>/expenses.json`.
const STORAGE_KEY: &str = "expenses";
const BLOB_EXTENSION: &str = "json";
const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for the expense blob.
#[derive(Clone)]
pub struct JsonStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    /// Creates a storage backend rooted at `base` (the application data
    /// directory when `None`), keeping at most `retention` backups.
    pub fn new(base: Option<PathBuf>, retention: Option<usize>) -> Result<Self, BillError> {
        let base = base.unwrap_or_else(utils::app_data_dir);
        let backups_dir = base.join(BACKUP_DIR);
        utils::ensure_dir(&base)?;
        utils::ensure_dir(&backups_dir)?;
        Ok(Self {
            data_dir: base,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    fn blob_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", STORAGE_KEY, BLOB_EXTENSION))
    }

    fn backup_path(&self, backup_id: &str) -> PathBuf {
        self.backups_dir.join(backup_id)
    }

    fn write_backup_file(
        &self,
        expenses: &[Expense],
        note: Option<&str>,
    ) -> Result<BackupInfo, BillError> {
        utils::ensure_dir(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", STORAGE_KEY, timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{}.{}", stem, BLOB_EXTENSION);
        let path = self.backups_dir.join(&file_name);
        write_atomic(&path, &serialize_expenses(expenses)?)?;
        self.prune_backups()?;
        Ok(BackupInfo {
            id: file_name.clone(),
            created_at: parse_backup_timestamp(&file_name),
            path,
        })
    }

    fn backup_existing_blob(&self) -> Result<(), BillError> {
        let blob = self.blob_path();
        if !blob.exists() {
            return Ok(());
        }
        utils::ensure_dir(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{}_{}.{}", STORAGE_KEY, timestamp, BLOB_EXTENSION);
        fs::copy(&blob, self.backups_dir.join(file_name))?;
        self.prune_backups()?;
        Ok(())
    }

    fn prune_backups(&self) -> Result<(), BillError> {
        let mut entries = self.list_backups()?;
        entries.sort_by_key(|info| Reverse(info.created_at));
        for entry in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }

    fn load_path(&self, path: &Path) -> Result<LoadReport, BillError> {
        if !path.exists() {
            return Ok(LoadReport {
                expenses: Vec::new(),
                warnings: Vec::new(),
                path: path.to_path_buf(),
            });
        }
        let data = fs::read_to_string(path)?;
        let raw: serde_json::Value = serde_json::from_str(&data)?;
        let serde_json::Value::Array(items) = raw else {
            return Err(BillError::Storage(format!(
                "expense blob at {} is not an array",
                path.display()
            )));
        };

        let mut expenses: Vec<Expense> = Vec::with_capacity(items.len());
        let mut warnings = Vec::new();
        let mut seen_ids = HashSet::new();
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<Expense>(item) {
                Ok(expense) => {
                    if !seen_ids.insert(expense.id) {
                        warnings.push(format!(
                            "dropping record {}: duplicate id {}",
                            index, expense.id
                        ));
                        continue;
                    }
                    expenses.push(expense);
                }
                Err(err) => {
                    warnings.push(format!("dropping record {}: {}", index, err));
                }
            }
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        Ok(LoadReport {
            expenses,
            warnings,
            path: path.to_path_buf(),
        })
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, expenses: &[Expense]) -> Result<PathBuf, BillError> {
        let path = self.blob_path();
        self.backup_existing_blob()?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &serialize_expenses(expenses)?)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(records = expenses.len(), path = %path.display(), "expense blob saved");
        Ok(path)
    }

    fn load(&self) -> Result<LoadReport, BillError> {
        self.load_path(&self.blob_path())
    }

    fn backup(&self, expenses: &[Expense], note: Option<&str>) -> Result<BackupInfo, BillError> {
        self.write_backup_file(expenses, note)
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>, BillError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(info.created_at));
        Ok(entries)
    }

    fn restore(&self, backup_id: &str) -> Result<LoadReport, BillError> {
        let source = self.backup_path(backup_id);
        if !source.exists() {
            return Err(BillError::Storage(format!(
                "backup `{}` not found",
                backup_id
            )));
        }
        let target = self.blob_path();
        fs::copy(&source, &target)?;
        self.load_path(&target)
    }

    fn data_path(&self) -> PathBuf {
        self.blob_path()
    }
}

fn serialize_expenses(expenses: &[Expense]) -> Result<String, BillError> {
    Ok(serde_json::to_string_pretty(expenses)?)
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.')) && !sanitized.is_empty() && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", BLOB_EXTENSION))?;
    // Layout is `expenses_YYYYMMDD_HHMM[_note]`; note labels never contain
    // underscores, so the date/time pair sits at fixed positions.
    let segments = trimmed.split('_').collect::<Vec<_>>();
    let date = *segments.get(1)?;
    let time = *segments.get(2)?;
    if !is_digits(date, 8) || !is_digits(time, 4) {
        return None;
    }
    let raw = format!("{}{}", date, time);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), BillError> {
    if let Some(parent) = path.parent() {
        utils::ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
