use std::path::PathBuf;

use crate::bills::BillBook;
use crate::errors::BillError;
use crate::storage::{BackupInfo, StorageBackend};

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub warnings: Vec<String>,
    pub path: PathBuf,
    pub loaded: usize,
}

/// Facade that pairs the in-memory book with its persistence backend.
///
/// The front end loads once at startup, routes every mutation through the
/// services, and saves the whole collection afterwards. Saves never overlap;
/// the single-threaded shell serializes them.
pub struct BookManager {
    book: BillBook,
    storage: Box<dyn StorageBackend>,
}

impl BookManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            book: BillBook::new(),
            storage,
        }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn book(&self) -> &BillBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut BillBook {
        &mut self.book
    }

    /// Reads the persisted blob into memory. A missing blob yields an empty
    /// book; malformed records surface as warnings, not failures.
    pub fn load(&mut self) -> Result<LoadMetadata, BillError> {
        let report = self.storage.load()?;
        let loaded = report.expenses.len();
        self.book = BillBook::from_expenses(report.expenses);
        Ok(LoadMetadata {
            warnings: report.warnings,
            path: report.path,
            loaded,
        })
    }

    /// Persists the full collection. A failure is returned to the caller
    /// unchanged; there is no retry.
    pub fn save(&self) -> Result<PathBuf, BillError> {
        self.storage.save(&self.book.expenses)
    }

    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo, BillError> {
        self.storage.backup(&self.book.expenses, note)
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, BillError> {
        self.storage.list_backups()
    }

    /// Replaces the current blob with the named backup and reloads it.
    pub fn restore(&mut self, backup_id: &str) -> Result<LoadMetadata, BillError> {
        let report = self.storage.restore(backup_id)?;
        let loaded = report.expenses.len();
        self.book = BillBook::from_expenses(report.expenses);
        Ok(LoadMetadata {
            warnings: report.warnings,
            path: report.path,
            loaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::Expense;
    use crate::storage::JsonStorage;
    use tempfile::tempdir;

    fn manager(base: std::path::PathBuf) -> BookManager {
        let storage = JsonStorage::new(Some(base), Some(3)).expect("create storage");
        BookManager::new(Box::new(storage))
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = tempdir().unwrap();
        let mut first = manager(temp.path().to_path_buf());
        first
            .book_mut()
            .add_expense(Expense::new("Rent", "Housing", 1200.0, 1));
        let path = first.save().expect("save book");
        assert!(path.exists());

        let mut second = manager(temp.path().to_path_buf());
        let metadata = second.load().expect("load book");
        assert_eq!(metadata.loaded, 1);
        assert!(metadata.warnings.is_empty());
        assert_eq!(second.book().expense_count(), 1);
    }

    #[test]
    fn missing_blob_loads_an_empty_book() {
        let temp = tempdir().unwrap();
        let mut fresh = manager(temp.path().to_path_buf());
        let metadata = fresh.load().expect("load succeeds");
        assert_eq!(metadata.loaded, 0);
        assert!(fresh.book().is_empty());
    }

    #[test]
    fn restore_brings_back_the_snapshotted_records() {
        let temp = tempdir().unwrap();
        let mut current = manager(temp.path().to_path_buf());
        current
            .book_mut()
            .add_expense(Expense::new("Rent", "Housing", 1200.0, 1));
        current.save().unwrap();
        let backup = current.backup(Some("before wipe")).expect("create backup");

        current.book_mut().expenses.clear();
        current.save().unwrap();
        assert!(current.book().is_empty());

        let metadata = current.restore(&backup.id).expect("restore backup");
        assert_eq!(metadata.loaded, 1);
        assert_eq!(current.book().expense_count(), 1);
    }
}
