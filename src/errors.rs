use thiserror::Error;
use uuid::Uuid;

/// Unified error type for core, storage, and configuration failures.
#[derive(Debug, Error)]
pub enum BillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, BillError>;
