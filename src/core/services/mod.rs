pub mod expense_service;
pub mod summary_service;

pub use expense_service::{ExpenseDraft, ExpenseService};
pub use summary_service::{ScheduledExpense, SummaryService};

use crate::errors::BillError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Book(#[from] BillError),
    #[error("{0}")]
    Invalid(String),
}
