//! Command-style mutations for the expense collection.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::bills::{BillBook, Expense, MonthKey, DEFAULT_CATEGORY};
use crate::core::services::{ServiceError, ServiceResult};
use crate::errors::BillError;

/// Field values captured from a front end before a record exists.
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub due_day: u32,
}

/// Provides validated CRUD and paid-state commands over a [`BillBook`].
///
/// Input validation lives here so any front end gets the same rejection
/// behavior; the record constructors themselves stay unchecked.
pub struct ExpenseService;

impl ExpenseService {
    /// Validates the draft and appends a new expense, returning its id.
    pub fn add(book: &mut BillBook, draft: ExpenseDraft) -> ServiceResult<Uuid> {
        let (name, category, amount, due_day) = validate(draft)?;
        Ok(book.add_expense(Expense::new(name, category, amount, due_day)))
    }

    /// Replaces the fields of the expense identified by `id`, preserving its
    /// identity and carrying the payment history over from the previous
    /// version.
    pub fn update(book: &mut BillBook, id: Uuid, draft: ExpenseDraft) -> ServiceResult<()> {
        let (name, category, amount, due_day) = validate(draft)?;
        let expense = book
            .expense_mut(id)
            .ok_or(BillError::ExpenseNotFound(id))?;
        expense.name = name;
        expense.category = category;
        expense.amount = amount;
        expense.due_day = due_day;
        Ok(())
    }

    /// Removes the expense identified by `id`, returning the removed record.
    pub fn remove(book: &mut BillBook, id: Uuid) -> ServiceResult<Expense> {
        book.remove_expense(id)
            .ok_or_else(|| ServiceError::from(BillError::ExpenseNotFound(id)))
    }

    /// Flips the paid state of the expense for `month`, returning the new
    /// state. The model accepts any month; front ends are expected to pass
    /// the current one.
    pub fn toggle_paid(
        book: &mut BillBook,
        id: Uuid,
        month: MonthKey,
        now: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        let expense = book
            .expense_mut(id)
            .ok_or(BillError::ExpenseNotFound(id))?;
        Ok(expense.toggle_paid(month, now))
    }

    /// Returns a snapshot of the book's expenses.
    pub fn list(book: &BillBook) -> &[Expense] {
        &book.expenses
    }
}

fn validate(draft: ExpenseDraft) -> ServiceResult<(String, String, f64, u32)> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::Invalid("name must not be empty".into()));
    }
    if !draft.amount.is_finite() || draft.amount < 0.0 {
        return Err(ServiceError::Invalid(
            "amount must be a non-negative number".into(),
        ));
    }
    if !(1..=31).contains(&draft.due_day) {
        return Err(ServiceError::Invalid(
            "due day must be between 1 and 31".into(),
        ));
    }
    let category = draft.category.trim();
    let category = if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category.to_string()
    };
    Ok((name, category, draft.amount, draft.due_day))
}
