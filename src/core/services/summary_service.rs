//! Read-only queries layered over the pure aggregation functions.

use chrono::{DateTime, NaiveDate, Utc};

use crate::bills::{
    category_shares, days_until_due, due_date_in_month, sorted_for_month, summarize_month,
    CategoryShare, DueStatus, Expense, BillBook, MonthKey, MonthSummary,
};

/// One expense resolved against a reference month for presentation.
#[derive(Debug, Clone)]
pub struct ScheduledExpense {
    pub expense: Expense,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub status: DueStatus,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Derives presentation data from the book. Everything is recomputed from
/// the full collection per call.
pub struct SummaryService;

impl SummaryService {
    /// Paid/unpaid totals for the month containing `reference`.
    pub fn month_summary(book: &BillBook, reference: NaiveDate) -> MonthSummary {
        let month = MonthKey::from_date(reference);
        summarize_month(&book.expenses, &month)
    }

    /// All bills resolved against the month containing `reference`, in due
    /// date order with case-insensitive name tie-breaks.
    pub fn due_schedule(book: &BillBook, reference: NaiveDate) -> Vec<ScheduledExpense> {
        let month = MonthKey::from_date(reference);
        sorted_for_month(&book.expenses, reference)
            .into_iter()
            .map(|expense| {
                let due_date = due_date_in_month(expense, reference);
                ScheduledExpense {
                    due_date,
                    days_until_due: days_until_due(expense, reference),
                    status: DueStatus::classify(due_date, reference),
                    paid: expense.is_paid(&month),
                    paid_at: expense.paid_at(&month),
                    expense: expense.clone(),
                }
            })
            .collect()
    }

    /// Category totals with percentage shares for the month containing
    /// `reference`, largest first.
    pub fn category_breakdown(
        book: &BillBook,
        reference: NaiveDate,
        paid_only: bool,
    ) -> Vec<CategoryShare> {
        let month = MonthKey::from_date(reference);
        category_shares(&book.expenses, &month, paid_only)
    }
}
