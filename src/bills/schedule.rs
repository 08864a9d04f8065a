//! Pure due-date computations for a reference month.

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate};

use super::expense::Expense;

const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Coarse position of a due date relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    DueSoon,
    Upcoming,
}

impl DueStatus {
    pub fn classify(due: NaiveDate, reference: NaiveDate) -> DueStatus {
        if due < reference {
            return DueStatus::Overdue;
        }
        let soon_cutoff = reference + Duration::days(DUE_SOON_WINDOW_DAYS);
        if due <= soon_cutoff {
            DueStatus::DueSoon
        } else {
            DueStatus::Upcoming
        }
    }
}

/// Number of calendar days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

/// Concrete due date of `expense` within the month containing `reference`.
///
/// The configured day-of-month is clamped into the month's length, so a bill
/// due on day 31 resolves to Feb 28 (or 29 in leap years). The clamp is
/// recomputed every month and never written back to the record.
pub fn due_date_in_month(expense: &Expense, reference: NaiveDate) -> NaiveDate {
    let last = days_in_month(reference.year(), reference.month());
    let day = expense.due_day.clamp(1, last);
    NaiveDate::from_ymd_opt(reference.year(), reference.month(), day)
        .expect("clamped day is within the month")
}

/// Whole days from `reference` to the bill's due date this month. Negative
/// means overdue.
pub fn days_until_due(expense: &Expense, reference: NaiveDate) -> i64 {
    (due_date_in_month(expense, reference) - reference).num_days()
}

/// Orders expenses by due date within the reference month, breaking ties by
/// case-insensitive name so same-day bills render deterministically.
pub fn sorted_for_month<'a>(expenses: &'a [Expense], reference: NaiveDate) -> Vec<&'a Expense> {
    let mut sorted: Vec<&Expense> = expenses.iter().collect();
    sorted.sort_by(|a, b| compare_for_month(a, b, reference));
    sorted
}

fn compare_for_month(a: &Expense, b: &Expense, reference: NaiveDate) -> Ordering {
    due_date_in_month(a, reference)
        .cmp(&due_date_in_month(b, reference))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}
