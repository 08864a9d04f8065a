//! Bill domain models, persistence-friendly types, and pure helpers.

pub mod book;
pub mod expense;
pub mod month_key;
pub mod schedule;
pub mod summary;

pub use book::BillBook;
pub use expense::{Expense, DEFAULT_CATEGORY, FALLBACK_CATEGORY};
pub use month_key::{MonthKey, MonthKeyError};
pub use schedule::{days_in_month, days_until_due, due_date_in_month, sorted_for_month, DueStatus};
pub use summary::{
    category_shares, category_totals, percentage_breakdown, summarize_month, total_all, total_paid,
    total_unpaid, CategoryShare, MonthSummary,
};
