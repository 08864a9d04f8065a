//! Pure aggregation over the expense collection.
//!
//! Every function here recomputes from the full record list on each call.
//! There is no caching or incremental state to invalidate.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{expense::Expense, month_key::MonthKey};

/// Sum of all amounts, paid status ignored.
pub fn total_all(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// Sum of amounts over records paid for `month`.
pub fn total_paid(expenses: &[Expense], month: &MonthKey) -> f64 {
    expenses
        .iter()
        .filter(|expense| expense.is_paid(month))
        .map(|expense| expense.amount)
        .sum()
}

/// Sum of amounts over records not paid for `month`.
pub fn total_unpaid(expenses: &[Expense], month: &MonthKey) -> f64 {
    expenses
        .iter()
        .filter(|expense| !expense.is_paid(month))
        .map(|expense| expense.amount)
        .sum()
}

/// Amounts grouped by category. With `paid_only`, only records settled for
/// `month` contribute.
pub fn category_totals(
    expenses: &[Expense],
    month: &MonthKey,
    paid_only: bool,
) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for expense in expenses {
        if paid_only && !expense.is_paid(month) {
            continue;
        }
        *totals.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
    }
    totals
}

/// Each category's share of the grand total, as a percentage. An all-zero
/// total yields an empty map rather than dividing by zero.
pub fn percentage_breakdown(totals: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let grand_total: f64 = totals.values().sum();
    if grand_total == 0.0 {
        return BTreeMap::new();
    }
    totals
        .iter()
        .map(|(category, value)| (category.clone(), value / grand_total * 100.0))
        .collect()
}

/// Paid and unpaid totals for one month, bundled for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub total_all: f64,
    pub total_paid: f64,
    pub total_unpaid: f64,
    pub paid_count: usize,
    pub unpaid_count: usize,
}

pub fn summarize_month(expenses: &[Expense], month: &MonthKey) -> MonthSummary {
    let mut summary = MonthSummary {
        month: *month,
        total_all: 0.0,
        total_paid: 0.0,
        total_unpaid: 0.0,
        paid_count: 0,
        unpaid_count: 0,
    };
    for expense in expenses {
        summary.total_all += expense.amount;
        if expense.is_paid(month) {
            summary.total_paid += expense.amount;
            summary.paid_count += 1;
        } else {
            summary.total_unpaid += expense.amount;
            summary.unpaid_count += 1;
        }
    }
    summary
}

/// A category total joined with its percentage share.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    pub percent: f64,
}

/// Category totals with percentages, largest first, names breaking ties.
pub fn category_shares(
    expenses: &[Expense],
    month: &MonthKey,
    paid_only: bool,
) -> Vec<CategoryShare> {
    let totals = category_totals(expenses, month, paid_only);
    let percentages = percentage_breakdown(&totals);
    let mut shares: Vec<CategoryShare> = totals
        .iter()
        .map(|(category, total)| CategoryShare {
            category: category.clone(),
            total: *total,
            percent: percentages.get(category).copied().unwrap_or(0.0),
        })
        .collect();
    shares.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}
