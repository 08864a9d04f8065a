use bill_core::bills::{total_all, total_paid, total_unpaid, BillBook, Expense, MonthKey};
use bill_core::core::services::{ExpenseDraft, ExpenseService};
use chrono::{TimeZone, Utc};

fn month(raw: &str) -> MonthKey {
    raw.parse().unwrap()
}

fn draft(name: &str, category: &str, amount: f64, due_day: u32) -> ExpenseDraft {
    ExpenseDraft {
        name: name.into(),
        category: category.into(),
        amount,
        due_day,
    }
}

#[test]
fn toggle_paid_is_an_involution() {
    let mut expense = Expense::new("Rent", "Housing", 1200.0, 1);
    let february = month("2024-02");
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let before = expense.clone();

    assert!(expense.toggle_paid(february, now));
    assert!(expense.is_paid(&february));
    assert!(!expense.toggle_paid(february, now));
    assert_eq!(expense, before);
}

#[test]
fn paid_and_unpaid_totals_always_partition_the_whole() {
    let mut book = BillBook::new();
    let now = Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap();
    let february = month("2024-02");

    for (index, amount) in [1200.0, 80.0, 30.0, 25.0, 9.99].into_iter().enumerate() {
        let id = ExpenseService::add(
            &mut book,
            draft(&format!("Bill {index}"), "Other", amount, 5),
        )
        .unwrap();
        if index % 2 == 0 {
            ExpenseService::toggle_paid(&mut book, id, february, now).unwrap();
        }
    }

    let all = total_all(&book.expenses);
    let paid = total_paid(&book.expenses, &february);
    let unpaid = total_unpaid(&book.expenses, &february);
    assert!((paid + unpaid - all).abs() < 1e-9);
    assert!(paid > 0.0 && unpaid > 0.0);
}

#[test]
fn paid_state_is_scoped_per_month() {
    let mut book = BillBook::new();
    let id = ExpenseService::add(&mut book, draft("Power", "Utilities", 80.0, 12)).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 2, 12, 9, 0, 0).unwrap();
    ExpenseService::toggle_paid(&mut book, id, month("2024-02"), now).unwrap();

    let expense = book.expense(id).unwrap();
    assert!(expense.is_paid(&month("2024-02")));
    assert!(!expense.is_paid(&month("2024-01")));
    assert!(!expense.is_paid(&month("2024-03")));
    assert_eq!(total_paid(&book.expenses, &month("2024-01")), 0.0);
    assert_eq!(total_paid(&book.expenses, &month("2024-02")), 80.0);
}

#[test]
fn editing_a_bill_keeps_its_payment_history_and_id() {
    let mut book = BillBook::new();
    let id = ExpenseService::add(&mut book, draft("Internet", "Utilities", 49.9, 28)).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 2, 28, 18, 30, 0).unwrap();
    ExpenseService::toggle_paid(&mut book, id, month("2024-02"), now).unwrap();

    ExpenseService::update(&mut book, id, draft("Internet", "Utilities", 54.9, 28)).unwrap();

    let expense = book.expense(id).unwrap();
    assert_eq!(expense.id, id);
    assert_eq!(expense.amount, 54.9);
    assert!(expense.is_paid(&month("2024-02")));
    assert_eq!(expense.paid_at(&month("2024-02")), Some(now));
}

#[test]
fn removing_a_bill_drops_its_contribution() {
    let mut book = BillBook::new();
    let rent = ExpenseService::add(&mut book, draft("Rent", "Housing", 1200.0, 1)).unwrap();
    ExpenseService::add(&mut book, draft("Gym", "Health", 25.0, 20)).unwrap();

    ExpenseService::remove(&mut book, rent).unwrap();
    assert_eq!(total_all(&book.expenses), 25.0);
}
