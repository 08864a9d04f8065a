mod common;

use bill_core::bills::{Expense, MonthKey, FALLBACK_CATEGORY};
use bill_core::core::services::{ExpenseDraft, ExpenseService};
use bill_core::errors::BillError;
use chrono::{TimeZone, Utc};
use common::setup_test_env;
use serde_json::json;
use uuid::Uuid;

#[test]
fn blob_round_trips_with_payment_history() {
    let (mut manager, _config) = setup_test_env();
    let id = ExpenseService::add(
        manager.book_mut(),
        ExpenseDraft {
            name: "Rent".into(),
            category: "Housing".into(),
            amount: 1200.0,
            due_day: 31,
        },
    )
    .unwrap();
    let month: MonthKey = "2024-02".parse().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    ExpenseService::toggle_paid(manager.book_mut(), id, month, now).unwrap();
    let before = manager.book().expense(id).unwrap().clone();
    manager.save().expect("save blob");

    let metadata = manager.load().expect("reload blob");
    assert_eq!(metadata.loaded, 1);
    assert!(metadata.warnings.is_empty());
    assert_eq!(manager.book().expense(id), Some(&before));
    assert_eq!(manager.book().expense(id).unwrap().paid_at(&month), Some(now));
}

#[test]
fn malformed_records_are_dropped_with_warnings() {
    let (mut manager, _config) = setup_test_env();
    let keeper_id = Uuid::new_v4();
    let duplicate_id = Uuid::new_v4();
    let blob = json!([
        {"id": keeper_id, "name": "Rent", "amount": 1200.0, "dueDay": 1},
        {"name": "No Id", "amount": 10.0, "dueDay": 2},
        {"id": Uuid::new_v4(), "name": "Bad Amount", "amount": "ten", "dueDay": 3},
        {"id": duplicate_id, "name": "First", "amount": 5.0, "dueDay": 4},
        {"id": duplicate_id, "name": "Second", "amount": 6.0, "dueDay": 5}
    ]);
    std::fs::write(manager.storage().data_path(), blob.to_string()).unwrap();

    let metadata = manager.load().expect("tolerant load");
    assert_eq!(metadata.loaded, 2);
    assert_eq!(metadata.warnings.len(), 3);
    assert!(manager.book().expense(keeper_id).is_some());
    assert!(metadata
        .warnings
        .iter()
        .any(|warning| warning.contains("duplicate id")));
}

#[test]
fn tolerant_defaults_apply_on_read() {
    let (mut manager, _config) = setup_test_env();
    let id = Uuid::new_v4();
    let blob = json!([
        {
            "id": id,
            "name": "Power",
            "amount": 80.5,
            "dueDay": 12,
            "paidByMonth": null
        }
    ]);
    std::fs::write(manager.storage().data_path(), blob.to_string()).unwrap();

    manager.load().expect("load with defaults");
    let expense = manager.book().expense(id).unwrap();
    assert_eq!(expense.category, FALLBACK_CATEGORY);
    assert!(expense.paid_by_month.is_empty());
}

#[test]
fn non_array_blob_is_a_storage_error() {
    let (mut manager, _config) = setup_test_env();
    std::fs::write(manager.storage().data_path(), r#"{"not":"an array"}"#).unwrap();

    let err = manager.load().expect_err("object blob must fail");
    assert!(matches!(err, BillError::Storage(_)), "unexpected error: {err:?}");
}

#[test]
fn backups_restore_earlier_state_and_respect_retention() {
    let (mut manager, _config) = setup_test_env();
    manager
        .book_mut()
        .add_expense(Expense::new("Rent", "Housing", 1200.0, 1));
    manager.save().unwrap();

    let snapshot = manager.backup(Some("before changes")).expect("backup");
    assert!(snapshot.id.starts_with("expenses_"));

    manager.book_mut().expenses.clear();
    manager.save().unwrap();

    let metadata = manager.restore(&snapshot.id).expect("restore");
    assert_eq!(metadata.loaded, 1);
    assert_eq!(manager.book().expense_count(), 1);

    // Retention for the test environment is 3; extra snapshots get pruned.
    for note in ["one", "two", "three", "four"] {
        manager.backup(Some(note)).unwrap();
    }
    assert!(manager.list_backups().unwrap().len() <= 3);
}

#[test]
fn restoring_an_unknown_backup_fails() {
    let (mut manager, _config) = setup_test_env();
    let err = manager
        .restore("expenses_19700101_0000.json")
        .expect_err("unknown backup must fail");
    assert!(matches!(err, BillError::Storage(_)));
}

#[test]
fn config_round_trips_next_to_the_blob() {
    let (_manager, config_manager) = setup_test_env();
    let mut config = config_manager.load().unwrap();
    config.currency = "EUR".into();
    config_manager.save(&config).unwrap();
    assert_eq!(config_manager.load().unwrap().currency, "EUR");
}
