//! The expense record: a recurring monthly bill and its payment history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::month_key::MonthKey;

/// Category applied when the stored record has no category field at all.
pub const FALLBACK_CATEGORY: &str = "General";

/// Category applied when the user leaves the field blank at the input boundary.
pub const DEFAULT_CATEGORY: &str = "Other";

/// A recurring monthly bill.
///
/// `due_day` is a day-of-month in 1..=31, not a full date; short months clamp
/// it when a concrete due date is computed. `paid_by_month` maps a month key
/// to the ISO-8601 timestamp recorded when that month's instance was settled;
/// absence of a key means unpaid for that month. The timestamp is kept as the
/// raw stored string so a malformed value still counts as paid while
/// [`Expense::paid_at`] resolves to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "fallback_category")]
    pub category: String,
    pub amount: f64,
    pub due_day: u32,
    #[serde(default, deserialize_with = "deserialize_paid_by_month")]
    pub paid_by_month: BTreeMap<MonthKey, String>,
}

impl Expense {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        due_day: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            amount,
            due_day,
            paid_by_month: BTreeMap::new(),
        }
    }

    /// Returns whether this bill is settled for `month`.
    pub fn is_paid(&self, month: &MonthKey) -> bool {
        self.paid_by_month.contains_key(month)
    }

    /// Returns the parsed payment timestamp for `month`, or `None` when the
    /// month is unpaid or the stored value does not parse.
    pub fn paid_at(&self, month: &MonthKey) -> Option<DateTime<Utc>> {
        self.paid_by_month
            .get(month)
            .and_then(|stamp| DateTime::parse_from_rfc3339(stamp).ok())
            .map(|stamp| stamp.with_timezone(&Utc))
    }

    /// Flips the paid state for `month`: unpaid becomes paid at `now`, paid
    /// becomes unpaid. Returns the new paid state.
    pub fn toggle_paid(&mut self, month: MonthKey, now: DateTime<Utc>) -> bool {
        if self.paid_by_month.remove(&month).is_some() {
            false
        } else {
            self.paid_by_month.insert(month, now.to_rfc3339());
            true
        }
    }
}

fn fallback_category() -> String {
    FALLBACK_CATEGORY.to_string()
}

/// Reads `paidByMonth` tolerantly: `null` becomes an empty map, entries with
/// a key that is not a valid month key are skipped, and non-string timestamp
/// values are retained in their JSON rendering (they count as paid but never
/// parse into a timestamp).
fn deserialize_paid_by_month<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<MonthKey, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    let mut map = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let Ok(month) = key.parse::<MonthKey>() else {
            continue;
        };
        let stamp = match value {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        map.insert(month, stamp);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn february() -> MonthKey {
        "2024-02".parse().unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn toggle_marks_paid_then_unpaid() {
        let mut expense = Expense::new("Rent", "Housing", 1200.0, 1);
        assert!(!expense.is_paid(&february()));

        assert!(expense.toggle_paid(february(), noon()));
        assert!(expense.is_paid(&february()));
        assert_eq!(expense.paid_at(&february()), Some(noon()));

        assert!(!expense.toggle_paid(february(), noon()));
        assert!(!expense.is_paid(&february()));
        assert_eq!(expense.paid_at(&february()), None);
    }

    #[test]
    fn malformed_timestamp_counts_as_paid_without_a_time() {
        let mut expense = Expense::new("Water", "Utilities", 30.0, 10);
        expense
            .paid_by_month
            .insert(february(), "not-a-timestamp".into());
        assert!(expense.is_paid(&february()));
        assert_eq!(expense.paid_at(&february()), None);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let mut expense = Expense::new("Internet", "Utilities", 49.9, 28);
        expense.toggle_paid(february(), noon());
        let json = serde_json::to_value(&expense).unwrap();
        assert!(json.get("dueDay").is_some());
        assert!(json.get("paidByMonth").is_some());
        assert_eq!(json["paidByMonth"]["2024-02"], noon().to_rfc3339());
    }

    #[test]
    fn round_trips_including_empty_history() {
        let expense = Expense::new("Gym", "Health", 25.0, 5);
        let json = serde_json::to_string(&expense).unwrap();
        let back: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expense);
    }

    #[test]
    fn missing_category_defaults_to_general() {
        let json = format!(
            r#"{{"id":"{}","name":"Power","amount":80.5,"dueDay":12}}"#,
            Uuid::new_v4()
        );
        let expense: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(expense.category, FALLBACK_CATEGORY);
        assert!(expense.paid_by_month.is_empty());
    }

    #[test]
    fn null_paid_map_reads_as_empty() {
        let json = format!(
            r#"{{"id":"{}","name":"Power","amount":80.5,"dueDay":12,"paidByMonth":null}}"#,
            Uuid::new_v4()
        );
        let expense: Expense = serde_json::from_str(&json).unwrap();
        assert!(expense.paid_by_month.is_empty());
    }

    #[test]
    fn invalid_month_keys_are_skipped() {
        let json = format!(
            r#"{{"id":"{}","name":"Power","amount":80.5,"dueDay":12,
                "paidByMonth":{{"2024-02":"2024-02-15T12:00:00Z","garbage":"x","2024-3":"y"}}}}"#,
            Uuid::new_v4()
        );
        let expense: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(expense.paid_by_month.len(), 1);
        assert!(expense.is_paid(&february()));
    }

    #[test]
    fn missing_required_fields_fail_deserialization() {
        for json in [
            r#"{"name":"Power","amount":80.5,"dueDay":12}"#,
            r#"{"id":"3f0c0a1e-0000-0000-0000-000000000000","amount":80.5,"dueDay":12}"#,
            r#"{"id":"3f0c0a1e-0000-0000-0000-000000000000","name":"Power","dueDay":12}"#,
            r#"{"id":"3f0c0a1e-0000-0000-0000-000000000000","name":"Power","amount":80.5}"#,
            r#"{"id":"3f0c0a1e-0000-0000-0000-000000000000","name":"Power","amount":"80","dueDay":12}"#,
        ] {
            assert!(serde_json::from_str::<Expense>(json).is_err(), "accepted {json}");
        }
    }
}
