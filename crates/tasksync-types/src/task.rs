//! Task record: the unit of synchronization.
//!
//! A `TaskRecord` is produced either by the bulk join query (names already
//! resolved) or by decoding the `after` snapshot of a change event (names
//! filled in later by the enrichment step).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::codes::{Priority, Progress, TaskStatus};

/// Epoch values at or above this magnitude are microseconds.
const MICROS_THRESHOLD: i64 = 100_000_000_000_000;
/// Epoch values at or above this magnitude are milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;
/// Epoch values below this magnitude are days (Debezium `io.debezium.time.Date`).
const DAYS_THRESHOLD: i64 = 1_000_000;

const SECONDS_PER_DAY: i64 = 86_400;

/// A date column as delivered by the store or the change stream.
///
/// Change streams encode temporal columns either as ISO-8601 text or as a
/// number whose unit depends on the column type (days for `date`, millis
/// or micros for timestamps), so the raw form is kept and only converted
/// when the payload is projected.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskDate {
    /// Exact epoch seconds, as read from the store
    Seconds(i64),
    /// Connector number: days, seconds, milliseconds or microseconds by magnitude
    Epoch(i64),
    /// ISO-8601 / RFC 3339 text
    Text(String),
}

impl TaskDate {
    /// Convert to integer epoch seconds in UTC.
    ///
    /// Returns `None` for text that does not parse. Naive timestamps are
    /// taken to be UTC.
    pub fn to_epoch_seconds(&self) -> Option<i64> {
        match self {
            TaskDate::Seconds(value) => Some(*value),
            TaskDate::Epoch(value) => {
                let magnitude = value.checked_abs()?;
                if magnitude >= MICROS_THRESHOLD {
                    Some(value / 1_000_000)
                } else if magnitude >= MILLIS_THRESHOLD {
                    Some(value / 1_000)
                } else if magnitude < DAYS_THRESHOLD {
                    value.checked_mul(SECONDS_PER_DAY)
                } else {
                    Some(*value)
                }
            }
            TaskDate::Text(text) => parse_text_timestamp(text).map(|dt| dt.timestamp()),
        }
    }
}

impl From<DateTime<Utc>> for TaskDate {
    fn from(value: DateTime<Utc>) -> Self {
        TaskDate::Seconds(value.timestamp())
    }
}

impl From<NaiveDateTime> for TaskDate {
    fn from(value: NaiveDateTime) -> Self {
        TaskDate::Seconds(value.and_utc().timestamp())
    }
}

fn parse_text_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    // Postgres-style offsets ("+00" / "+0530") are not RFC 3339
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Lenient date decoding: anything that is not a number or a string is absent.
fn deserialize_task_date<'de, D>(deserializer: D) -> Result<Option<TaskDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(TaskDate::Epoch),
        Some(serde_json::Value::String(s)) => Some(TaskDate::Text(s)),
        _ => None,
    })
}

/// A row of the task table, optionally enriched with user display names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskRecord {
    /// Primary key; reused as the vector index point id
    pub id: i64,

    #[serde(default)]
    pub title: Option<String>,

    /// Rich text, may contain markup tags
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(default)]
    pub status: Option<i64>,

    #[serde(default)]
    pub progress: Option<i64>,

    /// Assignee reference
    #[serde(default)]
    pub to_user_id: Option<i64>,

    /// Assigner reference
    #[serde(default)]
    pub by_user_id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_task_date")]
    pub target_date: Option<TaskDate>,

    #[serde(default, deserialize_with = "deserialize_task_date")]
    pub updated_at: Option<TaskDate>,

    /// Resolved display name of `to_user_id`
    #[serde(default)]
    pub assigned_to_name: Option<String>,

    /// Resolved display name of `by_user_id`
    #[serde(default)]
    pub assigned_by_name: Option<String>,
}

impl TaskRecord {
    /// Create a record with only the identifier set.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Point id in the vector index, `None` for negative identifiers.
    pub fn point_id(&self) -> Option<u64> {
        u64::try_from(self.id).ok()
    }

    /// Priority label for the stored code, if known.
    pub fn priority_label(&self) -> Option<&'static str> {
        self.priority
            .map(Priority::from_code)
            .and_then(|p| p.label())
    }

    /// Status label for the stored code, if known.
    pub fn status_label(&self) -> Option<&'static str> {
        self.status.map(TaskStatus::from_code).and_then(|s| s.label())
    }

    /// Progress label for the stored code, if known.
    pub fn progress_label(&self) -> Option<&'static str> {
        self.progress
            .map(Progress::from_code)
            .and_then(|p| p.label())
    }

    /// Assigner user id, treating zero as "no reference".
    pub fn assigner_ref(&self) -> Option<i64> {
        self.by_user_id.filter(|id| *id != 0)
    }

    /// Assignee user id, treating zero as "no reference".
    pub fn assignee_ref(&self) -> Option<i64> {
        self.to_user_id.filter(|id| *id != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_after_snapshot() {
        let json = r#"{
            "id": 42,
            "title": "Fix bug",
            "description": "<p>urgent</p>",
            "priority": 4,
            "status": 1,
            "progress": 0,
            "by_user_id": 7,
            "to_user_id": 9,
            "target_date": "2024-03-01T12:00:00Z",
            "updated_at": 1709294400000000,
            "extra_column": true
        }"#;
        let task: TaskRecord = serde_json::from_str(json).unwrap();

        assert_eq!(task.id, 42);
        assert_eq!(task.title.as_deref(), Some("Fix bug"));
        assert_eq!(task.assigner_ref(), Some(7));
        assert_eq!(task.assignee_ref(), Some(9));
        assert_eq!(task.priority_label(), Some("urgent"));
        assert_eq!(task.status_label(), Some("active"));
        assert_eq!(task.progress_label(), Some("todo"));
        assert_eq!(
            task.target_date,
            Some(TaskDate::Text("2024-03-01T12:00:00Z".to_string()))
        );
        assert_eq!(task.updated_at, Some(TaskDate::Epoch(1709294400000000)));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result = serde_json::from_str::<TaskRecord>(r#"{"title": "no id"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unusable_dates_are_absent() {
        let json = r#"{"id": 1, "target_date": null, "updated_at": {"nested": true}}"#;
        let task: TaskRecord = serde_json::from_str(json).unwrap();
        assert!(task.target_date.is_none());
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn test_zero_user_reference_is_absent() {
        let mut task = TaskRecord::new(1);
        task.by_user_id = Some(0);
        task.to_user_id = None;
        assert_eq!(task.assigner_ref(), None);
        assert_eq!(task.assignee_ref(), None);
    }

    #[test]
    fn test_point_id() {
        assert_eq!(TaskRecord::new(42).point_id(), Some(42));
        assert_eq!(TaskRecord::new(-1).point_id(), None);
    }

    #[test]
    fn test_epoch_units() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap().timestamp();
        assert_eq!(TaskDate::Epoch(expected).to_epoch_seconds(), Some(expected));
        assert_eq!(
            TaskDate::Epoch(expected * 1_000).to_epoch_seconds(),
            Some(expected)
        );
        assert_eq!(
            TaskDate::Epoch(expected * 1_000_000).to_epoch_seconds(),
            Some(expected)
        );
    }

    #[test]
    fn test_epoch_days_match_store_seconds() {
        // 2024-03-01 as a Debezium date column
        let task: TaskRecord = serde_json::from_str(r#"{"id":1,"target_date":19783}"#).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().timestamp();

        assert_eq!(
            task.target_date.as_ref().and_then(TaskDate::to_epoch_seconds),
            Some(1_709_251_200)
        );
        assert_eq!(
            TaskDate::Seconds(midnight).to_epoch_seconds(),
            Some(1_709_251_200)
        );
        assert_eq!(TaskDate::Epoch(-1).to_epoch_seconds(), Some(-86_400));
    }

    #[test]
    fn test_text_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap().timestamp();

        for text in [
            "2024-03-01T12:00:00Z",
            "2024-03-01T14:00:00+02:00",
            "2024-03-01T12:00:00",
            "2024-03-01 12:00:00.000",
            "2024-03-01 12:00:00+00",
        ] {
            assert_eq!(
                TaskDate::Text(text.to_string()).to_epoch_seconds(),
                Some(expected),
                "format {text}"
            );
        }

        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().timestamp();
        assert_eq!(
            TaskDate::Text("2024-03-01".to_string()).to_epoch_seconds(),
            Some(midnight)
        );
    }

    #[test]
    fn test_unparsable_text() {
        assert_eq!(TaskDate::Text("not a date".to_string()).to_epoch_seconds(), None);
        assert_eq!(TaskDate::Text(String::new()).to_epoch_seconds(), None);
    }

    #[test]
    fn test_from_naive_datetime() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap().timestamp();
        assert_eq!(TaskDate::from(naive).to_epoch_seconds(), Some(expected));
    }
}
