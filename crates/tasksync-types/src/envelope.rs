//! Change event envelope decoding.
//!
//! The change stream delivers Debezium-style JSON values:
//!
//! ```json
//! {"payload": {"op": "u", "before": {"id": 42}, "after": {"id": 42, "title": "..."}}}
//! ```
//!
//! `op == "d"` is a delete keyed by `before.id`; any other operation is a
//! create/update carrying the full row in `after`. Anything that does not
//! fit this shape is reported as a [`SkipReason`] and is not an error.

use serde::Deserialize;

use crate::task::TaskRecord;

/// Operation tag used by the CDC source for deletes.
pub const DELETE_OP: &str = "d";

/// A decoded change event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Create or update: index the `after` row
    Upsert(TaskRecord),
    /// Delete: remove the point with this identifier
    Delete(i64),
}

impl ChangeEvent {
    /// Identifier of the task this event refers to.
    pub fn task_id(&self) -> i64 {
        match self {
            ChangeEvent::Upsert(task) => task.id,
            ChangeEvent::Delete(id) => *id,
        }
    }
}

/// Why a stream message produced no change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Message had no value (e.g. a tombstone)
    EmptyValue,
    /// Value was not valid JSON
    InvalidJson(String),
    /// Value had no (or an empty) `payload` object
    MissingPayload,
    /// Delete without a `before` snapshot or identifier
    MissingBefore,
    /// Create/update without an `after` snapshot
    MissingAfter,
    /// `after` snapshot did not decode to a task row
    InvalidRow(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyValue => write!(f, "empty message value"),
            SkipReason::InvalidJson(e) => write!(f, "invalid json: {}", e),
            SkipReason::MissingPayload => write!(f, "missing payload"),
            SkipReason::MissingBefore => write!(f, "delete without before.id"),
            SkipReason::MissingAfter => write!(f, "change without after row"),
            SkipReason::InvalidRow(e) => write!(f, "invalid row: {}", e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct BeforeKey {
    id: Option<i64>,
}

/// Decode a raw message value into a change event.
pub fn decode_change(value: Option<&[u8]>) -> Result<ChangeEvent, SkipReason> {
    let bytes = match value {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(SkipReason::EmptyValue),
    };

    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| SkipReason::InvalidJson(e.to_string()))?;

    let mut payload = match envelope.payload {
        Some(payload) if !payload.is_empty() => payload,
        _ => return Err(SkipReason::MissingPayload),
    };

    let is_delete = payload.get("op").and_then(|op| op.as_str()) == Some(DELETE_OP);

    if is_delete {
        let before = payload
            .remove("before")
            .filter(|v| !v.is_null())
            .ok_or(SkipReason::MissingBefore)?;
        let key: BeforeKey =
            serde_json::from_value(before).map_err(|_| SkipReason::MissingBefore)?;
        return key.id.map(ChangeEvent::Delete).ok_or(SkipReason::MissingBefore);
    }

    let after = payload
        .remove("after")
        .filter(|v| !v.is_null())
        .ok_or(SkipReason::MissingAfter)?;
    let task: TaskRecord =
        serde_json::from_value(after).map_err(|e| SkipReason::InvalidRow(e.to_string()))?;

    Ok(ChangeEvent::Upsert(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_decode_delete() {
        let msg = bytes(json!({"payload": {"op": "d", "before": {"id": 42}, "after": null}}));
        assert_eq!(decode_change(Some(&msg)), Ok(ChangeEvent::Delete(42)));
    }

    #[test]
    fn test_decode_upsert() {
        let msg = bytes(json!({
            "schema": {},
            "payload": {
                "op": "c",
                "before": null,
                "after": {"id": 7, "title": "Write docs", "priority": 2}
            }
        }));
        let event = decode_change(Some(&msg)).unwrap();
        assert_eq!(event.task_id(), 7);
        match event {
            ChangeEvent::Upsert(task) => {
                assert_eq!(task.title.as_deref(), Some("Write docs"));
                assert_eq!(task.priority, Some(2));
            }
            other => panic!("expected upsert, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_op_is_upsert() {
        let msg = bytes(json!({"payload": {"after": {"id": 3}}}));
        assert_eq!(
            decode_change(Some(&msg)),
            Ok(ChangeEvent::Upsert(TaskRecord::new(3)))
        );
    }

    #[test]
    fn test_skip_reasons() {
        assert_eq!(decode_change(None), Err(SkipReason::EmptyValue));
        assert_eq!(decode_change(Some(b"")), Err(SkipReason::EmptyValue));
        assert!(matches!(
            decode_change(Some(b"not json")),
            Err(SkipReason::InvalidJson(_))
        ));
        assert_eq!(
            decode_change(Some(&bytes(json!({"schema": {}})))),
            Err(SkipReason::MissingPayload)
        );
        assert_eq!(
            decode_change(Some(&bytes(json!({"payload": {}})))),
            Err(SkipReason::MissingPayload)
        );
        assert_eq!(
            decode_change(Some(&bytes(json!({"payload": null})))),
            Err(SkipReason::MissingPayload)
        );
        assert_eq!(
            decode_change(Some(&bytes(json!({"payload": {"op": "d", "before": null}})))),
            Err(SkipReason::MissingBefore)
        );
        assert_eq!(
            decode_change(Some(&bytes(json!({"payload": {"op": "d", "before": {}}})))),
            Err(SkipReason::MissingBefore)
        );
        assert_eq!(
            decode_change(Some(&bytes(json!({"payload": {"op": "u", "after": null}})))),
            Err(SkipReason::MissingAfter)
        );
        assert!(matches!(
            decode_change(Some(&bytes(json!({"payload": {"op": "u", "after": {"title": "x"}}})))),
            Err(SkipReason::InvalidRow(_))
        ));
    }

    #[test]
    fn test_non_object_value_is_skipped() {
        assert!(matches!(
            decode_change(Some(b"[1, 2, 3]")),
            Err(SkipReason::InvalidJson(_))
        ));
    }
}
