//! Projection of a task record into the payload stored with each point.

use serde::{Deserialize, Serialize};

use crate::task::TaskRecord;

/// Flat payload stored alongside the task vector.
///
/// Absent values are omitted from the serialized map rather than written
/// as defaults, so a search-side filter on e.g. `target_date_ts` never
/// matches a task without a due date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_by_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date_ts: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at_ts: Option<i64>,
}

impl TaskPayload {
    /// Project an (enriched) task record.
    pub fn project(task: &TaskRecord) -> Self {
        Self {
            task_id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority_label().map(str::to_string),
            status: task.status_label().map(str::to_string),
            progress: task.progress_label().map(str::to_string),
            assigned_by_name: task.assigned_by_name.clone(),
            assigned_to_name: task.assigned_to_name.clone(),
            target_date_ts: task.target_date.as_ref().and_then(|d| d.to_epoch_seconds()),
            updated_at_ts: task.updated_at.as_ref().and_then(|d| d.to_epoch_seconds()),
        }
    }

    /// Serialize into a JSON object map.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // A struct of scalars always serializes to an object
            _ => serde_json::Map::new(),
        }
    }
}
