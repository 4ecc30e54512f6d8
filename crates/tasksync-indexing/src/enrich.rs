//! Resolves user references on change events to display names.
//!
//! Change events carry only `by_user_id` / `to_user_id`; the bulk join
//! already returns names, so this step runs on the change path only.

use std::sync::Arc;
use tracing::debug;

use tasksync_storage::TaskStore;
use tasksync_types::TaskRecord;

use crate::error::IndexingError;

pub struct EnrichmentResolver {
    store: Arc<dyn TaskStore>,
}

impl EnrichmentResolver {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Fill in `assigned_by_name` and `assigned_to_name`.
    ///
    /// Each reference is looked up independently. Absent or zero references
    /// and unknown users leave the name empty. A failed lookup aborts the
    /// whole record.
    pub async fn enrich(&self, task: &mut TaskRecord) -> Result<(), IndexingError> {
        task.assigned_by_name = self.resolve(task.assigner_ref()).await?;
        task.assigned_to_name = self.resolve(task.assignee_ref()).await?;
        Ok(())
    }

    async fn resolve(&self, user_id: Option<i64>) -> Result<Option<String>, IndexingError> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let name = self.store.user_name(user_id).await?;
        if name.is_none() {
            debug!(user_id, "User reference did not resolve");
        }
        Ok(name)
    }
}
