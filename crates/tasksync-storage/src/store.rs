//! Task store trait.

use async_trait::async_trait;

use tasksync_types::TaskRecord;

use crate::error::StorageError;

/// Read-only access to the task and user tables.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every task joined with both user names, in id order.
    async fn fetch_all_tasks(&self) -> Result<Vec<TaskRecord>, StorageError>;

    /// Display name of user `id`, or `None` if there is no such user.
    async fn user_name(&self, id: i64) -> Result<Option<String>, StorageError>;

    /// Release connections. Calls after close fail with [`StorageError::Closed`].
    async fn close(&self);
}
