//! In-process task store for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use tasksync_types::TaskRecord;

use crate::error::StorageError;
use crate::store::TaskStore;

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<TaskRecord>>,
    users: RwLock<HashMap<i64, String>>,
    fail_lookups: AtomicBool,
    lookups: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user. Bulk rows pick up the name on the next fetch.
    pub fn with_user(self, id: i64, name: impl Into<String>) -> Self {
        if let Ok(mut users) = self.users.write() {
            users.insert(id, name.into());
        }
        self
    }

    pub fn with_task(self, task: TaskRecord) -> Self {
        if let Ok(mut tasks) = self.tasks.write() {
            tasks.push(task);
        }
        self
    }

    /// Make every `user_name` call fail, as if the connection dropped.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Number of `user_name` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), StorageError> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn lookup(&self, id: Option<i64>) -> Option<String> {
        let id = id.filter(|id| *id != 0)?;
        self.users.read().ok()?.get(&id).cloned()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn fetch_all_tasks(&self) -> Result<Vec<TaskRecord>, StorageError> {
        self.check_open()?;

        let mut tasks = self
            .tasks
            .read()
            .map_err(|_| StorageError::InvalidRow("task table lock poisoned".to_string()))?
            .clone();
        tasks.sort_by_key(|t| t.id);

        Ok(tasks
            .into_iter()
            .map(|mut task| {
                task.assigned_by_name = self.lookup(task.by_user_id);
                task.assigned_to_name = self.lookup(task.to_user_id);
                task
            })
            .collect())
    }

    async fn user_name(&self, id: i64) -> Result<Option<String>, StorageError> {
        self.check_open()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("connection reset".to_string()));
        }

        Ok(self
            .users
            .read()
            .map_err(|_| StorageError::InvalidRow("user table lock poisoned".to_string()))?
            .get(&id)
            .cloned())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_joins_names() {
        let mut task = TaskRecord::new(2);
        task.by_user_id = Some(7);
        task.to_user_id = Some(0);

        let store = MemoryTaskStore::new()
            .with_user(7, "Alice")
            .with_task(task)
            .with_task(TaskRecord::new(1));

        let tasks = store.fetch_all_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[1].assigned_by_name.as_deref(), Some("Alice"));
        assert_eq!(tasks[1].assigned_to_name, None);
    }

    #[tokio::test]
    async fn test_user_name_and_failure() {
        let store = MemoryTaskStore::new().with_user(9, "Bob");

        assert_eq!(store.user_name(9).await.unwrap().as_deref(), Some("Bob"));
        assert_eq!(store.user_name(10).await.unwrap(), None);

        store.fail_lookups(true);
        assert!(store.user_name(9).await.is_err());
        assert_eq!(store.lookups(), 3);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_queries() {
        let store = MemoryTaskStore::new();
        store.close().await;

        assert!(store.is_closed());
        assert!(matches!(
            store.fetch_all_tasks().await,
            Err(StorageError::Closed)
        ));
    }
}
