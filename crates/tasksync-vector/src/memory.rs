//! In-process vector index.
//!
//! Same contract as the Qdrant backend, held in a map. Used by tests and
//! for dry runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::VectorError;
use crate::index::{check_dimension, TaskPoint, VectorIndex};

#[derive(Debug)]
pub struct MemoryIndex {
    dimension: usize,
    points: RwLock<HashMap<u64, TaskPoint>>,
    created: RwLock<bool>,
    writes: AtomicUsize,
}

impl MemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: RwLock::new(HashMap::new()),
            created: RwLock::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, id: u64) -> Option<TaskPoint> {
        self.points.read().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.points.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted ids of every stored point.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .points
            .read()
            .map(|p| p.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Whether `ensure_collection` has run.
    pub fn is_created(&self) -> bool {
        self.created.read().map(|c| *c).unwrap_or(false)
    }

    /// Number of mutations that changed the index (upserts and deletes of
    /// present points).
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn poisoned() -> VectorError {
        VectorError::Index("index lock poisoned".to_string())
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_collection(&self) -> Result<(), VectorError> {
        *self.created.write().map_err(|_| Self::poisoned())? = true;
        Ok(())
    }

    async fn upsert(&self, point: TaskPoint) -> Result<(), VectorError> {
        check_dimension(self.dimension, &point.vector)?;
        self.points
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(point.id, point);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<(), VectorError> {
        let removed = self
            .points
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(&id);
        if removed.is_some() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasksync_types::{TaskPayload, TaskRecord};

    fn point(id: u64, title: &str) -> TaskPoint {
        let mut task = TaskRecord::new(id as i64);
        task.title = Some(title.to_string());
        TaskPoint::new(id, vec![0.1, 0.2], TaskPayload::project(&task))
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let index = MemoryIndex::new(2);
        index.upsert(point(1, "a")).await.unwrap();
        index.upsert(point(1, "a")).await.unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1), Some(point(1, "a")));

        index.upsert(point(1, "b")).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1).unwrap().payload.title.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let index = MemoryIndex::new(2);
        index.delete(99).await.unwrap();
        assert!(index.is_empty());
        assert_eq!(index.writes(), 0);

        index.upsert(point(5, "x")).await.unwrap();
        index.delete(5).await.unwrap();
        index.delete(5).await.unwrap();
        assert!(index.is_empty());
        assert_eq!(index.writes(), 2);
    }

    #[tokio::test]
    async fn test_rejects_wrong_dimension() {
        let index = MemoryIndex::new(3);
        let result = index.upsert(point(1, "a")).await;
        assert!(matches!(
            result,
            Err(VectorError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_collection() {
        let index = MemoryIndex::new(2);
        assert!(!index.is_created());
        index.ensure_collection().await.unwrap();
        index.ensure_collection().await.unwrap();
        assert!(index.is_created());
    }
}
