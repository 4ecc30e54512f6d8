//! PostgreSQL task store.
//!
//! Table and schema names come from validated settings and are
//! interpolated into the SQL text; values are always bound.
//!
//! Date columns are read as `EXTRACT(EPOCH ...)` so `date`, `timestamp`
//! and `timestamptz` columns all arrive as UTC epoch seconds.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info};

use tasksync_types::{DatabaseSettings, TaskDate, TaskRecord};

use crate::error::StorageError;
use crate::store::TaskStore;

/// Connection-pooled task store.
///
/// The pool checks connections out per query and replaces broken ones,
/// so a dropped connection costs one failed query rather than the process.
pub struct PgTaskStore {
    pool: PgPool,
    bulk_sql: String,
    user_sql: String,
}

impl PgTaskStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .connect(&settings.url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        info!(
            schema = %settings.schema,
            max_connections = settings.max_connections,
            "Connected to task store"
        );

        Ok(Self {
            pool,
            bulk_sql: bulk_query(settings),
            user_sql: user_query(settings),
        })
    }
}

/// Task table left-joined to the user table twice: `u1` for the assigner,
/// `u2` for the assignee.
pub(crate) fn bulk_query(settings: &DatabaseSettings) -> String {
    let schema = &settings.schema;
    let task = &settings.task_table;
    let user = &settings.user_table;
    format!(
        "SELECT t.id::bigint AS id, \
         t.title::text AS title, \
         t.description::text AS description, \
         t.priority::bigint AS priority, \
         t.status::bigint AS status, \
         t.progress::bigint AS progress, \
         t.to_user_id::bigint AS to_user_id, \
         t.by_user_id::bigint AS by_user_id, \
         EXTRACT(EPOCH FROM t.target_date)::bigint AS target_date_ts, \
         EXTRACT(EPOCH FROM t.updated_at)::bigint AS updated_at_ts, \
         u1.name::text AS assigned_by_name, \
         u2.name::text AS assigned_to_name \
         FROM {schema}.{task} t \
         LEFT JOIN {schema}.{user} u1 ON u1.id = t.by_user_id \
         LEFT JOIN {schema}.{user} u2 ON u2.id = t.to_user_id \
         ORDER BY t.id"
    )
}

pub(crate) fn user_query(settings: &DatabaseSettings) -> String {
    format!(
        "SELECT name::text AS name FROM {}.{} WHERE id = $1",
        settings.schema, settings.user_table
    )
}

fn row_to_task(row: &PgRow) -> Result<TaskRecord, StorageError> {
    let get_err = |e: sqlx::Error| StorageError::InvalidRow(e.to_string());

    Ok(TaskRecord {
        id: row.try_get("id").map_err(get_err)?,
        title: row.try_get("title").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        priority: row.try_get("priority").map_err(get_err)?,
        status: row.try_get("status").map_err(get_err)?,
        progress: row.try_get("progress").map_err(get_err)?,
        to_user_id: row.try_get("to_user_id").map_err(get_err)?,
        by_user_id: row.try_get("by_user_id").map_err(get_err)?,
        target_date: row
            .try_get::<Option<i64>, _>("target_date_ts")
            .map_err(get_err)?
            .map(TaskDate::Seconds),
        updated_at: row
            .try_get::<Option<i64>, _>("updated_at_ts")
            .map_err(get_err)?
            .map(TaskDate::Seconds),
        assigned_to_name: row.try_get("assigned_to_name").map_err(get_err)?,
        assigned_by_name: row.try_get("assigned_by_name").map_err(get_err)?,
    })
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn fetch_all_tasks(&self) -> Result<Vec<TaskRecord>, StorageError> {
        if self.pool.is_closed() {
            return Err(StorageError::Closed);
        }

        let rows = sqlx::query(&self.bulk_sql).fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "Fetched task rows");

        rows.iter().map(row_to_task).collect()
    }

    async fn user_name(&self, id: i64) -> Result<Option<String>, StorageError> {
        if self.pool.is_closed() {
            return Err(StorageError::Closed);
        }

        let row = sqlx::query(&self.user_sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row
                .try_get::<Option<String>, _>("name")
                .map_err(|e| StorageError::InvalidRow(e.to_string()))?),
            None => Ok(None),
        }
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Task store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_query_uses_configured_names() {
        let settings = DatabaseSettings {
            schema: "tenant_a".to_string(),
            ..Default::default()
        };
        let sql = bulk_query(&settings);

        assert!(sql.contains("FROM tenant_a.task t"));
        assert!(sql.contains("LEFT JOIN tenant_a._user u1 ON u1.id = t.by_user_id"));
        assert!(sql.contains("LEFT JOIN tenant_a._user u2 ON u2.id = t.to_user_id"));
        assert!(sql.contains("u1.name::text AS assigned_by_name"));
        assert!(sql.contains("u2.name::text AS assigned_to_name"));
    }

    #[test]
    fn test_user_query() {
        let settings = DatabaseSettings {
            schema: "public".to_string(),
            user_table: "users".to_string(),
            ..Default::default()
        };
        assert_eq!(
            user_query(&settings),
            "SELECT name::text AS name FROM public.users WHERE id = $1"
        );
    }
}
