//! Qdrant-backed vector index.

use async_trait::async_trait;
use qdrant_client::qdrant::{
    vectors_config, CollectionInfo, CreateCollectionBuilder, DeletePointsBuilder, Distance,
    PointStruct, PointsIdsList, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info};

use tasksync_types::QdrantSettings;

use crate::error::VectorError;
use crate::index::{check_dimension, TaskPoint, VectorIndex};

/// Task collection stored in Qdrant, cosine distance.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantIndex {
    /// Connect to the gRPC endpoint in `settings`.
    pub fn connect(settings: &QdrantSettings) -> Result<Self, VectorError> {
        let client = Qdrant::from_url(&settings.url)
            .api_key(settings.api_key.clone())
            .build()
            .map_err(|e| VectorError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            collection: settings.collection.clone(),
            dimension: settings.vector_size as usize,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Fail unless an existing collection stores unnamed vectors of `expected` size.
pub(crate) fn check_collection_dimension(
    expected: usize,
    info: &CollectionInfo,
) -> Result<(), VectorError> {
    let config = info
        .config
        .as_ref()
        .and_then(|c| c.params.as_ref())
        .and_then(|p| p.vectors_config.as_ref())
        .and_then(|v| v.config.as_ref());

    match config {
        Some(vectors_config::Config::Params(params)) if params.size as usize == expected => Ok(()),
        Some(vectors_config::Config::Params(params)) => Err(VectorError::DimensionMismatch {
            expected,
            actual: params.size as usize,
        }),
        Some(vectors_config::Config::ParamsMap(_)) => Err(VectorError::Index(
            "collection uses named vectors".to_string(),
        )),
        None => Err(VectorError::Index(
            "collection has no vector configuration".to_string(),
        )),
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_collection(&self) -> Result<(), VectorError> {
        if self.client.collection_exists(&self.collection).await? {
            let info = self
                .client
                .collection_info(&self.collection)
                .await?
                .result
                .ok_or_else(|| VectorError::Index("empty collection info".to_string()))?;
            check_collection_dimension(self.dimension, &info)?;

            debug!(collection = %self.collection, "Collection already exists");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await?;

        info!(
            collection = %self.collection,
            dimension = self.dimension,
            "Created collection"
        );
        Ok(())
    }

    async fn upsert(&self, point: TaskPoint) -> Result<(), VectorError> {
        check_dimension(self.dimension, &point.vector)?;

        let payload = Payload::try_from(serde_json::Value::Object(point.payload.to_json_map()))
            .map_err(|e| VectorError::Serialization(e.to_string()))?;
        let id = point.id;

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(
                    &self.collection,
                    vec![PointStruct::new(id, point.vector, payload)],
                )
                .wait(true),
            )
            .await?;

        debug!(point_id = id, "Upserted point");
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<(), VectorError> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(PointsIdsList {
                        ids: vec![id.into()],
                    })
                    .wait(true),
            )
            .await?;

        debug!(point_id = id, "Deleted point");
        Ok(())
    }
}
