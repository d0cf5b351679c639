use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{
        self, vectors_config::Config, CreateCollection, Distance, PointStruct, VectorParams,
        VectorsConfig,
    },
};
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::embedding::Embedding;
use crate::ports::vector_repository::{
    validate_vector_insert, VectorRepository, VectorRepositoryError,
};

/// Face embeddings persisted in Qdrant, keyed by a caller-supplied object id.
///
/// Qdrant point ids must be integers or UUIDs, so the object id is mapped
/// to a deterministic v5 UUID and kept verbatim in the point payload.
pub struct EmbeddingQdrantRepository {
    client: QdrantClient,
    collection_name: String,
}

impl EmbeddingQdrantRepository {
    /// Provisions the collection if it does not exist yet.
    #[tracing::instrument(
        name = "Initializing Qdrant and the associated collection",
        skip(client)
    )]
    pub async fn try_new(
        client: QdrantClient,
        collection_name: &str,
        collection_distance: &str,
        collection_vector_size: u64,
    ) -> Result<Self, VectorRepositoryError> {
        let collection_distance =
            Distance::from_str_name(collection_distance).ok_or_else(|| {
                VectorRepositoryError::Backend(format!(
                    "invalid Qdrant distance in configuration: {}",
                    collection_distance
                ))
            })?;

        // Collection creation is not idempotent: tolerate "already exists"
        match client
            .create_collection(&CreateCollection {
                collection_name: collection_name.to_string(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: collection_vector_size,
                        distance: collection_distance as i32,
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
        {
            Ok(_) => info!("Created collection {}", collection_name),
            Err(error) => {
                // The Qdrant client only returns anyhow errors for now
                if !error.to_string().contains("already exists") {
                    return Err(VectorRepositoryError::Backend(error.to_string()));
                }
            }
        };

        Ok(Self {
            client,
            collection_name: collection_name.to_string(),
        })
    }
}

#[async_trait]
impl VectorRepository for EmbeddingQdrantRepository {
    #[tracing::instrument(name = "Saving embedding to Qdrant", skip(self, embedding))]
    async fn store_vector(
        &self,
        object_id: &str,
        embedding: Embedding,
    ) -> Result<(), VectorRepositoryError> {
        validate_vector_insert(object_id, &embedding)?;

        let payload = HashMap::from([("object_id".to_string(), qdrant::Value::from(object_id.to_string()))]);
        let point = PointStruct {
            id: Some(point_id_for(object_id).into()),
            vectors: Some(embedding.into_inner().into()),
            payload,
        };

        self.client
            .upsert_points(&self.collection_name, vec![point], None)
            .await
            .map_err(|e| VectorRepositoryError::Backend(e.to_string()))?;

        info!(object_id, "Saved embedding");
        Ok(())
    }
}

/// Deterministic UUID for a given object id, so re-ingesting the same
/// object overwrites its previous embedding instead of duplicating it.
fn point_id_for(object_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, object_id.as_bytes()).to_string()
}
