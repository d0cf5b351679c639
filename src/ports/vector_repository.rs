use async_trait::async_trait;

use crate::domain::entities::embedding::Embedding;
use crate::helper::error_chain_fmt;

/// Port to the vector-search store holding the face embeddings,
/// keyed by a caller-supplied object id.
#[async_trait]
pub trait VectorRepository: Send + Sync {
    async fn store_vector(
        &self,
        object_id: &str,
        embedding: Embedding,
    ) -> Result<(), VectorRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum VectorRepositoryError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("error from the vector store: {0}")]
    Backend(String),
}

impl std::fmt::Debug for VectorRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Invariant check run before any I/O: an embedding is only ever
/// persisted when paired with a non-empty object id, and must itself
/// be non-empty.
pub fn validate_vector_insert(
    object_id: &str,
    embedding: &Embedding,
) -> Result<(), VectorRepositoryError> {
    if object_id.is_empty() {
        return Err(VectorRepositoryError::Validation(
            "object_id is empty".into(),
        ));
    }
    if embedding.is_empty() {
        return Err(VectorRepositoryError::Validation(
            "embedding vector is empty".into(),
        ));
    }
    Ok(())
}
