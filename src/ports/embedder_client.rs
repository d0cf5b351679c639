use async_trait::async_trait;

use crate::domain::entities::embedding::Embedding;
use crate::helper::error_chain_fmt;

/// Port to the remote face-embedding inference service.
///
/// A `Rejected` outcome is the remote service's in-band judgment that the
/// image is unusable (no face, several faces, ...): the transport exchange
/// itself succeeded. It must stay distinguishable from `Timeout` and
/// `Transport`, which are transport failures.
#[async_trait]
pub trait EmbedderClient: Send + Sync {
    async fn get_embedding(&self, image: &[u8]) -> Result<Embedding, EmbedderClientError>;
}

#[derive(thiserror::Error)]
pub enum EmbedderClientError {
    /// Application-level rejection carried inside a successful response
    #[error("{0}")]
    Rejected(String),
    #[error("embedding call exceeded its {} second deadline", .0.as_secs())]
    Timeout(std::time::Duration),
    #[error("transport error from the embedding service: {0}")]
    Transport(#[from] tonic::Status),
}

impl std::fmt::Debug for EmbedderClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
