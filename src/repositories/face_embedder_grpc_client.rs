use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tonic::transport::Channel;

use crate::domain::entities::embedding::Embedding;
use crate::ports::embedder_client::{EmbedderClient, EmbedderClientError};
use crate::proto::face_embedder::{
    face_embedder_client::FaceEmbedderClient, EmbeddingResponse, ImageRequest,
};

/// gRPC implementation of the embedder port.
///
/// Holds the shared lazy channel built at startup; a fresh generated
/// client is derived from it on every call (cloning a tonic channel is
/// cheap, it reuses the same underlying connection).
pub struct GrpcFaceEmbedderClient {
    channel: Channel,
    request_timeout: Duration,
}

impl GrpcFaceEmbedderClient {
    pub fn new(channel: Channel, request_timeout: Duration) -> Self {
        Self {
            channel,
            request_timeout,
        }
    }
}

#[async_trait]
impl EmbedderClient for GrpcFaceEmbedderClient {
    #[tracing::instrument(
        name = "Requesting embedding from the inference service",
        skip(self, image),
        fields(image_size = image.len())
    )]
    async fn get_embedding(&self, image: &[u8]) -> Result<Embedding, EmbedderClientError> {
        let mut client = FaceEmbedderClient::new(self.channel.clone());
        let request = ImageRequest {
            image: image.to_vec(),
        };

        let response = timeout(self.request_timeout, client.get_embedding(request))
            .await
            .map_err(|_| EmbedderClientError::Timeout(self.request_timeout))??;

        embedding_from_response(response.into_inner())
    }
}

/// Maps the wire response to the port outcome: a non-empty in-band
/// `error` field wins over whatever vector was sent along.
fn embedding_from_response(
    response: EmbeddingResponse,
) -> Result<Embedding, EmbedderClientError> {
    if !response.error.is_empty() {
        return Err(EmbedderClientError::Rejected(response.error));
    }

    Ok(Embedding::new(response.embedding))
}
