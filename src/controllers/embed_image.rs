use actix_multipart::form::{bytes::Bytes, MultipartForm};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::info;

use crate::helper::error_chain_fmt;
use crate::ports::embedder_client::{EmbedderClient, EmbedderClientError};

/// Multipart upload carrying the image to embed.
///
/// The field is optional so that its absence maps to our own
/// `MissingImage` error instead of the extractor's generic 400.
#[derive(Debug, MultipartForm)]
pub struct ImageUploadForm {
    #[multipart(rename = "image")]
    pub image: Option<Bytes>,
}

impl ImageUploadForm {
    /// An absent or empty field is treated the same: no usable image.
    pub fn image_data(&self) -> Option<&[u8]> {
        self.image
            .as_ref()
            .map(|field| field.data.as_ref())
            .filter(|data: &&[u8]| !data.is_empty())
    }
}

/// Computes the embedding of the uploaded image and returns it to the
/// caller, without persisting anything.
#[tracing::instrument(name = "Embed image handler", skip(embedder_client, form))]
pub async fn embed_image(
    embedder_client: web::Data<dyn EmbedderClient>,
    form: MultipartForm<ImageUploadForm>,
) -> Result<HttpResponse, EmbedImageError> {
    let image = form.image_data().ok_or(EmbedImageError::MissingImage)?;

    let embedding = embedder_client.get_embedding(image).await?;

    info!(embedding_length = embedding.len(), "Computed embedding");
    Ok(HttpResponse::Ok().json(json!({
        "embedding_length": embedding.len(),
        "embedding": embedding,
    })))
}

#[derive(thiserror::Error)]
pub enum EmbedImageError {
    #[error("image file is required")]
    MissingImage,
    /// The inference service judged the image unusable: a client-input
    /// problem, surfaced with the remote message untouched
    #[error("{0}")]
    RejectedImage(String),
    #[error(transparent)]
    EmbedderError(EmbedderClientError),
}

impl From<EmbedderClientError> for EmbedImageError {
    fn from(error: EmbedderClientError) -> Self {
        match error {
            EmbedderClientError::Rejected(message) => Self::RejectedImage(message),
            other => Self::EmbedderError(other),
        }
    }
}

impl std::fmt::Debug for EmbedImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for EmbedImageError {
    fn status_code(&self) -> StatusCode {
        match self {
            EmbedImageError::MissingImage | EmbedImageError::RejectedImage(_) => {
                StatusCode::BAD_REQUEST
            }
            EmbedImageError::EmbedderError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from embed_image controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
