use actix_multipart::form::MultipartForm;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::info;

use crate::controllers::embed_image::ImageUploadForm;
use crate::helper::error_chain_fmt;
use crate::ports::embedder_client::{EmbedderClient, EmbedderClientError};
use crate::ports::vector_repository::{VectorRepository, VectorRepositoryError};

#[derive(Debug, serde::Deserialize)]
pub struct CreatePictureQueryData {
    pub object_id: Option<String>,
}

/// Ingestion flow: computes the embedding of the uploaded image and
/// persists it under the `object_id` query parameter.
///
/// Each step short-circuits the rest on failure. There is no
/// compensation if storage fails after a successful embedding call:
/// the error is reported and the embedding is discarded.
#[tracing::instrument(
    name = "Create picture handler",
    skip(embedder_client, vector_repository, form, query)
)]
pub async fn create_picture(
    embedder_client: web::Data<dyn EmbedderClient>,
    vector_repository: web::Data<dyn VectorRepository>,
    query: web::Query<CreatePictureQueryData>,
    form: MultipartForm<ImageUploadForm>,
) -> Result<HttpResponse, CreatePictureError> {
    let image = form.image_data().ok_or(CreatePictureError::MissingImage)?;

    let object_id = query
        .object_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(CreatePictureError::MissingObjectId)?;

    let embedding = embedder_client.get_embedding(image).await?;

    vector_repository.store_vector(object_id, embedding).await?;

    info!(object_id, "Successfully stored embedding");
    Ok(HttpResponse::Ok().json(json!({ "response": "successfully stored" })))
}

#[derive(thiserror::Error)]
pub enum CreatePictureError {
    #[error("image file is required")]
    MissingImage,
    #[error("object_id is not provided")]
    MissingObjectId,
    #[error("{0}")]
    RejectedImage(String),
    #[error(transparent)]
    EmbedderError(EmbedderClientError),
    /// Covers both backend failures and the defensive re-validation in
    /// the repository (the object id was already checked above)
    #[error(transparent)]
    StorageError(#[from] VectorRepositoryError),
}

impl From<EmbedderClientError> for CreatePictureError {
    fn from(error: EmbedderClientError) -> Self {
        match error {
            EmbedderClientError::Rejected(message) => Self::RejectedImage(message),
            other => Self::EmbedderError(other),
        }
    }
}

impl std::fmt::Debug for CreatePictureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreatePictureError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreatePictureError::MissingImage
            | CreatePictureError::MissingObjectId
            | CreatePictureError::RejectedImage(_) => StatusCode::BAD_REQUEST,
            CreatePictureError::EmbedderError(_) | CreatePictureError::StorageError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from create_picture controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
