use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::controllers::get_user::UserIdQueryData;
use crate::helper::error_chain_fmt;
use crate::ports::user_repository::{UserRepository, UserRepositoryError};

/// Deleting a non-existent user is a no-op success, like a SQL DELETE
/// matching zero rows.
#[tracing::instrument(name = "Delete user handler", skip(user_repository))]
pub async fn delete_user(
    user_repository: web::Data<dyn UserRepository>,
    query: web::Query<UserIdQueryData>,
) -> Result<HttpResponse, DeleteUserError> {
    let id =
        Uuid::parse_str(&query.id).map_err(|_| DeleteUserError::InvalidId(query.id.clone()))?;

    user_repository.delete_by_id(id).await?;

    info!(user_id = %id, "Deleted user");
    Ok(HttpResponse::Ok().json(json!({ "message": "user deleted" })))
}

#[derive(thiserror::Error)]
pub enum DeleteUserError {
    #[error("invalid user id: {0}")]
    InvalidId(String),
    #[error("failed to delete user")]
    RepositoryError(#[from] UserRepositoryError),
}

impl std::fmt::Debug for DeleteUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for DeleteUserError {
    fn status_code(&self) -> StatusCode {
        match self {
            DeleteUserError::InvalidId(_) => StatusCode::BAD_REQUEST,
            DeleteUserError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from delete_user controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
