use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::user::UserResponseData;
use crate::helper::error_chain_fmt;
use crate::ports::user_repository::{UserRepository, UserRepositoryError};

#[derive(Debug, serde::Deserialize)]
pub struct UserIdQueryData {
    pub id: String,
}

#[tracing::instrument(name = "Get user handler", skip(user_repository))]
pub async fn get_user(
    user_repository: web::Data<dyn UserRepository>,
    query: web::Query<UserIdQueryData>,
) -> Result<HttpResponse, GetUserError> {
    let id = Uuid::parse_str(&query.id).map_err(|_| GetUserError::InvalidId(query.id.clone()))?;

    let user = user_repository
        .get_by_id(id)
        .await?
        .ok_or(GetUserError::UserNotFound)?;

    Ok(HttpResponse::Ok().json(UserResponseData::from(user)))
}

#[derive(thiserror::Error)]
pub enum GetUserError {
    #[error("invalid user id: {0}")]
    InvalidId(String),
    #[error("user not found")]
    UserNotFound,
    #[error("failed to fetch user")]
    RepositoryError(#[from] UserRepositoryError),
}

impl std::fmt::Debug for GetUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GetUserError {
    fn status_code(&self) -> StatusCode {
        match self {
            GetUserError::InvalidId(_) => StatusCode::BAD_REQUEST,
            GetUserError::UserNotFound => StatusCode::NOT_FOUND,
            GetUserError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from get_user controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
