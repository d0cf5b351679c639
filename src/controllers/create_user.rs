use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use secrecy::Secret;
use serde_json::json;
use tracing::info;

use crate::domain::entities::user::{User, UserResponseData};
use crate::helper::error_chain_fmt;
use crate::ports::user_repository::{UserRepository, UserRepositoryError};

#[derive(Debug, serde::Deserialize)]
pub struct CreateUserBodyData {
    pub name: String,
    pub surname: String,
    pub password: String,
    /// A user can be created before any picture was ingested for them
    #[serde(default)]
    pub pic_id: String,
}

#[tracing::instrument(name = "Create user handler", skip(user_repository, body))]
pub async fn create_user(
    user_repository: web::Data<dyn UserRepository>,
    body: web::Json<CreateUserBodyData>,
) -> Result<HttpResponse, CreateUserError> {
    let body = body.into_inner();
    let user = User::create(
        body.name,
        body.surname,
        Secret::new(body.password),
        body.pic_id,
    );

    user_repository.create(&user).await?;

    info!(user_id = %user.id, "Successfully created user");
    Ok(HttpResponse::Created().json(UserResponseData::from(user)))
}

#[derive(thiserror::Error)]
pub enum CreateUserError {
    #[error("failed to create user")]
    RepositoryError(#[from] UserRepositoryError),
}

impl std::fmt::Debug for CreateUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreateUserError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreateUserError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from create_user controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
