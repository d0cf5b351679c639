use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::helper::error_chain_fmt;

/// Port to the relational store holding the user records.
///
/// A lookup miss is `Ok(None)`, not an error: callers must be able to
/// tell "does not exist" apart from "storage failed".
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), UserRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum UserRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for UserRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
