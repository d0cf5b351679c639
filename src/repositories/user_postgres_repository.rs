use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::ports::user_repository::{UserRepository, UserRepositoryError};

/// User repository implemented using Postgres
pub struct UserPostgresRepository {
    pool: PgPool,
}

impl UserPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    surname: String,
    password: String,
    picture_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            surname: row.surname,
            password: Secret::new(row.password),
            picture_id: row.picture_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for UserPostgresRepository {
    #[tracing::instrument(name = "Saving new user in database", skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO users (id, name, surname, password, picture_id, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.password.expose_secret())
        .bind(&user.picture_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Fetching user from database", skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
    SELECT id, name, surname, password, picture_id, created_at, updated_at
    FROM users
    WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(name = "Deleting user from database", skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> Result<(), UserRepositoryError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
