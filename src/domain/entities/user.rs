use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::Serialize;
use uuid::Uuid;

/// A user record associated with a stored face picture.
///
/// `password` is wrapped in a `Secret` to avoid leaks in logs; it is
/// never serialized into HTTP responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub password: Secret<String>,
    /// Id of the picture whose embedding was stored for this user
    pub picture_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Assembles a new user, generating its id server-side.
    pub fn create(name: String, surname: String, password: Secret<String>, picture_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            surname,
            password,
            picture_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outbound representation of a user, without its credential.
#[derive(Debug, Serialize)]
pub struct UserResponseData {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub pic_id: String,
}

impl From<User> for UserResponseData {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            surname: user.surname,
            pic_id: user.picture_id,
        }
    }
}
