use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::database::DatabaseError;
use crate::models::Profile;
use crate::types::Role;

/// `users` row. Holds the password hash, so it never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Result<Role, DatabaseError> {
        self.role
            .parse()
            .map_err(|e: String| DatabaseError::QueryError(format!("user {}: {}", self.id, e)))
    }

    pub fn to_profile(&self) -> Result<Profile, DatabaseError> {
        Ok(Profile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role()?,
        })
    }
}
