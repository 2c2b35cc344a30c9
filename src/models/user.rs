use serde::{Deserialize, Serialize};

use super::validation::ValidationError;
use crate::types::Role;

/// Shortest password accepted at registration or password change
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Public view of an account, never carries credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

/// Returned by login and register; this is what a client keeps as its session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn new(profile: Profile, token: String) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
            token,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

impl RegisterRequest {
    /// Trims and lower-cases the email, then checks every field
    pub fn normalized(mut self, min_password_length: usize) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();

        self.email = self.email.trim().to_ascii_lowercase();
        if !looks_like_email(&self.email) {
            errors.push("email", "Please provide a valid email");
        }
        if self.password.chars().count() < min_password_length {
            errors.push("password", format!("Password must be at least {} characters", min_password_length));
        }
        self.full_name = self.full_name.trim().to_string();
        if self.full_name.is_empty() {
            errors.push("full_name", "Please provide a full name");
        }

        errors.into_result(self)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }
}

/// Profile changes. Email and password are not updatable here and are
/// dropped if a client sends them; `role` only sticks when an admin asks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut Profile, actor_is_admin: bool) -> Result<(), ValidationError> {
        if let Some(name) = &self.full_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::field("full_name", "Please provide a full name"));
            }
            profile.full_name = name.to_string();
        }
        if let Some(role) = self.role {
            if actor_is_admin {
                profile.role = role;
            } else {
                tracing::debug!("ignoring role change requested by non-admin for user {}", profile.id);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self, min_password_length: usize) -> Result<(), ValidationError> {
        if self.new_password.chars().count() < min_password_length {
            return Err(ValidationError::field(
                "newPassword",
                format!("Password must be at least {} characters", min_password_length),
            ));
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
