use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::auth::{decode_jwt, Actor};
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::types::Role;

/// Authenticated user context, loaded fresh from the database for every
/// request so role changes take effect without re-issuing tokens
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::debug!("rejecting {}: {}", request.uri().path(), msg);
        ApiError::unauthorized("Not authorized, no token")
    })?;

    let claims = decode_jwt(&token).map_err(|e| {
        tracing::warn!("rejected bearer token: {}", e);
        ApiError::unauthorized("Not authorized, token failed")
    })?;

    let user = UserRepository::new(state.pool.clone())
        .find_by_id(claims.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("token for unknown user {}", claims.id);
            ApiError::unauthorized("Not authorized, user not found")
        })?;

    let auth_user = AuthUser {
        id: user.id,
        role: user.role()?,
        email: user.email,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
pub fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
