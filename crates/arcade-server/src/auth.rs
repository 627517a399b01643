use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Hex sha256 digest, the form the config stores the admin password in.
pub fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a submitted password against the configured digest. A server
/// with no digest configured rejects every login.
pub fn password_matches(state: &AppState, password: &str) -> bool {
    match &state.config.auth.admin_password_sha256 {
        Some(expected) => digest(password) == *expected,
        None => false,
    }
}

/// Mint a session token and remember it until logout.
pub async fn open_session(state: &AppState) -> String {
    let token = Uuid::new_v4().to_string();
    state.sessions.write().await.insert(token.clone());
    token
}

pub async fn close_session(state: &AppState, headers: &HeaderMap) {
    if let Some(token) = bearer_token(headers) {
        state.sessions.write().await.remove(token);
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub async fn is_admin(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(token) = bearer_token(headers) else {
        return false;
    };
    state.sessions.read().await.contains(token)
}

pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    if is_admin(state, headers).await {
        Ok(())
    } else {
        Err(AppError::Forbidden("Unauthorized".to_string()))
    }
}
