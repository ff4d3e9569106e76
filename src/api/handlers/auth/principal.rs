//! Authenticated principal extraction.
//!
//! Protected handlers call [`require_auth`] first: it reads the bearer
//! token from the `Authorization` header, verifies it, and returns the
//! account id it was issued for. Missing tokens are 401, bad or expired
//! tokens are 403.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::api::error::ApiError;

use super::state::AuthState;

/// Authenticated account context derived from the bearer token.
#[derive(Clone, Copy, Debug)]
pub struct Principal {
    pub account_id: uuid::Uuid,
}

/// Resolve the `Authorization` header into a principal.
///
/// # Errors
/// Returns `MissingToken` when no bearer token is present and `Forbidden`
/// when verification fails.
pub fn require_auth(headers: &HeaderMap, state: &AuthState) -> Result<Principal, ApiError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(ApiError::MissingToken);
    };

    match state.tokens().verify(&token) {
        Ok(account_id) => Ok(Principal { account_id }),
        Err(_) => Err(ApiError::Forbidden),
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
