//! Login endpoint.
//!
//! Login does not require a completed OTP verification: an unverified
//! account with a matching password still receives a token.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

use crate::api::error::ApiError;

use super::password::verify_password;
use super::state::AuthState;
use super::storage::find_by_email;
use super::types::{LoginRequest, MessageResponse, TokenResponse};
use super::utils::normalize_email;

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, bearer token issued", body = TokenResponse),
        (status = 401, description = "Password does not match", body = MessageResponse),
        (status = 404, description = "No account with that email", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::BadRequest("Missing payload".to_string())),
    };

    let email = normalize_email(&request.email);

    let Some(account) = find_by_email(&pool, &email).await? else {
        return Err(ApiError::NotFound);
    };

    if !verify_password(request.password, account.password_hash).await? {
        return Err(ApiError::Unauthorized);
    }

    let token = auth_state
        .tokens()
        .issue(account.id)
        .map_err(|err| ApiError::Dependency(err.into()))?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            msg: "Login successful".to_string(),
            token,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use crate::api::handlers::auth::state::AuthConfig;
    use crate::api::token::TokenIssuer;
    use anyhow::Result;
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new(),
            TokenIssuer::new(SecretString::from("test-secret".to_string())),
            Arc::new(LogEmailSender),
        ))
    }

    #[tokio::test]
    async fn login_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = login(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
