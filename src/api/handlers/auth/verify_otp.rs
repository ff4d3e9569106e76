//! OTP verification endpoint.
//!
//! A matching, unexpired code clears both OTP fields and issues the first
//! bearer token for the account. The same code can never verify twice.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

use crate::api::error::ApiError;

use super::otp;
use super::state::AuthState;
use super::storage::{clear_otp, find_by_email};
use super::types::{MessageResponse, TokenResponse, VerifyOtpRequest};
use super::utils::normalize_email;

#[utoipa::path(
    post,
    path = "/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified, bearer token issued", body = TokenResponse),
        (status = 400, description = "Invalid or expired OTP", body = MessageResponse),
        (status = 404, description = "No account with that email", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::BadRequest("Missing payload".to_string())),
    };

    let email = normalize_email(&request.email);

    let Some(account) = find_by_email(&pool, &email).await? else {
        return Err(ApiError::NotFound);
    };

    if !otp::is_valid(
        account.otp.as_deref(),
        account.otp_expires_at,
        &request.otp,
        Utc::now(),
    ) {
        return Err(ApiError::InvalidOrExpired);
    }

    clear_otp(&pool, account.id).await?;

    let token = auth_state
        .tokens()
        .issue(account.id)
        .map_err(|err| ApiError::Dependency(err.into()))?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            msg: "OTP verified successfully".to_string(),
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
    async fn verify_otp_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = verify_otp(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
