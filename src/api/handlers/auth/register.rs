//! Registration endpoint.
//!
//! Flow Overview:
//! 1) Validate the payload and normalize the email.
//! 2) Hash the password and generate a one-hour OTP.
//! 3) Insert the account; a duplicate email is a conflict.
//! 4) Email the OTP. A relay failure is reported as a mail error while the
//!    account stays persisted.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::api::email::otp_email;
use crate::api::error::ApiError;

use super::otp;
use super::password::hash_password;
use super::state::AuthState;
use super::storage::{insert_account, SignupOutcome};
use super::types::{MessageResponse, RegisterRequest};
use super::utils::{normalize_email, valid_email};

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, OTP sent to email", body = MessageResponse),
        (status = 400, description = "Invalid payload or email already registered", body = MessageResponse),
        (status = 500, description = "Database or mail relay failure", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::BadRequest("Missing payload".to_string())),
    };

    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing name".to_string()));
    }
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email".to_string()));
    }
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Missing password".to_string()));
    }

    let config = auth_state.config();
    let password_hash = hash_password(request.password, config.bcrypt_cost()).await?;
    let otp = otp::generate(config.otp_ttl_seconds());

    match insert_account(&pool, request.name.trim(), &email, &password_hash, &otp).await? {
        SignupOutcome::Created(account_id) => {
            debug!(%account_id, "account created");
        }
        SignupOutcome::Conflict => return Err(ApiError::Conflict),
    }

    // No rollback when the relay fails: the account stays persisted and the
    // caller sees a mail-specific error.
    auth_state
        .mailer()
        .send(&otp_email(&email, &otp.code))
        .await
        .map_err(ApiError::Mail)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: "New user has been registered, OTP sent to email".to_string(),
        }),
    ))
}
