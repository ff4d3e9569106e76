//! Token-gated account management endpoints.
//!
//! Flow Overview:
//! 1) Resolve the bearer token into a principal.
//! 2) Perform the read or write against the account store.
//! 3) Respond without ever exposing password or OTP fields.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{debug, instrument, Instrument};
use uuid::Uuid;

use crate::api::error::ApiError;

use super::auth::principal::require_auth;
use super::auth::types::{AccountResponse, MessageResponse, UpdateAccountRequest};
use super::auth::utils::{is_unique_violation, normalize_email, valid_email};
use super::auth::AuthState;

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All accounts, password and OTP fields omitted", body = [AccountResponse]),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired bearer token"),
    ),
    security(("bearer_token" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn list_users(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &auth_state)?;
    debug!(account_id = %principal.account_id, "listing accounts");

    let accounts = fetch_accounts(&pool).await?;
    Ok((StatusCode::OK, Json(accounts)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "Account id")
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Invalid id or payload"),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired bearer token"),
        (status = 404, description = "No account with that id"),
    ),
    security(("bearer_token" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_user(
    headers: HeaderMap,
    Path(id): Path<String>,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdateAccountRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&headers, &auth_state)?;

    let account_id = parse_account_id(&id)?;

    let request: UpdateAccountRequest = match payload {
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

    match update_account(&pool, account_id, request.name.trim(), &email).await? {
        UpdateOutcome::Updated(account) => Ok((StatusCode::OK, Json(account))),
        UpdateOutcome::NotFound => Err(ApiError::NotFound),
        UpdateOutcome::Conflict => Err(ApiError::Conflict),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account removed", body = MessageResponse),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Invalid or expired bearer token"),
        (status = 404, description = "No account with that id"),
    ),
    security(("bearer_token" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn delete_user(
    headers: HeaderMap,
    Path(id): Path<String>,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&headers, &auth_state)?;

    let account_id = parse_account_id(&id)?;

    if delete_account(&pool, account_id).await? {
        Ok((
            StatusCode::OK,
            Json(MessageResponse {
                msg: "User deleted successfully".to_string(),
            }),
        ))
    } else {
        Err(ApiError::NotFound)
    }
}

fn parse_account_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id.trim()).map_err(|_| ApiError::BadRequest("Invalid account id".to_string()))
}

enum UpdateOutcome {
    Updated(AccountResponse),
    NotFound,
    Conflict,
}

async fn fetch_accounts(pool: &PgPool) -> Result<Vec<AccountResponse>> {
    let query = r"
        SELECT id, name, email, is_active
        FROM users
        ORDER BY created_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list accounts")?;

    Ok(rows
        .into_iter()
        .map(|row| AccountResponse {
            id: row.get::<Uuid, _>("id").to_string(),
            name: row.get("name"),
            email: row.get("email"),
            is_active: row.get("is_active"),
        })
        .collect())
}

async fn update_account(
    pool: &PgPool,
    account_id: Uuid,
    name: &str,
    email: &str,
) -> Result<UpdateOutcome> {
    let query = r"
        UPDATE users
        SET name = $2,
            email = $3
        WHERE id = $1
        RETURNING id, name, email, is_active
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account_id)
        .bind(name)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await;

    match row {
        Ok(Some(row)) => Ok(UpdateOutcome::Updated(AccountResponse {
            id: row.get::<Uuid, _>("id").to_string(),
            name: row.get("name"),
            email: row.get("email"),
            is_active: row.get("is_active"),
        })),
        Ok(None) => Ok(UpdateOutcome::NotFound),
        Err(err) if is_unique_violation(&err) => Ok(UpdateOutcome::Conflict),
        Err(err) => Err(err).context("failed to update account"),
    }
}

async fn delete_account(pool: &PgPool, account_id: Uuid) -> Result<bool> {
    let query = r"
        DELETE FROM users
        WHERE id = $1
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to delete account")?;

    Ok(row.is_some())
}
