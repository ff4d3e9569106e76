//! Database helpers for the account lifecycle.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::otp::OneTimePassword;
use super::utils::is_unique_violation;

/// Outcome when attempting to create a new account.
#[derive(Debug)]
pub(crate) enum SignupOutcome {
    Created(Uuid),
    Conflict,
}

/// Full account row as stored; never serialized to clients.
pub(crate) struct AccountRecord {
    pub(crate) id: Uuid,
    pub(crate) password_hash: String,
    pub(crate) otp: Option<String>,
    pub(crate) otp_expires_at: Option<DateTime<Utc>>,
}

/// Insert a new account with its OTP fields populated.
///
/// Email uniqueness is enforced by the store; a losing concurrent insert
/// comes back as `Conflict` instead of an error.
pub(crate) async fn insert_account(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    otp: &OneTimePassword,
) -> Result<SignupOutcome> {
    let query = r"
        INSERT INTO users
            (name, email, password_hash, otp, otp_expires_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(&otp.code)
        .bind(otp.expires_at)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(SignupOutcome::Created(row.get("id"))),
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert account"),
    }
}

/// Look up an account by normalized email.
pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<AccountRecord>> {
    let query = r"
        SELECT id, password_hash, otp, otp_expires_at
        FROM users
        WHERE email = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up account by email")?;

    Ok(row.map(|row| AccountRecord {
        id: row.get("id"),
        password_hash: row.get("password_hash"),
        otp: row.get("otp"),
        otp_expires_at: row.get("otp_expires_at"),
    }))
}

/// Clear both OTP fields after a successful verification.
pub(crate) async fn clear_otp(pool: &PgPool, account_id: Uuid) -> Result<()> {
    let query = r"
        UPDATE users
        SET otp = NULL,
            otp_expires_at = NULL
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to clear OTP fields")?;

    Ok(())
}
