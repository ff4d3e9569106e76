//! API error taxonomy and its HTTP translation.
//!
//! Every failure is caught at the request boundary and turned into a status
//! code plus a JSON body with a human-readable `msg` field. Dependency
//! failures (database, mail relay) additionally carry the underlying error
//! text. Nothing is retried and nothing crashes the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("User already exists, please login")]
    Conflict,
    #[error("User not found")]
    NotFound,
    #[error("Invalid or expired OTP")]
    InvalidOrExpired,
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid or expired token")]
    Forbidden,
    #[error("Error sending email")]
    Mail(#[source] anyhow::Error),
    #[error("Something went wrong")]
    Dependency(#[source] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Conflict | Self::InvalidOrExpired => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Mail(_) | Self::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Dependency(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Mail(err) | Self::Dependency(err) => {
                error!("{}: {err:#}", self);
                json!({ "msg": self.to_string(), "error": err.to_string() })
            }
            _ => json!({ "msg": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::BadRequest("Missing payload".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidOrExpired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Mail(anyhow!("relay down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Dependency(anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn mail_error_is_distinct_from_dependency() {
        let mail = ApiError::Mail(anyhow!("relay down"));
        let dependency = ApiError::Dependency(anyhow!("db down"));
        assert_eq!(mail.to_string(), "Error sending email");
        assert_eq!(dependency.to_string(), "Something went wrong");
    }

    #[test]
    fn response_status_matches_variant() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = ApiError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
