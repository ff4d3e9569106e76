//! HTTP surface of the account service.
//!
//! The router is built once through [`openapi::api_router`] so the served
//! routes and the generated `OpenAPI` document never drift apart.

use crate::api::handlers::auth::AuthState;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request},
    Extension,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

pub mod email;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod token;

pub use openapi::openapi;

/// Connect to the database, wire the router and serve until ctrl-c.
///
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, dsn: String, state: Arc<AuthState>) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let cors = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        // allow requests from any origin
        .allow_origin(Any);

    let (router, _openapi) = openapi::api_router().split_for_parts();
    let app = router.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors)
            .layer(Extension(state))
            .layer(Extension(pool)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use crate::api::handlers::auth::AuthConfig;
    use crate::api::token::TokenIssuer;
    use axum::http::StatusCode;
    use axum::Router;
    use secrecy::SecretString;
    use tower::util::ServiceExt;

    fn test_app() -> Result<Router> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let state = Arc::new(AuthState::new(
            AuthConfig::new(),
            TokenIssuer::new(SecretString::from("test-secret".to_string())),
            Arc::new(LogEmailSender),
        ));
        let (router, _openapi) = openapi::api_router().split_for_parts();
        Ok(router.layer(Extension(state)).layer(Extension(pool)))
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> Result<()> {
        let app = test_app()?;
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())?;
        let response = app.oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn register_without_body_is_bad_request() -> Result<()> {
        let app = test_app()?;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .body(Body::empty())?;
        let response = app.oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn users_without_token_is_unauthorized() -> Result<()> {
        let app = test_app()?;
        let request = Request::builder().uri("/users").body(Body::empty())?;
        let response = app.oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
