//! Bazaar marketplace API server.
//!
//! This crate provides the server as a library so the binary, the CLI and the
//! integration tests share one router and one set of repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router with its middleware stack.
///
/// See [`middleware`] for the layer order.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_origin.as_deref());

    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    login_name = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS for the browser frontend. Without a configured origin no
/// cross-origin requests are allowed.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => base.allow_origin(AllowOrigin::exact(value)),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Ignoring invalid CORS origin");
            base
        }
        None => base,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use bazaar_core::{LoginName, Role};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{DatabaseConfig, ServerConfig};
    use crate::db::RolePools;

    fn test_state() -> AppState {
        let url = "postgres://bazaar@localhost/bazaar_unused";
        let config = ServerConfig {
            database: DatabaseConfig {
                url: SecretString::from(url),
                buyer_url: None,
                seller_url: None,
                admin_url: None,
            },
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            jwt_secret: SecretString::from("k9$Vq2!mZr7#Lp4@Xw8&Tn1^Hs6*Bd3%"),
            token_ttl_hours: 1,
            cors_origin: Some("http://localhost:5173".to_string()),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new().connect_lazy(url).unwrap();
        AppState::new(config, RolePools::shared(pool))
    }

    fn bearer(state: &AppState, name: &str, role: Role) -> String {
        let token = state
            .tokens()
            .issue(&LoginName::parse(name).unwrap(), role)
            .unwrap();
        format!("Bearer {token}")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_echoes_request_id() {
        let response = app(test_state())
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "probe-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "probe-1");
    }

    #[tokio::test]
    async fn test_cart_requires_token() {
        let response = app(test_state())
            .oneshot(Request::get("/buyers/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_buyer_token_rejected_on_seller_routes() {
        let state = test_state();
        let auth = bearer(&state, "alice", Role::Buyer);

        let response = app(state)
            .oneshot(
                Request::get("/seller/earnings")
                    .header("authorization", auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_users_rejects_unknown_role_filter() {
        let state = test_state();
        let auth = bearer(&state, "root", Role::Admin);

        let response = app(state)
            .oneshot(
                Request::get("/admin/users?role=wizard")
                    .header("authorization", auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_malformed_cart_body_is_invalid_argument() {
        let state = test_state();
        let auth = bearer(&state, "alice", Role::Buyer);

        let response = app(state)
            .oneshot(
                Request::post("/buyers/cart")
                    .header("authorization", auth)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"productId":"seven"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_cors_layer_tolerates_bad_origin() {
        let _ = cors_layer(Some("not a header\n"));
        let _ = cors_layer(None);
    }
}
