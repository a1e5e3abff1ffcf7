//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::models::{CategoryKind, SubCategoryKind};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:3030"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://127.0.0.1:3030"),
        ])
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with all routes
pub fn build_router(pool: PgPool, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::tags::router::<CategoryKind>())
        .merge(routes::tags::router::<SubCategoryKind>())
        .merge(routes::drills::router())
        .layer(cors_layer(config.cors_permissive))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { pool }))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// The schema is expected to be in place (see [`crate::db::schema`]).
pub async fn run_server(pool: PgPool, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(pool, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Requests that are rejected before reaching the database; the pool
    // never connects.
    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://drillbook@127.0.0.1:1/unreachable")
            .expect("lazy pool");
        build_router(pool, &ServerConfig::default())
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3030);
        assert!(!config.cors_permissive);
    }

    #[tokio::test]
    async fn drill_id_mismatch_is_400_before_save() {
        let response = app()
            .oneshot(json_request(
                Method::PUT,
                "/drill/id/1",
                serde_json::json!({"id": 2, "name": "Front kick"}),
            ))
            .await
            .unwrap();

        // A save attempt would hit the unreachable pool and answer 500
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn category_id_mismatch_is_400() {
        let response = app()
            .oneshot(json_request(
                Method::PUT,
                "/category/id/1",
                serde_json::json!({"id": 5, "name": "Kicks", "description": "Leg strikes"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_category_name_is_400() {
        let response = app()
            .oneshot(json_request(
                Method::POST,
                "/category",
                serde_json::json!({"name": "", "description": "Leg strikes"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Name cannot be empty.");
    }

    #[tokio::test]
    async fn missing_drill_name_is_400() {
        let response = app()
            .oneshot(json_request(Method::POST, "/drill", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delimiter_in_step_is_400() {
        let response = app()
            .oneshot(json_request(
                Method::PUT,
                "/drill/id/1",
                serde_json::json!({
                    "id": 1,
                    "name": "Front kick",
                    "instructions": [{"description": "Chamber", "steps": ["lift|kick"]}]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["message"],
            "Instructions[0].steps[0] must not contain the '|' character."
        );
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/sub_category")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn non_numeric_id_is_400() {
        let request = Request::builder()
            .uri("/drill/id/abc")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unsupported_verb_is_405() {
        let request = Request::builder()
            .method(Method::PATCH)
            .uri("/category")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    // Integration tests - run with DATABASE_URL set
    // cargo test -p drillbook-server -- --ignored

    mod with_database {
        use super::*;
        use crate::db::{create_pool, schema};

        async fn db_app() -> Router {
            let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
            let pool = create_pool(&url).await.expect("pool creation failed");
            schema::run(&pool).await.expect("schema");
            build_router(pool, &ServerConfig::default())
        }

        fn unique(prefix: &str) -> String {
            format!("{}-{}", prefix, chrono::Utc::now().timestamp_micros())
        }

        fn empty_request(method: Method, uri: &str) -> Request<Body> {
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        }

        #[tokio::test]
        #[ignore = "requires database"]
        async fn duplicate_category_post_is_400() {
            let app = db_app().await;
            let body = serde_json::json!({"name": unique("Grabs"), "description": "Wrist and collar grabs"});

            let created = app
                .clone()
                .oneshot(json_request(Method::POST, "/category", body.clone()))
                .await
                .unwrap();
            assert_eq!(created.status(), StatusCode::CREATED);
            let location = created
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
                .unwrap();
            let id = body_json(created).await["id"].as_i64().unwrap();
            assert_eq!(location, format!("/category/{}", id));

            let repeated = app
                .clone()
                .oneshot(json_request(Method::POST, "/category", body))
                .await
                .unwrap();
            assert_eq!(repeated.status(), StatusCode::BAD_REQUEST);
            let error = body_json(repeated).await;
            assert_eq!(error["error"], "database_insert_error");
            assert_eq!(error["message"], "Name already exists.");

            app.oneshot(empty_request(Method::DELETE, &format!("/category/id/{}", id)))
                .await
                .unwrap();
        }

        #[tokio::test]
        #[ignore = "requires database"]
        async fn drill_instructions_round_trip_through_put() {
            let app = db_app().await;
            let name = unique("Bear hug escape");

            let created = app
                .clone()
                .oneshot(json_request(Method::POST, "/drill", serde_json::json!({"name": name})))
                .await
                .unwrap();
            assert_eq!(created.status(), StatusCode::CREATED);
            let id = body_json(created).await["id"].as_i64().unwrap();

            let instructions = serde_json::json!([
                {"description": "Drop weight", "steps": ["bend knees", "widen stance"], "video_id": null},
                {"description": "Strike groin", "steps": ["hammer fist"], "video_id": "vid-2"},
                {"description": "Turn out", "steps": [], "video_id": null}
            ]);
            let updated = app
                .clone()
                .oneshot(json_request(
                    Method::PUT,
                    &format!("/drill/id/{}", id),
                    serde_json::json!({"id": id, "name": name, "instructions": instructions}),
                ))
                .await
                .unwrap();
            assert_eq!(updated.status(), StatusCode::OK);

            let fetched = app
                .clone()
                .oneshot(empty_request(Method::GET, &format!("/drill/id/{}", id)))
                .await
                .unwrap();
            assert_eq!(fetched.status(), StatusCode::OK);
            assert_eq!(body_json(fetched).await["instructions"], instructions);

            let second = app
                .clone()
                .oneshot(empty_request(Method::GET, &format!("/drill/id/{}/how-to/2", id)))
                .await
                .unwrap();
            assert_eq!(body_json(second).await["video_id"], "vid-2");

            app.oneshot(empty_request(Method::DELETE, &format!("/drill/id/{}", id)))
                .await
                .unwrap();
        }
    }
}
