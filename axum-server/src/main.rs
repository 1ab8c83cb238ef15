use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Method, Response};
use axum::{routing::{any, get}, Extension, Json, Router};
use pump_core::{handle_friends_feed, handle_get_workout, Config, Database, PostgrestClient};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

type SharedDb = Arc<dyn Database>;

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let db: SharedDb = Arc::new(PostgrestClient::new(&config));

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(db)).await?;

    Ok(())
}

fn app(db: SharedDb) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // `any` so that wrong methods reach the handlers and get their 405 body
    Router::new()
        .route("/health", get(health))
        .route("/friends-feed", any(friends_feed))
        .route("/get-workout", any(get_workout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(db))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn friends_feed(
    Extension(db): Extension<SharedDb>,
    method: Method,
    body: Bytes,
) -> Response<String> {
    handle_friends_feed(db.as_ref(), &method, &body).await
}

async fn get_workout(
    Extension(db): Extension<SharedDb>,
    method: Method,
    body: Bytes,
) -> Response<String> {
    handle_get_workout(db.as_ref(), &method, &body).await
}
