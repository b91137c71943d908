/// Snapshot reporting endpoint
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::store::MetricStore;

/// Build the router serving the current snapshot on every path.
pub fn build_router(store: Arc<MetricStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(snapshot_handler))
        .fallback(snapshot_handler)
        .layer(cors)
        .with_state(store)
}

async fn snapshot_handler(State(store): State<Arc<MetricStore>>) -> Response {
    // The lock is released before serialization starts
    match store.snapshot() {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            error!("Failed to read metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Serve snapshots until the task is dropped or the listener fails.
pub async fn serve(addr: SocketAddr, store: Arc<MetricStore>) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server started at http://{}", addr);
    axum::serve(listener, build_router(store)).await
}
