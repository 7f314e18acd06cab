use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint. Does not touch the data provider.
async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "breakout-scanner",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
