use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut dependencies = serde_json::Map::new();

    let store_health = check_score_store(&state).await;
    let healthy = store_health.get("status").and_then(|v| v.as_str()) == Some("healthy");
    dependencies.insert("score_store".to_string(), json!(store_health));

    let (status_code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "riddle-me-this",
            "version": env!("CARGO_PKG_VERSION"),
            "active_sessions": state.sessions.active_count().await,
            "dependencies": dependencies
        })),
    )
}

async fn check_score_store(state: &Arc<AppState>) -> serde_json::Map<String, serde_json::Value> {
    let mut result = serde_json::Map::new();

    let store = Arc::clone(state);
    let readable = tokio::task::spawn_blocking(move || store.scores.try_top(0).map(|_| ()))
        .await
        .map_err(|e| e.to_string())
        .and_then(|read| read.map_err(|e| e.to_string()));

    match readable {
        Ok(()) => {
            result.insert("status".to_string(), json!("healthy"));
            result.insert(
                "path".to_string(),
                json!(state.scores.path().display().to_string()),
            );
        }
        Err(e) => {
            result.insert("status".to_string(), json!("unhealthy"));
            result.insert("error".to_string(), json!(e));
        }
    }

    result
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

pub mod game;
pub mod views;
