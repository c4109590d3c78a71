//! Health check

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::warn;

use crate::core::shared::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let store = state.store.clone();
    let db_ok = match tokio::task::spawn_blocking(move || store.ping()).await {
        Ok(ok) => ok,
        Err(e) => {
            warn!("Health probe task failed: {}", e);
            false
        }
    };
    if !db_ok {
        warn!("Health check: database unreachable");
    }

    let status = if db_ok { "healthy" } else { "degraded" };
    let code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "service": "yardserver",
            "version": env!("CARGO_PKG_VERSION"),
            "database": db_ok
        })),
    )
}
