use axum::{extract::State, routing::get, Router};
use std::sync::Arc;

use super::{overview, Overview};
use crate::core::action::{run_blocking, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::state::AppState;

pub async fn handle_overview(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> ActionResult<Overview> {
    run_blocking("overview", move || overview(&state, principal.as_ref())).await
}

pub fn configure_dashboard_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(handle_overview))
}
