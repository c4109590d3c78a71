//! Combines the route tables of every module into one router.

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::middleware::current_user_handler;
use crate::core::shared::state::AppState;

/// All `/api` routes, still waiting for their state.
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(current_user_handler))
        .merge(crate::users::api::configure_users_routes())
        .merge(crate::project::api::configure_project_routes())
        .merge(crate::inventory::api::configure_inventory_routes())
        .merge(crate::labor::api::configure_labor_routes())
        .merge(crate::requests::api::configure_requests_routes())
        .merge(crate::finance::api::configure_finance_routes())
        .merge(crate::reports::api::configure_reports_routes())
        .merge(crate::dashboard::api::configure_dashboard_routes())
}
