use axum::{extract::State, routing::get, Router};
use std::sync::Arc;

use super::{list_daily_reports, submit_daily_report, DailyReportInput, ReportQuery};
use crate::core::action::{run_blocking, ActionJson, ActionQuery, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::models::DailyReport;
use crate::core::shared::state::AppState;

pub async fn handle_submit_daily_report(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<DailyReportInput>,
) -> ActionResult<DailyReport> {
    run_blocking("submit_daily_report", move || {
        submit_daily_report(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_daily_reports(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<ReportQuery>,
) -> ActionResult<Vec<DailyReport>> {
    run_blocking("list_daily_reports", move || {
        list_daily_reports(&state, principal.as_ref(), query)
    })
    .await
}

pub fn configure_reports_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/daily-reports",
        get(handle_list_daily_reports).post(handle_submit_daily_report),
    )
}
