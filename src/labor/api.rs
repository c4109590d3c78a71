use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::attendance::{list_attendance, record_attendance, AttendanceInput, AttendanceQuery};
use super::payments::{list_payments, record_payment, PaymentInput, PaymentQuery};
use super::{
    create_laborer, delete_laborer, get_laborer, list_laborers, toggle_laborer_status,
    update_laborer, LaborerInput, LaborerQuery,
};
use crate::core::action::{run_blocking, ActionJson, ActionPath, ActionQuery, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::models::{Attendance, Laborer, Payment};
use crate::core::shared::state::AppState;

pub async fn handle_create_laborer(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<LaborerInput>,
) -> ActionResult<Laborer> {
    run_blocking("create_laborer", move || {
        create_laborer(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_laborers(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<LaborerQuery>,
) -> ActionResult<Vec<Laborer>> {
    run_blocking("list_laborers", move || {
        list_laborers(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_get_laborer(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Laborer> {
    run_blocking("get_laborer", move || get_laborer(&state, principal.as_ref(), id)).await
}

pub async fn handle_update_laborer(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<LaborerInput>,
) -> ActionResult<Laborer> {
    run_blocking("update_laborer", move || {
        update_laborer(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_toggle_laborer(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Laborer> {
    run_blocking("toggle_laborer_status", move || {
        toggle_laborer_status(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_delete_laborer(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Uuid> {
    run_blocking("delete_laborer", move || {
        delete_laborer(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_record_attendance(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<AttendanceInput>,
) -> ActionResult<Attendance> {
    run_blocking("record_attendance", move || {
        record_attendance(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_attendance(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<AttendanceQuery>,
) -> ActionResult<Vec<Attendance>> {
    run_blocking("list_attendance", move || {
        list_attendance(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_record_payment(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<PaymentInput>,
) -> ActionResult<Payment> {
    run_blocking("record_payment", move || {
        record_payment(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_payments(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<PaymentQuery>,
) -> ActionResult<Vec<Payment>> {
    run_blocking("list_payments", move || {
        list_payments(&state, principal.as_ref(), query)
    })
    .await
}

pub fn configure_labor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/laborers",
            get(handle_list_laborers).post(handle_create_laborer),
        )
        .route(
            "/api/laborers/:id",
            get(handle_get_laborer)
                .put(handle_update_laborer)
                .delete(handle_delete_laborer),
        )
        .route("/api/laborers/:id/toggle-status", post(handle_toggle_laborer))
        .route(
            "/api/attendance",
            get(handle_list_attendance).post(handle_record_attendance),
        )
        .route(
            "/api/payments",
            get(handle_list_payments).post(handle_record_payment),
        )
}
