use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::labor::{
    create_labor_request, get_labor_request, list_labor_requests, review_labor_request,
    LaborRequestInput,
};
use super::material::{
    create_material_request, get_material_request, list_material_requests,
    review_material_request, MaterialRequestInput,
};
use super::{RequestQuery, ReviewInput};
use crate::core::action::{run_blocking, ActionJson, ActionPath, ActionQuery, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::models::{LaborRequest, MaterialRequestDetail};
use crate::core::shared::state::AppState;

pub async fn handle_create_material_request(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<MaterialRequestInput>,
) -> ActionResult<MaterialRequestDetail> {
    run_blocking("create_material_request", move || {
        create_material_request(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_material_requests(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<RequestQuery>,
) -> ActionResult<Vec<MaterialRequestDetail>> {
    run_blocking("list_material_requests", move || {
        list_material_requests(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_get_material_request(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<MaterialRequestDetail> {
    run_blocking("get_material_request", move || {
        get_material_request(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_review_material_request(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<ReviewInput>,
) -> ActionResult<MaterialRequestDetail> {
    run_blocking("review_material_request", move || {
        review_material_request(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_create_labor_request(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<LaborRequestInput>,
) -> ActionResult<LaborRequest> {
    run_blocking("create_labor_request", move || {
        create_labor_request(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_labor_requests(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<RequestQuery>,
) -> ActionResult<Vec<LaborRequest>> {
    run_blocking("list_labor_requests", move || {
        list_labor_requests(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_get_labor_request(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<LaborRequest> {
    run_blocking("get_labor_request", move || {
        get_labor_request(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_review_labor_request(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<ReviewInput>,
) -> ActionResult<LaborRequest> {
    run_blocking("review_labor_request", move || {
        review_labor_request(&state, principal.as_ref(), id, input)
    })
    .await
}

pub fn configure_requests_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/material-requests",
            get(handle_list_material_requests).post(handle_create_material_request),
        )
        .route("/api/material-requests/:id", get(handle_get_material_request))
        .route(
            "/api/material-requests/:id/review",
            post(handle_review_material_request),
        )
        .route(
            "/api/labor-requests",
            get(handle_list_labor_requests).post(handle_create_labor_request),
        )
        .route("/api/labor-requests/:id", get(handle_get_labor_request))
        .route(
            "/api/labor-requests/:id/review",
            post(handle_review_labor_request),
        )
}
