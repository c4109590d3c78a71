use axum::{
    extract::State,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    assign_supervisor, create_supervisor, delete_supervisor, get_supervisor, list_supervisors,
    toggle_supervisor_status, unassign_supervisor, update_supervisor, AssignmentInput,
    AssignmentView, CreateSupervisorInput, SupervisorQuery, SupervisorView, UpdateSupervisorInput,
};
use crate::core::action::{run_blocking, ActionJson, ActionPath, ActionQuery, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::models::{ProjectSupervisor, User};
use crate::core::shared::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    pub supervisor_id: Uuid,
}

pub async fn handle_create_supervisor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<CreateSupervisorInput>,
) -> ActionResult<User> {
    create_supervisor(&state, principal.as_ref(), input).await
}

pub async fn handle_list_supervisors(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<SupervisorQuery>,
) -> ActionResult<Vec<SupervisorView>> {
    run_blocking("list_supervisors", move || {
        list_supervisors(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_get_supervisor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<SupervisorView> {
    run_blocking("get_supervisor", move || {
        get_supervisor(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_update_supervisor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<UpdateSupervisorInput>,
) -> ActionResult<User> {
    run_blocking("update_supervisor", move || {
        update_supervisor(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_toggle_supervisor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<User> {
    toggle_supervisor_status(&state, principal.as_ref(), id).await
}

pub async fn handle_delete_supervisor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Uuid> {
    delete_supervisor(&state, principal.as_ref(), id).await
}

pub async fn handle_assign_supervisor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(project_id): ActionPath<Uuid>,
    ActionJson(body): ActionJson<AssignBody>,
) -> ActionResult<ProjectSupervisor> {
    let input = AssignmentInput {
        project_id,
        supervisor_id: body.supervisor_id,
    };
    run_blocking("assign_supervisor", move || {
        assign_supervisor(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_unassign_supervisor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath((project_id, supervisor_id)): ActionPath<(Uuid, Uuid)>,
) -> ActionResult<AssignmentView> {
    let input = AssignmentInput {
        project_id,
        supervisor_id,
    };
    run_blocking("unassign_supervisor", move || {
        unassign_supervisor(&state, principal.as_ref(), input)
    })
    .await
}

pub fn configure_users_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/users",
            get(handle_list_supervisors).post(handle_create_supervisor),
        )
        .route(
            "/api/supervisors",
            get(handle_list_supervisors).post(handle_create_supervisor),
        )
        .route(
            "/api/supervisors/:id",
            get(handle_get_supervisor)
                .put(handle_update_supervisor)
                .delete(handle_delete_supervisor),
        )
        .route("/api/supervisors/:id/toggle-status", post(handle_toggle_supervisor))
        .route("/api/projects/:id/supervisors", post(handle_assign_supervisor))
        .route(
            "/api/projects/:id/supervisors/:supervisor_id",
            delete(handle_unassign_supervisor),
        )
}
