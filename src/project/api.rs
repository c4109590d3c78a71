use axum::{extract::State, routing::get, Router};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    create_project, delete_project, get_project, list_projects, update_project, ProjectInput,
    ProjectQuery, ProjectView,
};
use crate::core::action::{run_blocking, ActionJson, ActionPath, ActionQuery, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::models::Project;
use crate::core::shared::state::AppState;

pub async fn handle_create_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<ProjectInput>,
) -> ActionResult<Project> {
    run_blocking("create_project", move || {
        create_project(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_projects(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<ProjectQuery>,
) -> ActionResult<Vec<Project>> {
    run_blocking("list_projects", move || {
        list_projects(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_get_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<ProjectView> {
    run_blocking("get_project", move || get_project(&state, principal.as_ref(), id)).await
}

pub async fn handle_update_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<ProjectInput>,
) -> ActionResult<Project> {
    run_blocking("update_project", move || {
        update_project(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_delete_project(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Uuid> {
    run_blocking("delete_project", move || {
        delete_project(&state, principal.as_ref(), id)
    })
    .await
}

pub fn configure_project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/projects",
            get(handle_list_projects).post(handle_create_project),
        )
        .route(
            "/api/projects/:id",
            get(handle_get_project)
                .put(handle_update_project)
                .delete(handle_delete_project),
        )
}
