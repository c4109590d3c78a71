use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{
    authorize, ensure_project_access, require_admin, resolve_scope, Principal,
};
use crate::core::shared::enums::{ProjectStatus, Role};
use crate::core::shared::models::Project;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::ProjectFilter;

pub mod api;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default)]
    pub name: String,
    pub client_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<BigDecimal>,
}

impl ProjectInput {
    fn validate(&self) -> Result<(), ActionError> {
        let mut validator = Validator::new()
            .string_required(&self.name, "name")
            .length(&self.name, "name", Some(2), Some(120))
            .optional_length(self.client_name.as_deref(), "clientName", 120)
            .optional_length(self.location.as_deref(), "location", 200)
            .optional_length(self.description.as_deref(), "description", 2000)
            .date_order(self.start_date, self.end_date, "endDate");
        if let Some(budget) = &self.budget {
            validator = validator
                .non_negative(budget, "budget")
                .decimal(budget, "budget", 14, 2);
        }
        validator.validate().map_err(ActionError::from)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub supervisor_ids: Vec<Uuid>,
}

pub fn create_project(
    state: &AppState,
    principal: Option<&Principal>,
    input: ProjectInput,
) -> ActionResult<Project> {
    ActionResult::from_created("create_project", create_project_inner(state, principal, input))
}

fn create_project_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: ProjectInput,
) -> Result<Project, ActionError> {
    let admin = require_admin(principal)?;
    input.validate()?;

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        name: input.name.trim().to_string(),
        client_name: non_blank(input.client_name),
        location: non_blank(input.location),
        description: non_blank(input.description),
        status: input.status.unwrap_or_default(),
        start_date: input.start_date,
        end_date: input.end_date,
        budget: input.budget,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_project(&project)?;
    info!("Project {} created by {}", project.id, admin.user_id);
    Ok(project)
}

pub fn update_project(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ProjectInput,
) -> ActionResult<Project> {
    ActionResult::from_result("update_project", update_project_inner(state, principal, id, input))
}

fn update_project_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ProjectInput,
) -> Result<Project, ActionError> {
    require_admin(principal)?;
    input.validate()?;

    let mut project = state
        .store
        .find_project(id)?
        .ok_or_else(|| ActionError::not_found("Project"))?;
    project.name = input.name.trim().to_string();
    project.client_name = non_blank(input.client_name);
    project.location = non_blank(input.location);
    project.description = non_blank(input.description);
    if let Some(status) = input.status {
        project.status = status;
    }
    project.start_date = input.start_date;
    project.end_date = input.end_date;
    project.budget = input.budget;
    project.updated_at = Utc::now();

    state.store.update_project(&project)?;
    info!("Project {} updated", project.id);
    Ok(project)
}

pub fn get_project(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<ProjectView> {
    ActionResult::from_result("get_project", get_project_inner(state, principal, id))
}

fn get_project_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<ProjectView, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let project = state
        .store
        .find_project(id)?
        .ok_or_else(|| ActionError::not_found("Project"))?;
    ensure_project_access(state.store.as_ref(), principal, project.id)?;
    let supervisor_ids = state.store.project_supervisor_ids(project.id)?;
    Ok(ProjectView {
        project,
        supervisor_ids,
    })
}

pub fn list_projects(
    state: &AppState,
    principal: Option<&Principal>,
    query: ProjectQuery,
) -> ActionResult<Vec<Project>> {
    ActionResult::from_result("list_projects", list_projects_inner(state, principal, query))
}

fn list_projects_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: ProjectQuery,
) -> Result<Vec<Project>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let scope = resolve_scope(state.store.as_ref(), principal, None)?;
    Ok(state.store.list_projects(&ProjectFilter {
        scope,
        status: query.status,
    })?)
}

pub fn delete_project(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Uuid> {
    ActionResult::from_result("delete_project", delete_project_inner(state, principal, id))
}

fn delete_project_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Uuid, ActionError> {
    require_admin(principal)?;
    let project = state
        .store
        .find_project(id)?
        .ok_or_else(|| ActionError::not_found("Project"))?;
    if project.status.is_open() {
        return Err(ActionError::Conflict(format!(
            "Projects with status {} cannot be deleted",
            project.status
        )));
    }
    if !state.store.delete_project(id)? {
        return Err(ActionError::not_found("Project"));
    }
    info!("Project {} deleted", id);
    Ok(id)
}
