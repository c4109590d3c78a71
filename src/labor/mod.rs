use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{authorize, require_admin, resolve_scope, Principal};
use crate::core::shared::enums::{Role, WorkerType};
use crate::core::shared::models::Laborer;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::LaborerFilter;

pub mod api;
pub mod attendance;
pub mod payments;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborerInput {
    #[serde(default)]
    pub name: String,
    pub phone: Option<String>,
    pub worker_type: Option<WorkerType>,
    pub daily_wage: Option<BigDecimal>,
    pub project_id: Option<Uuid>,
}

impl LaborerInput {
    fn validate(&self) -> Result<(), ActionError> {
        let mut validator = Validator::new()
            .string_required(&self.name, "name")
            .length(&self.name, "name", Some(2), Some(100))
            .phone(self.phone.as_deref(), "phone")
            .present(self.worker_type.as_ref(), "workerType")
            .present(self.daily_wage.as_ref(), "dailyWage");
        if let Some(wage) = &self.daily_wage {
            validator = validator
                .non_negative(wage, "dailyWage")
                .decimal(wage, "dailyWage", 12, 2);
        }
        validator.validate().map_err(ActionError::from)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborerQuery {
    pub project_id: Option<Uuid>,
    pub active: Option<bool>,
}

pub(crate) fn find_laborer(state: &AppState, id: Uuid) -> Result<Laborer, ActionError> {
    state
        .store
        .find_laborer(id)?
        .ok_or_else(|| ActionError::not_found("Laborer"))
}

fn ensure_project_exists(state: &AppState, project_id: Option<Uuid>) -> Result<(), ActionError> {
    match project_id {
        Some(id) if state.store.find_project(id)?.is_none() => {
            Err(ActionError::not_found("Project"))
        }
        _ => Ok(()),
    }
}

pub fn create_laborer(
    state: &AppState,
    principal: Option<&Principal>,
    input: LaborerInput,
) -> ActionResult<Laborer> {
    ActionResult::from_created("create_laborer", create_laborer_inner(state, principal, input))
}

fn create_laborer_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: LaborerInput,
) -> Result<Laborer, ActionError> {
    require_admin(principal)?;
    input.validate()?;
    ensure_project_exists(state, input.project_id)?;

    let now = Utc::now();
    let laborer = Laborer {
        id: Uuid::new_v4(),
        name: input.name.trim().to_string(),
        phone: non_blank(input.phone),
        worker_type: input.worker_type.unwrap_or(WorkerType::Temporary),
        daily_wage: input.daily_wage.unwrap_or_else(|| BigDecimal::from(0)),
        project_id: input.project_id,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_laborer(&laborer)?;
    info!("Laborer {} created", laborer.id);
    Ok(laborer)
}

pub fn update_laborer(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: LaborerInput,
) -> ActionResult<Laborer> {
    ActionResult::from_result("update_laborer", update_laborer_inner(state, principal, id, input))
}

fn update_laborer_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: LaborerInput,
) -> Result<Laborer, ActionError> {
    require_admin(principal)?;
    input.validate()?;
    let mut laborer = find_laborer(state, id)?;
    ensure_project_exists(state, input.project_id)?;

    laborer.name = input.name.trim().to_string();
    laborer.phone = non_blank(input.phone);
    if let Some(worker_type) = input.worker_type {
        laborer.worker_type = worker_type;
    }
    if let Some(wage) = input.daily_wage {
        laborer.daily_wage = wage;
    }
    laborer.project_id = input.project_id;
    laborer.updated_at = Utc::now();
    state.store.update_laborer(&laborer)?;
    Ok(laborer)
}

pub fn get_laborer(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Laborer> {
    ActionResult::from_result("get_laborer", get_laborer_inner(state, principal, id))
}

fn get_laborer_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Laborer, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let laborer = find_laborer(state, id)?;
    if principal.is_admin() {
        return Ok(laborer);
    }
    let assigned = state.store.supervisor_project_ids(principal.user_id)?;
    match laborer.project_id {
        Some(project_id) if assigned.contains(&project_id) => Ok(laborer),
        _ => Err(ActionError::Forbidden(
            "Laborer is not on one of your projects".to_string(),
        )),
    }
}

pub fn list_laborers(
    state: &AppState,
    principal: Option<&Principal>,
    query: LaborerQuery,
) -> ActionResult<Vec<Laborer>> {
    ActionResult::from_result("list_laborers", list_laborers_inner(state, principal, query))
}

fn list_laborers_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: LaborerQuery,
) -> Result<Vec<Laborer>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let scope = resolve_scope(state.store.as_ref(), principal, query.project_id)?;
    Ok(state.store.list_laborers(&LaborerFilter {
        scope,
        active: query.active,
    })?)
}

pub fn toggle_laborer_status(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Laborer> {
    ActionResult::from_result(
        "toggle_laborer_status",
        toggle_laborer_status_inner(state, principal, id),
    )
}

fn toggle_laborer_status_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Laborer, ActionError> {
    require_admin(principal)?;
    let mut laborer = find_laborer(state, id)?;
    laborer.is_active = !laborer.is_active;
    laborer.updated_at = Utc::now();
    state.store.update_laborer(&laborer)?;
    info!("Laborer {} active={}", laborer.id, laborer.is_active);
    Ok(laborer)
}

pub fn delete_laborer(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Uuid> {
    ActionResult::from_result("delete_laborer", delete_laborer_inner(state, principal, id))
}

fn delete_laborer_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Uuid, ActionError> {
    require_admin(principal)?;
    find_laborer(state, id)?;
    let (attendance_rows, payment_rows) = state.store.laborer_history_counts(id)?;
    if attendance_rows > 0 || payment_rows > 0 {
        return Err(ActionError::Conflict(format!(
            "Laborer has {} attendance and {} payment record(s); deactivate instead",
            attendance_rows, payment_rows
        )));
    }
    state.store.delete_laborer(id)?;
    info!("Laborer {} deleted", id);
    Ok(id)
}
