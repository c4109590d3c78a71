use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{ensure_pending, RequestQuery, ReviewInput};
use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{
    authorize, ensure_project_access, require_admin, resolve_scope, Principal,
};
use crate::core::shared::enums::{RequestStatus, Role, WorkerType};
use crate::core::shared::models::LaborRequest;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::RequestFilter;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRequestInput {
    pub project_id: Option<Uuid>,
    pub worker_type: Option<WorkerType>,
    pub headcount: Option<i32>,
    pub needed_from: Option<NaiveDate>,
    pub needed_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl LaborRequestInput {
    fn validate(&self) -> Result<(), ActionError> {
        let mut validator = Validator::new()
            .present(self.project_id.as_ref(), "projectId")
            .present(self.worker_type.as_ref(), "workerType")
            .present(self.headcount.as_ref(), "headcount")
            .present(self.needed_from.as_ref(), "neededFrom")
            .date_order(self.needed_from, self.needed_until, "neededUntil")
            .optional_length(self.notes.as_deref(), "notes", 1000);
        if let Some(headcount) = &self.headcount {
            validator = validator.range(headcount, "headcount", Some(1), Some(100));
        }
        validator.validate().map_err(ActionError::from)
    }
}

pub fn create_labor_request(
    state: &AppState,
    principal: Option<&Principal>,
    input: LaborRequestInput,
) -> ActionResult<LaborRequest> {
    ActionResult::from_created(
        "create_labor_request",
        create_labor_request_inner(state, principal, input),
    )
}

fn create_labor_request_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: LaborRequestInput,
) -> Result<LaborRequest, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    input.validate()?;
    let (Some(project_id), Some(worker_type), Some(headcount), Some(needed_from)) = (
        input.project_id,
        input.worker_type,
        input.headcount,
        input.needed_from,
    ) else {
        return Err(ActionError::invalid_input("Labor request details are incomplete"));
    };
    if state.store.find_project(project_id)?.is_none() {
        return Err(ActionError::not_found("Project"));
    }
    ensure_project_access(state.store.as_ref(), principal, project_id)?;

    let now = Utc::now();
    let request = LaborRequest {
        id: Uuid::new_v4(),
        project_id,
        requested_by: principal.user_id,
        worker_type,
        headcount,
        needed_from,
        needed_until: input.needed_until,
        notes: non_blank(input.notes),
        status: RequestStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
        review_note: None,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_labor_request(&request)?;
    info!(
        "Labor request {} for {} {} worker(s) on project {}",
        request.id, headcount, worker_type, project_id
    );
    Ok(request)
}

pub fn get_labor_request(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<LaborRequest> {
    ActionResult::from_result("get_labor_request", get_labor_request_inner(state, principal, id))
}

fn get_labor_request_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<LaborRequest, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let request = state
        .store
        .find_labor_request(id)?
        .ok_or_else(|| ActionError::not_found("Labor request"))?;
    ensure_project_access(state.store.as_ref(), principal, request.project_id)?;
    Ok(request)
}

pub fn list_labor_requests(
    state: &AppState,
    principal: Option<&Principal>,
    query: RequestQuery,
) -> ActionResult<Vec<LaborRequest>> {
    ActionResult::from_result(
        "list_labor_requests",
        list_labor_requests_inner(state, principal, query),
    )
}

fn list_labor_requests_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: RequestQuery,
) -> Result<Vec<LaborRequest>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let scope = resolve_scope(state.store.as_ref(), principal, query.project_id)?;
    Ok(state.store.list_labor_requests(&RequestFilter {
        scope,
        status: query.status,
    })?)
}

pub fn review_labor_request(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ReviewInput,
) -> ActionResult<LaborRequest> {
    ActionResult::from_result(
        "review_labor_request",
        review_labor_request_inner(state, principal, id, input),
    )
}

fn review_labor_request_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ReviewInput,
) -> Result<LaborRequest, ActionError> {
    let admin = require_admin(principal)?;
    let decision = input.into_decision()?;
    let mut request = state
        .store
        .find_labor_request(id)?
        .ok_or_else(|| ActionError::not_found("Labor request"))?;
    ensure_pending(request.status)?;

    let now = Utc::now();
    request.status = decision.status;
    request.reviewed_by = Some(admin.user_id);
    request.reviewed_at = Some(now);
    request.review_note = decision.note;
    request.updated_at = now;
    if !state.store.apply_labor_review(&request)? {
        return Err(ActionError::Conflict(
            "Request has already been reviewed".to_string(),
        ));
    }
    info!("Labor request {} {}", id, request.status);
    Ok(request)
}
