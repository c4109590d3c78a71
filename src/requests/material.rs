use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{ensure_pending, RequestQuery, ReviewInput};
use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{
    authorize, ensure_project_access, require_admin, resolve_scope, Principal,
};
use crate::core::shared::enums::{RequestStatus, Role};
use crate::core::shared::models::{MaterialRequest, MaterialRequestDetail, MaterialRequestItem};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::{ValidationError, ValidationResult, Validator};
use crate::store::prelude::*;
use crate::store::RequestFilter;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLineInput {
    /// Inventory line being topped up. Name and unit default to the item's.
    pub item_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub quantity: Option<i32>,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequestInput {
    pub project_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<MaterialLineInput>,
}

fn validate_request(input: &MaterialRequestInput) -> Result<(), ActionError> {
    let mut result = match Validator::new()
        .present(input.project_id.as_ref(), "projectId")
        .optional_length(input.notes.as_deref(), "notes", 1000)
        .custom(|| {
            input.items.is_empty().then(|| ValidationError::InvalidValue {
                field: "items".to_string(),
                message: "must contain at least one item".to_string(),
            })
        })
        .validate()
    {
        Ok(()) => ValidationResult::new(),
        Err(errors) => errors,
    };

    for (i, line) in input.items.iter().enumerate() {
        let field = |name: &str| format!("items[{}].{}", i, name);
        let mut validator = Validator::new().present(line.quantity.as_ref(), &field("quantity"));
        if let Some(quantity) = &line.quantity {
            validator = validator.range(quantity, &field("quantity"), Some(1), None);
        }
        if line.item_id.is_none() {
            validator = validator
                .string_required(&line.name, &field("name"))
                .string_required(&line.unit, &field("unit"));
        }
        validator = validator
            .length(&line.name, &field("name"), None, Some(120))
            .length(&line.unit, &field("unit"), None, Some(20));
        if let Err(errors) = validator.validate() {
            result.merge(errors);
        }
    }

    if result.is_valid() {
        Ok(())
    } else {
        Err(result.into())
    }
}

/// Resolves each line against inventory; linked items must sit in the same project.
fn build_lines(
    state: &AppState,
    project_id: Uuid,
    request_id: Uuid,
    lines: Vec<MaterialLineInput>,
) -> Result<Vec<MaterialRequestItem>, ActionError> {
    let mut items = Vec::with_capacity(lines.len());
    for (i, line) in lines.into_iter().enumerate() {
        let (name, unit) = match line.item_id {
            Some(item_id) => match state.store.find_item(item_id)? {
                Some(item) if item.project_id == project_id => (
                    non_blank(Some(line.name)).unwrap_or(item.name),
                    non_blank(Some(line.unit)).unwrap_or(item.unit),
                ),
                _ => {
                    return Err(ActionError::field(
                        &format!("items[{}].itemId", i),
                        "must be an inventory item of the same project",
                    ))
                }
            },
            None => (line.name.trim().to_string(), line.unit.trim().to_string()),
        };
        items.push(MaterialRequestItem {
            id: Uuid::new_v4(),
            request_id,
            item_id: line.item_id,
            name,
            quantity: line.quantity.unwrap_or_default(),
            unit,
        });
    }
    Ok(items)
}

pub fn create_material_request(
    state: &AppState,
    principal: Option<&Principal>,
    input: MaterialRequestInput,
) -> ActionResult<MaterialRequestDetail> {
    ActionResult::from_created(
        "create_material_request",
        create_material_request_inner(state, principal, input),
    )
}

fn create_material_request_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: MaterialRequestInput,
) -> Result<MaterialRequestDetail, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    validate_request(&input)?;
    let project_id = input
        .project_id
        .ok_or_else(|| ActionError::field("projectId", "is required"))?;
    if state.store.find_project(project_id)?.is_none() {
        return Err(ActionError::not_found("Project"));
    }
    ensure_project_access(state.store.as_ref(), principal, project_id)?;

    let now = Utc::now();
    let request = MaterialRequest {
        id: Uuid::new_v4(),
        project_id,
        requested_by: principal.user_id,
        status: RequestStatus::Pending,
        notes: non_blank(input.notes),
        reviewed_by: None,
        reviewed_at: None,
        review_note: None,
        created_at: now,
        updated_at: now,
    };
    let items = build_lines(state, project_id, request.id, input.items)?;
    state.store.insert_material_request(&request, &items)?;
    info!(
        "Material request {} with {} line(s) submitted for project {}",
        request.id,
        items.len(),
        project_id
    );
    Ok(MaterialRequestDetail { request, items })
}

pub fn get_material_request(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<MaterialRequestDetail> {
    ActionResult::from_result(
        "get_material_request",
        get_material_request_inner(state, principal, id),
    )
}

fn get_material_request_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<MaterialRequestDetail, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let detail = state
        .store
        .find_material_request(id)?
        .ok_or_else(|| ActionError::not_found("Material request"))?;
    ensure_project_access(state.store.as_ref(), principal, detail.request.project_id)?;
    Ok(detail)
}

pub fn list_material_requests(
    state: &AppState,
    principal: Option<&Principal>,
    query: RequestQuery,
) -> ActionResult<Vec<MaterialRequestDetail>> {
    ActionResult::from_result(
        "list_material_requests",
        list_material_requests_inner(state, principal, query),
    )
}

fn list_material_requests_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: RequestQuery,
) -> Result<Vec<MaterialRequestDetail>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let scope = resolve_scope(state.store.as_ref(), principal, query.project_id)?;
    Ok(state.store.list_material_requests(&RequestFilter {
        scope,
        status: query.status,
    })?)
}

pub fn review_material_request(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ReviewInput,
) -> ActionResult<MaterialRequestDetail> {
    ActionResult::from_result(
        "review_material_request",
        review_material_request_inner(state, principal, id, input),
    )
}

fn review_material_request_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ReviewInput,
) -> Result<MaterialRequestDetail, ActionError> {
    let admin = require_admin(principal)?;
    let decision = input.into_decision()?;
    let mut detail = state
        .store
        .find_material_request(id)?
        .ok_or_else(|| ActionError::not_found("Material request"))?;
    ensure_pending(detail.request.status)?;

    let now = Utc::now();
    let request = &mut detail.request;
    request.status = decision.status;
    request.reviewed_by = Some(admin.user_id);
    request.reviewed_at = Some(now);
    request.review_note = decision.note;
    request.updated_at = now;
    if !state.store.apply_material_review(request)? {
        return Err(ActionError::Conflict(
            "Request has already been reviewed".to_string(),
        ));
    }
    info!("Material request {} {}", id, request.status);
    Ok(detail)
}
