use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{authorize, require_admin, Principal};
use crate::core::shared::enums::Role;
use crate::core::shared::models::MaterialCategory;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

impl CategoryInput {
    fn validate(&self) -> Result<(), ActionError> {
        Validator::new()
            .string_required(&self.name, "name")
            .length(&self.name, "name", Some(2), Some(60))
            .optional_length(self.description.as_deref(), "description", 500)
            .validate()
            .map_err(ActionError::from)
    }
}

/// Rejects a name already used by another category, ignoring case and padding.
fn ensure_unique_name(
    state: &AppState,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), ActionError> {
    match state.store.find_category_by_name(name)? {
        Some(existing) if Some(existing.id) != except => Err(ActionError::Conflict(format!(
            "A category named '{}' already exists",
            existing.name
        ))),
        _ => Ok(()),
    }
}

pub fn create_category(
    state: &AppState,
    principal: Option<&Principal>,
    input: CategoryInput,
) -> ActionResult<MaterialCategory> {
    ActionResult::from_created("create_category", create_category_inner(state, principal, input))
}

fn create_category_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: CategoryInput,
) -> Result<MaterialCategory, ActionError> {
    require_admin(principal)?;
    input.validate()?;
    let name = input.name.trim().to_string();
    ensure_unique_name(state, &name, None)?;

    let now = Utc::now();
    let category = MaterialCategory {
        id: Uuid::new_v4(),
        name,
        description: non_blank(input.description),
        created_at: now,
        updated_at: now,
    };
    state.store.insert_category(&category)?;
    info!("Category '{}' created", category.name);
    Ok(category)
}

pub fn list_categories(
    state: &AppState,
    principal: Option<&Principal>,
) -> ActionResult<Vec<MaterialCategory>> {
    ActionResult::from_result("list_categories", list_categories_inner(state, principal))
}

fn list_categories_inner(
    state: &AppState,
    principal: Option<&Principal>,
) -> Result<Vec<MaterialCategory>, ActionError> {
    authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    Ok(state.store.list_categories()?)
}

pub fn update_category(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: CategoryInput,
) -> ActionResult<MaterialCategory> {
    ActionResult::from_result(
        "update_category",
        update_category_inner(state, principal, id, input),
    )
}

fn update_category_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: CategoryInput,
) -> Result<MaterialCategory, ActionError> {
    require_admin(principal)?;
    input.validate()?;
    let mut category = state
        .store
        .find_category(id)?
        .ok_or_else(|| ActionError::not_found("Category"))?;
    let name = input.name.trim().to_string();
    ensure_unique_name(state, &name, Some(id))?;

    category.name = name;
    category.description = non_blank(input.description);
    category.updated_at = Utc::now();
    state.store.update_category(&category)?;
    Ok(category)
}

pub fn delete_category(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Uuid> {
    ActionResult::from_result("delete_category", delete_category_inner(state, principal, id))
}

fn delete_category_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Uuid, ActionError> {
    require_admin(principal)?;
    if state.store.find_category(id)?.is_none() {
        return Err(ActionError::not_found("Category"));
    }
    let in_use = state.store.count_category_items(id)?;
    if in_use > 0 {
        return Err(ActionError::Conflict(format!(
            "Category is used by {} inventory item(s)",
            in_use
        )));
    }
    state.store.delete_category(id)?;
    info!("Category {} deleted", id);
    Ok(id)
}
