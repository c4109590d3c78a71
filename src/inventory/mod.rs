//! Per-project stock of materials.
//!
//! Stock only grows through [`add_quantity`], and only once an item has
//! fallen to its threshold. It shrinks through [`record_usage`], which keeps a
//! usage row for every decrement.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{
    authorize, ensure_project_access, require_admin, resolve_scope, Principal,
};
use crate::core::shared::enums::Role;
use crate::core::shared::models::{InventoryItem, InventoryUsage};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::ItemFilter;

pub mod api;
pub mod categories;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub project_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    /// Opening stock. Ignored on update.
    pub quantity: Option<i32>,
    pub threshold: Option<i32>,
    pub unit_cost: Option<BigDecimal>,
}

impl ItemInput {
    fn validate(&self) -> Result<(), ActionError> {
        let mut validator = Validator::new()
            .present(self.project_id.as_ref(), "projectId")
            .present(self.category_id.as_ref(), "categoryId")
            .string_required(&self.name, "name")
            .length(&self.name, "name", Some(1), Some(120))
            .string_required(&self.unit, "unit")
            .length(&self.unit, "unit", Some(1), Some(20));
        if let Some(quantity) = &self.quantity {
            validator = validator.range(quantity, "quantity", Some(0), None);
        }
        if let Some(threshold) = &self.threshold {
            validator = validator.range(threshold, "threshold", Some(0), None);
        }
        if let Some(unit_cost) = &self.unit_cost {
            validator = validator
                .non_negative(unit_cost, "unitCost")
                .decimal(unit_cost, "unitCost", 14, 2);
        }
        validator.validate().map_err(ActionError::from)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    pub project_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockQuery {
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestockInput {
    pub amount: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInput {
    pub quantity: Option<i32>,
    /// Defaults to today.
    pub used_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn find_item(state: &AppState, id: Uuid) -> Result<InventoryItem, ActionError> {
    state
        .store
        .find_item(id)?
        .ok_or_else(|| ActionError::not_found("Inventory item"))
}

/// Project and category must exist and the (project, category, name) key must be free.
fn check_item_key(
    state: &AppState,
    project_id: Uuid,
    category_id: Uuid,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), ActionError> {
    if state.store.find_project(project_id)?.is_none() {
        return Err(ActionError::not_found("Project"));
    }
    if state.store.find_category(category_id)?.is_none() {
        return Err(ActionError::not_found("Category"));
    }
    match state.store.find_item_by_key(project_id, category_id, name)? {
        Some(existing) if Some(existing.id) != except => Err(ActionError::Conflict(format!(
            "'{}' already exists in this project and category",
            existing.name
        ))),
        _ => Ok(()),
    }
}

pub fn create_item(
    state: &AppState,
    principal: Option<&Principal>,
    input: ItemInput,
) -> ActionResult<InventoryItem> {
    ActionResult::from_created("create_item", create_item_inner(state, principal, input))
}

fn create_item_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: ItemInput,
) -> Result<InventoryItem, ActionError> {
    require_admin(principal)?;
    input.validate()?;
    let (Some(project_id), Some(category_id)) = (input.project_id, input.category_id) else {
        return Err(ActionError::invalid_input("projectId and categoryId are required"));
    };
    let name = input.name.trim().to_string();
    check_item_key(state, project_id, category_id, &name, None)?;

    let quantity = input.quantity.unwrap_or(0);
    let now = Utc::now();
    let item = InventoryItem {
        id: Uuid::new_v4(),
        project_id,
        category_id,
        name,
        unit: input.unit.trim().to_string(),
        quantity,
        initial_quantity: quantity,
        threshold: input
            .threshold
            .unwrap_or(state.config.inventory.default_threshold),
        unit_cost: input.unit_cost.unwrap_or_else(|| BigDecimal::from(0)),
        created_at: now,
        updated_at: now,
    };
    state.store.insert_item(&item)?;
    info!(
        "Inventory item {} created in project {} with {} {}",
        item.id, item.project_id, item.quantity, item.unit
    );
    Ok(item)
}

pub fn update_item(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ItemInput,
) -> ActionResult<InventoryItem> {
    ActionResult::from_result("update_item", update_item_inner(state, principal, id, input))
}

fn update_item_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: ItemInput,
) -> Result<InventoryItem, ActionError> {
    require_admin(principal)?;
    input.validate()?;
    let (Some(project_id), Some(category_id)) = (input.project_id, input.category_id) else {
        return Err(ActionError::invalid_input("projectId and categoryId are required"));
    };
    let mut item = find_item(state, id)?;
    let name = input.name.trim().to_string();
    check_item_key(state, project_id, category_id, &name, Some(id))?;

    item.project_id = project_id;
    item.category_id = category_id;
    item.name = name;
    item.unit = input.unit.trim().to_string();
    if let Some(threshold) = input.threshold {
        item.threshold = threshold;
    }
    if let Some(unit_cost) = input.unit_cost {
        item.unit_cost = unit_cost;
    }
    item.updated_at = Utc::now();
    state.store.update_item(&item)?;
    Ok(item)
}

pub fn get_item(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<InventoryItem> {
    ActionResult::from_result("get_item", get_item_inner(state, principal, id))
}

fn get_item_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<InventoryItem, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let item = find_item(state, id)?;
    ensure_project_access(state.store.as_ref(), principal, item.project_id)?;
    Ok(item)
}

pub fn list_items(
    state: &AppState,
    principal: Option<&Principal>,
    query: ItemQuery,
) -> ActionResult<Vec<InventoryItem>> {
    ActionResult::from_result("list_items", list_items_inner(state, principal, query))
}

fn list_items_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: ItemQuery,
) -> Result<Vec<InventoryItem>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let scope = resolve_scope(state.store.as_ref(), principal, query.project_id)?;
    Ok(state.store.list_items(&ItemFilter {
        scope,
        category_id: query.category_id,
        low_stock_only: query.low_stock,
    })?)
}

/// Items at or below their threshold.
pub fn low_stock_items(
    state: &AppState,
    principal: Option<&Principal>,
    query: LowStockQuery,
) -> ActionResult<Vec<InventoryItem>> {
    ActionResult::from_result(
        "low_stock_items",
        list_items_inner(
            state,
            principal,
            ItemQuery {
                project_id: query.project_id,
                category_id: None,
                low_stock: true,
            },
        ),
    )
}

pub fn delete_item(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Uuid> {
    ActionResult::from_result("delete_item", delete_item_inner(state, principal, id))
}

fn delete_item_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Uuid, ActionError> {
    require_admin(principal)?;
    find_item(state, id)?;
    let references = state.store.count_item_references(id)?;
    if references > 0 {
        return Err(ActionError::Conflict(
            "Item has usage history or material requests and cannot be deleted".to_string(),
        ));
    }
    state.store.delete_item(id)?;
    info!("Inventory item {} deleted", id);
    Ok(id)
}

/// Restocks an item. Only allowed while the item is at or below its threshold.
pub fn add_quantity(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: RestockInput,
) -> ActionResult<InventoryItem> {
    ActionResult::from_result("add_quantity", add_quantity_inner(state, principal, id, input))
}

fn add_quantity_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: RestockInput,
) -> Result<InventoryItem, ActionError> {
    let admin = require_admin(principal)?;
    let mut validator = Validator::new().present(input.amount.as_ref(), "amount");
    if let Some(amount) = &input.amount {
        validator = validator.range(amount, "amount", Some(1), None);
    }
    validator.validate()?;
    let amount = input.amount.unwrap_or_default();

    let item = find_item(state, id)?;
    if !item.is_low_stock() {
        return Err(above_threshold(&item));
    }
    if item.quantity.checked_add(amount).is_none()
        || item.initial_quantity.checked_add(amount).is_none()
    {
        return Err(ActionError::field("amount", "is too large for this item"));
    }
    // The store re-checks the threshold in the same statement as the update.
    let restocked = state
        .store
        .restock_item(id, amount)?
        .ok_or_else(|| above_threshold(&item))?;
    info!(
        "Item {} restocked by {} (+{}), now {}",
        id, admin.user_id, amount, restocked.quantity
    );
    Ok(restocked)
}

fn above_threshold(item: &InventoryItem) -> ActionError {
    ActionError::Forbidden(format!(
        "Stock can only be added once quantity is at or below the threshold of {}",
        item.threshold
    ))
}

pub fn record_usage(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: UsageInput,
) -> ActionResult<InventoryUsage> {
    ActionResult::from_created("record_usage", record_usage_inner(state, principal, id, input))
}

fn record_usage_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: UsageInput,
) -> Result<InventoryUsage, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let mut validator = Validator::new()
        .present(input.quantity.as_ref(), "quantity")
        .optional_length(input.notes.as_deref(), "notes", 500);
    if let Some(quantity) = &input.quantity {
        validator = validator.range(quantity, "quantity", Some(1), None);
    }
    validator.validate()?;
    let quantity = input.quantity.unwrap_or_default();

    let item = find_item(state, id)?;
    ensure_project_access(state.store.as_ref(), principal, item.project_id)?;
    if quantity > item.quantity {
        return Err(insufficient_stock(&item));
    }

    let usage = InventoryUsage {
        id: Uuid::new_v4(),
        item_id: item.id,
        quantity,
        used_on: input.used_on.unwrap_or_else(|| Utc::now().date_naive()),
        notes: non_blank(input.notes),
        recorded_by: principal.user_id,
        created_at: Utc::now(),
    };
    let updated = state
        .store
        .consume_item(&usage)?
        .ok_or_else(|| insufficient_stock(&item))?;
    info!(
        "Recorded usage of {} {} from item {}, {} left",
        usage.quantity, updated.unit, updated.id, updated.quantity
    );
    Ok(usage)
}

fn insufficient_stock(item: &InventoryItem) -> ActionError {
    ActionError::field(
        "quantity",
        &format!("cannot exceed the {} {} in stock", item.quantity, item.unit),
    )
}

pub fn list_usage(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Vec<InventoryUsage>> {
    ActionResult::from_result("list_usage", list_usage_inner(state, principal, id))
}

fn list_usage_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Vec<InventoryUsage>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let item = find_item(state, id)?;
    ensure_project_access(state.store.as_ref(), principal, item.project_id)?;
    Ok(state.store.list_usages(id)?)
}
