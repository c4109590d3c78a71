use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::categories::{
    create_category, delete_category, list_categories, update_category, CategoryInput,
};
use super::{
    add_quantity, create_item, delete_item, get_item, list_items, list_usage, low_stock_items,
    record_usage, update_item, ItemInput, ItemQuery, LowStockQuery, RestockInput, UsageInput,
};
use crate::core::action::{run_blocking, ActionJson, ActionPath, ActionQuery, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::models::{InventoryItem, InventoryUsage, MaterialCategory};
use crate::core::shared::state::AppState;

pub async fn handle_create_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<CategoryInput>,
) -> ActionResult<MaterialCategory> {
    run_blocking("create_category", move || {
        create_category(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_categories(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> ActionResult<Vec<MaterialCategory>> {
    run_blocking("list_categories", move || {
        list_categories(&state, principal.as_ref())
    })
    .await
}

pub async fn handle_update_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<CategoryInput>,
) -> ActionResult<MaterialCategory> {
    run_blocking("update_category", move || {
        update_category(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_delete_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Uuid> {
    run_blocking("delete_category", move || {
        delete_category(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_create_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<ItemInput>,
) -> ActionResult<InventoryItem> {
    run_blocking("create_item", move || {
        create_item(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_items(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<ItemQuery>,
) -> ActionResult<Vec<InventoryItem>> {
    run_blocking("list_items", move || {
        list_items(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_low_stock_items(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<LowStockQuery>,
) -> ActionResult<Vec<InventoryItem>> {
    run_blocking("low_stock_items", move || {
        low_stock_items(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_get_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<InventoryItem> {
    run_blocking("get_item", move || get_item(&state, principal.as_ref(), id)).await
}

pub async fn handle_update_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<ItemInput>,
) -> ActionResult<InventoryItem> {
    run_blocking("update_item", move || {
        update_item(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_delete_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Uuid> {
    run_blocking("delete_item", move || delete_item(&state, principal.as_ref(), id)).await
}

pub async fn handle_add_quantity(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<RestockInput>,
) -> ActionResult<InventoryItem> {
    run_blocking("add_quantity", move || {
        add_quantity(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_record_usage(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(input): ActionJson<UsageInput>,
) -> ActionResult<InventoryUsage> {
    run_blocking("record_usage", move || {
        record_usage(&state, principal.as_ref(), id, input)
    })
    .await
}

pub async fn handle_list_usage(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Vec<InventoryUsage>> {
    run_blocking("list_usage", move || list_usage(&state, principal.as_ref(), id)).await
}

pub fn configure_inventory_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/categories",
            get(handle_list_categories).post(handle_create_category),
        )
        .route(
            "/api/categories/:id",
            put(handle_update_category).delete(handle_delete_category),
        )
        .route(
            "/api/inventory",
            get(handle_list_items).post(handle_create_item),
        )
        .route("/api/inventory/low-stock", get(handle_low_stock_items))
        .route(
            "/api/inventory/:id",
            get(handle_get_item)
                .put(handle_update_item)
                .delete(handle_delete_item),
        )
        .route("/api/inventory/:id/restock", post(handle_add_quantity))
        .route(
            "/api/inventory/:id/usage",
            get(handle_list_usage).post(handle_record_usage),
        )
}
