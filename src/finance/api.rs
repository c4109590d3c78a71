use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    delete_expense, delete_income, list_expenses, list_incomes, project_summary, record_expense,
    record_income, ExpenseInput, FinanceQuery, IncomeInput, ProjectSummary,
};
use crate::core::action::{run_blocking, ActionJson, ActionPath, ActionQuery, ActionResult};
use crate::core::middleware::CurrentUser;
use crate::core::shared::models::{Expense, Income};
use crate::core::shared::state::AppState;

pub async fn handle_record_income(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<IncomeInput>,
) -> ActionResult<Income> {
    run_blocking("record_income", move || {
        record_income(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_incomes(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<FinanceQuery>,
) -> ActionResult<Vec<Income>> {
    run_blocking("list_incomes", move || {
        list_incomes(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_delete_income(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Uuid> {
    run_blocking("delete_income", move || {
        delete_income(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_record_expense(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionJson(input): ActionJson<ExpenseInput>,
) -> ActionResult<Expense> {
    run_blocking("record_expense", move || {
        record_expense(&state, principal.as_ref(), input)
    })
    .await
}

pub async fn handle_list_expenses(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionQuery(query): ActionQuery<FinanceQuery>,
) -> ActionResult<Vec<Expense>> {
    run_blocking("list_expenses", move || {
        list_expenses(&state, principal.as_ref(), query)
    })
    .await
}

pub async fn handle_delete_expense(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<Uuid> {
    run_blocking("delete_expense", move || {
        delete_expense(&state, principal.as_ref(), id)
    })
    .await
}

pub async fn handle_project_summary(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    ActionPath(project_id): ActionPath<Uuid>,
) -> ActionResult<ProjectSummary> {
    run_blocking("project_summary", move || {
        project_summary(&state, principal.as_ref(), project_id)
    })
    .await
}

pub fn configure_finance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/incomes",
            get(handle_list_incomes).post(handle_record_income),
        )
        .route("/api/incomes/:id", delete(handle_delete_income))
        .route(
            "/api/expenses",
            get(handle_list_expenses).post(handle_record_expense),
        )
        .route("/api/expenses/:id", delete(handle_delete_expense))
        .route("/api/projects/:id/summary", get(handle_project_summary))
}
