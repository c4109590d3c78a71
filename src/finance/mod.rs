//! Project money: income received, expenses paid, and the per-project summary
//! that nets them against labor payments and consumed materials.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{require_admin, Principal};
use crate::core::shared::models::{Expense, Income};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::{ItemFilter, PaymentFilter};

pub mod api;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeInput {
    pub project_id: Option<Uuid>,
    pub amount: Option<BigDecimal>,
    pub received_on: Option<NaiveDate>,
    #[serde(default)]
    pub source: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    pub project_id: Option<Uuid>,
    pub amount: Option<BigDecimal>,
    pub spent_on: Option<NaiveDate>,
    #[serde(default)]
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceQuery {
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub project_name: String,
    pub budget: Option<BigDecimal>,
    pub income: BigDecimal,
    pub expenses: BigDecimal,
    pub labor_payments: BigDecimal,
    pub materials: BigDecimal,
    pub net: BigDecimal,
}

fn ensure_project(state: &AppState, project_id: Uuid) -> Result<(), ActionError> {
    match state.store.find_project(project_id)? {
        Some(_) => Ok(()),
        None => Err(ActionError::not_found("Project")),
    }
}

pub fn record_income(
    state: &AppState,
    principal: Option<&Principal>,
    input: IncomeInput,
) -> ActionResult<Income> {
    ActionResult::from_created("record_income", record_income_inner(state, principal, input))
}

fn record_income_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: IncomeInput,
) -> Result<Income, ActionError> {
    let admin = require_admin(principal)?;
    let mut validator = Validator::new()
        .present(input.project_id.as_ref(), "projectId")
        .present(input.amount.as_ref(), "amount")
        .present(input.received_on.as_ref(), "receivedOn")
        .string_required(&input.source, "source")
        .length(&input.source, "source", None, Some(120))
        .optional_length(input.notes.as_deref(), "notes", 500);
    if let Some(amount) = &input.amount {
        validator = validator
            .positive(amount, "amount")
            .decimal(amount, "amount", 14, 2);
    }
    validator.validate()?;
    let (Some(project_id), Some(amount), Some(received_on)) =
        (input.project_id, input.amount, input.received_on)
    else {
        return Err(ActionError::invalid_input("Income details are incomplete"));
    };
    ensure_project(state, project_id)?;

    let income = Income {
        id: Uuid::new_v4(),
        project_id,
        amount,
        received_on,
        source: input.source.trim().to_string(),
        notes: non_blank(input.notes),
        recorded_by: admin.user_id,
        created_at: Utc::now(),
    };
    state.store.insert_income(&income)?;
    info!("Income {} of {} for project {}", income.id, income.amount, project_id);
    Ok(income)
}

pub fn list_incomes(
    state: &AppState,
    principal: Option<&Principal>,
    query: FinanceQuery,
) -> ActionResult<Vec<Income>> {
    ActionResult::from_result(
        "list_incomes",
        require_admin(principal)
            .and_then(|_| state.store.list_incomes(query.project_id).map_err(ActionError::from)),
    )
}

pub fn delete_income(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Uuid> {
    ActionResult::from_result("delete_income", delete_income_inner(state, principal, id))
}

fn delete_income_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Uuid, ActionError> {
    require_admin(principal)?;
    if !state.store.delete_income(id)? {
        return Err(ActionError::not_found("Income"));
    }
    info!("Income {} deleted", id);
    Ok(id)
}

pub fn record_expense(
    state: &AppState,
    principal: Option<&Principal>,
    input: ExpenseInput,
) -> ActionResult<Expense> {
    ActionResult::from_created("record_expense", record_expense_inner(state, principal, input))
}

fn record_expense_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: ExpenseInput,
) -> Result<Expense, ActionError> {
    let admin = require_admin(principal)?;
    let mut validator = Validator::new()
        .present(input.project_id.as_ref(), "projectId")
        .present(input.amount.as_ref(), "amount")
        .present(input.spent_on.as_ref(), "spentOn")
        .string_required(&input.category, "category")
        .length(&input.category, "category", None, Some(60))
        .optional_length(input.description.as_deref(), "description", 500);
    if let Some(amount) = &input.amount {
        validator = validator
            .positive(amount, "amount")
            .decimal(amount, "amount", 14, 2);
    }
    validator.validate()?;
    let (Some(project_id), Some(amount), Some(spent_on)) =
        (input.project_id, input.amount, input.spent_on)
    else {
        return Err(ActionError::invalid_input("Expense details are incomplete"));
    };
    ensure_project(state, project_id)?;

    let expense = Expense {
        id: Uuid::new_v4(),
        project_id,
        amount,
        spent_on,
        category: input.category.trim().to_string(),
        description: non_blank(input.description),
        recorded_by: admin.user_id,
        created_at: Utc::now(),
    };
    state.store.insert_expense(&expense)?;
    info!("Expense {} of {} for project {}", expense.id, expense.amount, project_id);
    Ok(expense)
}

pub fn list_expenses(
    state: &AppState,
    principal: Option<&Principal>,
    query: FinanceQuery,
) -> ActionResult<Vec<Expense>> {
    ActionResult::from_result(
        "list_expenses",
        require_admin(principal)
            .and_then(|_| state.store.list_expenses(query.project_id).map_err(ActionError::from)),
    )
}

pub fn delete_expense(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Uuid> {
    ActionResult::from_result("delete_expense", delete_expense_inner(state, principal, id))
}

fn delete_expense_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Uuid, ActionError> {
    require_admin(principal)?;
    if !state.store.delete_expense(id)? {
        return Err(ActionError::not_found("Expense"));
    }
    info!("Expense {} deleted", id);
    Ok(id)
}

pub fn project_summary(
    state: &AppState,
    principal: Option<&Principal>,
    project_id: Uuid,
) -> ActionResult<ProjectSummary> {
    ActionResult::from_result(
        "project_summary",
        project_summary_inner(state, principal, project_id),
    )
}

fn project_summary_inner(
    state: &AppState,
    principal: Option<&Principal>,
    project_id: Uuid,
) -> Result<ProjectSummary, ActionError> {
    require_admin(principal)?;
    let project = state
        .store
        .find_project(project_id)?
        .ok_or_else(|| ActionError::not_found("Project"))?;
    let scope = Some(vec![project_id]);

    let income: BigDecimal = state
        .store
        .list_incomes(Some(project_id))?
        .into_iter()
        .map(|i| i.amount)
        .sum();
    let expenses: BigDecimal = state
        .store
        .list_expenses(Some(project_id))?
        .into_iter()
        .map(|e| e.amount)
        .sum();
    let labor_payments: BigDecimal = state
        .store
        .list_payments(&PaymentFilter {
            scope: scope.clone(),
            laborer_id: None,
        })?
        .into_iter()
        .map(|p| p.amount)
        .sum();
    // Value of all stock consumed; restocks raise initial_quantity too.
    let materials: BigDecimal = state
        .store
        .list_items(&ItemFilter {
            scope,
            ..Default::default()
        })?
        .into_iter()
        .map(|item| BigDecimal::from(item.initial_quantity - item.quantity) * item.unit_cost)
        .sum();

    let net = &income - &expenses - &labor_payments - &materials;
    Ok(ProjectSummary {
        project_id,
        project_name: project.name,
        budget: project.budget,
        income,
        expenses,
        labor_payments,
        materials,
        net,
    })
}
