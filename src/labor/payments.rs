use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::find_laborer;
use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{require_admin, resolve_scope, Principal};
use crate::core::shared::enums::PaymentMethod;
use crate::core::shared::models::Payment;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::PaymentFilter;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub laborer_id: Option<Uuid>,
    pub amount: Option<BigDecimal>,
    pub paid_on: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
    pub project_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub laborer_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

pub fn record_payment(
    state: &AppState,
    principal: Option<&Principal>,
    input: PaymentInput,
) -> ActionResult<Payment> {
    ActionResult::from_created("record_payment", record_payment_inner(state, principal, input))
}

fn record_payment_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: PaymentInput,
) -> Result<Payment, ActionError> {
    let admin = require_admin(principal)?;
    let mut validator = Validator::new()
        .present(input.laborer_id.as_ref(), "laborerId")
        .present(input.amount.as_ref(), "amount")
        .present(input.paid_on.as_ref(), "paidOn")
        .present(input.method.as_ref(), "method")
        .optional_length(input.notes.as_deref(), "notes", 500);
    if let Some(amount) = &input.amount {
        validator = validator
            .positive(amount, "amount")
            .decimal(amount, "amount", 12, 2);
    }
    validator.validate()?;
    let (Some(laborer_id), Some(amount), Some(paid_on), Some(method)) =
        (input.laborer_id, input.amount, input.paid_on, input.method)
    else {
        return Err(ActionError::invalid_input("Payment details are incomplete"));
    };

    let laborer = find_laborer(state, laborer_id)?;
    if let Some(project_id) = input.project_id {
        if state.store.find_project(project_id)?.is_none() {
            return Err(ActionError::not_found("Project"));
        }
    }

    let payment = Payment {
        id: Uuid::new_v4(),
        laborer_id: laborer.id,
        project_id: input.project_id,
        amount,
        paid_on,
        method,
        notes: non_blank(input.notes),
        recorded_by: admin.user_id,
        created_at: Utc::now(),
    };
    state.store.insert_payment(&payment)?;
    info!(
        "Payment {} of {} ({}) to laborer {}",
        payment.id, payment.amount, payment.method, laborer.id
    );
    Ok(payment)
}

pub fn list_payments(
    state: &AppState,
    principal: Option<&Principal>,
    query: PaymentQuery,
) -> ActionResult<Vec<Payment>> {
    ActionResult::from_result("list_payments", list_payments_inner(state, principal, query))
}

fn list_payments_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: PaymentQuery,
) -> Result<Vec<Payment>, ActionError> {
    let admin = require_admin(principal)?;
    let scope = resolve_scope(state.store.as_ref(), admin, query.project_id)?;
    Ok(state.store.list_payments(&PaymentFilter {
        scope,
        laborer_id: query.laborer_id,
    })?)
}
