use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{authorize, ensure_project_access, resolve_scope, Principal};
use crate::core::shared::enums::Role;
use crate::core::shared::models::DailyReport;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::ReportFilter;

pub mod api;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportInput {
    pub project_id: Option<Uuid>,
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub work_summary: String,
    pub issues: Option<String>,
    pub weather: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub project_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// One report per supervisor, project and day.
pub fn submit_daily_report(
    state: &AppState,
    principal: Option<&Principal>,
    input: DailyReportInput,
) -> ActionResult<DailyReport> {
    ActionResult::from_created(
        "submit_daily_report",
        submit_daily_report_inner(state, principal, input),
    )
}

fn submit_daily_report_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: DailyReportInput,
) -> Result<DailyReport, ActionError> {
    let supervisor = authorize(principal, &[Role::Supervisor])?;
    Validator::new()
        .present(input.project_id.as_ref(), "projectId")
        .present(input.report_date.as_ref(), "reportDate")
        .string_required(&input.work_summary, "workSummary")
        .length(&input.work_summary, "workSummary", Some(10), Some(4000))
        .optional_length(input.issues.as_deref(), "issues", 2000)
        .optional_length(input.weather.as_deref(), "weather", 100)
        .validate()?;
    let (Some(project_id), Some(report_date)) = (input.project_id, input.report_date) else {
        return Err(ActionError::invalid_input("Report details are incomplete"));
    };
    if state.store.find_project(project_id)?.is_none() {
        return Err(ActionError::not_found("Project"));
    }
    ensure_project_access(state.store.as_ref(), supervisor, project_id)?;
    if state
        .store
        .find_daily_report(project_id, supervisor.user_id, report_date)?
        .is_some()
    {
        return Err(ActionError::Conflict(format!(
            "A report for {} has already been submitted",
            report_date
        )));
    }

    let report = DailyReport {
        id: Uuid::new_v4(),
        project_id,
        supervisor_id: supervisor.user_id,
        report_date,
        work_summary: input.work_summary.trim().to_string(),
        issues: non_blank(input.issues),
        weather: non_blank(input.weather),
        created_at: Utc::now(),
    };
    state.store.insert_daily_report(&report)?;
    info!(
        "Daily report {} for project {} on {}",
        report.id, project_id, report_date
    );
    Ok(report)
}

pub fn list_daily_reports(
    state: &AppState,
    principal: Option<&Principal>,
    query: ReportQuery,
) -> ActionResult<Vec<DailyReport>> {
    ActionResult::from_result(
        "list_daily_reports",
        list_daily_reports_inner(state, principal, query),
    )
}

fn list_daily_reports_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: ReportQuery,
) -> Result<Vec<DailyReport>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    Validator::new()
        .date_order(query.from, query.to, "to")
        .validate()?;
    let scope = resolve_scope(state.store.as_ref(), principal, query.project_id)?;
    Ok(state.store.list_daily_reports(&ReportFilter {
        scope,
        from: query.from,
        to: query.to,
    })?)
}
