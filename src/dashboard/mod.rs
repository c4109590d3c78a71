use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{require_admin, Principal};
use crate::core::shared::enums::{ProjectStatus, RequestStatus};
use crate::core::shared::state::AppState;
use crate::store::prelude::*;
use crate::store::{ItemFilter, LaborerFilter, ProjectFilter, RequestFilter};

pub mod api;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_projects: usize,
    /// Every status is present, zero when no project holds it.
    pub projects_by_status: BTreeMap<String, usize>,
    pub active_laborers: usize,
    pub pending_material_requests: usize,
    pub pending_labor_requests: usize,
    pub low_stock_items: usize,
}

pub fn overview(state: &AppState, principal: Option<&Principal>) -> ActionResult<Overview> {
    ActionResult::from_result("overview", overview_inner(state, principal))
}

fn overview_inner(state: &AppState, principal: Option<&Principal>) -> Result<Overview, ActionError> {
    require_admin(principal)?;
    let store = state.store.as_ref();

    let projects = store.list_projects(&ProjectFilter::default())?;
    let mut projects_by_status: BTreeMap<String, usize> = ProjectStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    for project in &projects {
        *projects_by_status
            .entry(project.status.as_str().to_string())
            .or_default() += 1;
    }

    let pending = RequestFilter {
        scope: None,
        status: Some(RequestStatus::Pending),
    };
    Ok(Overview {
        total_projects: projects.len(),
        projects_by_status,
        active_laborers: store
            .list_laborers(&LaborerFilter {
                scope: None,
                active: Some(true),
            })?
            .len(),
        pending_material_requests: store.list_material_requests(&pending)?.len(),
        pending_labor_requests: store.list_labor_requests(&pending)?.len(),
        low_stock_items: store
            .list_items(&ItemFilter {
                low_stock_only: true,
                ..Default::default()
            })?
            .len(),
    })
}
