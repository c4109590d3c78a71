use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::find_laborer;
use crate::core::action::{ActionError, ActionResult};
use crate::core::middleware::{authorize, ensure_project_access, resolve_scope, Principal};
use crate::core::shared::enums::{AttendanceStatus, Role};
use crate::core::shared::models::Attendance;
use crate::core::shared::state::AppState;
use crate::security::validation::Validator;
use crate::store::prelude::*;
use crate::store::AttendanceFilter;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub laborer_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub work_date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub hours_worked: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub project_id: Option<Uuid>,
    pub laborer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub fn record_attendance(
    state: &AppState,
    principal: Option<&Principal>,
    input: AttendanceInput,
) -> ActionResult<Attendance> {
    ActionResult::from_created(
        "record_attendance",
        record_attendance_inner(state, principal, input),
    )
}

fn record_attendance_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: AttendanceInput,
) -> Result<Attendance, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    let mut validator = Validator::new()
        .present(input.laborer_id.as_ref(), "laborerId")
        .present(input.project_id.as_ref(), "projectId")
        .present(input.work_date.as_ref(), "workDate")
        .present(input.status.as_ref(), "status");
    if let Some(hours) = &input.hours_worked {
        validator = validator.range(
            hours,
            "hoursWorked",
            Some(BigDecimal::from(0)),
            Some(BigDecimal::from(24)),
        )
        .decimal(hours, "hoursWorked", 4, 2);
    }
    validator.validate()?;
    let (Some(laborer_id), Some(project_id), Some(work_date), Some(status)) =
        (input.laborer_id, input.project_id, input.work_date, input.status)
    else {
        return Err(ActionError::invalid_input("Attendance details are incomplete"));
    };

    if state.store.find_project(project_id)?.is_none() {
        return Err(ActionError::not_found("Project"));
    }
    ensure_project_access(state.store.as_ref(), principal, project_id)?;
    let laborer = find_laborer(state, laborer_id)?;
    // Supervisors only mark laborers assigned to the same project.
    if !principal.is_admin() && laborer.project_id != Some(project_id) {
        return Err(ActionError::forbidden());
    }
    if !laborer.is_active {
        return Err(ActionError::Conflict(format!(
            "{} is inactive; reactivate the laborer before recording attendance",
            laborer.name
        )));
    }
    if state.store.find_attendance(laborer_id, work_date)?.is_some() {
        return Err(ActionError::Conflict(format!(
            "Attendance for {} on {} is already recorded",
            laborer.name, work_date
        )));
    }

    let record = Attendance {
        id: Uuid::new_v4(),
        laborer_id,
        project_id,
        work_date,
        status,
        hours_worked: input.hours_worked,
        recorded_by: principal.user_id,
        created_at: Utc::now(),
    };
    state.store.insert_attendance(&record)?;
    info!(
        "Attendance {} for laborer {} on {}",
        record.status, laborer_id, work_date
    );
    Ok(record)
}

pub fn list_attendance(
    state: &AppState,
    principal: Option<&Principal>,
    query: AttendanceQuery,
) -> ActionResult<Vec<Attendance>> {
    ActionResult::from_result("list_attendance", list_attendance_inner(state, principal, query))
}

fn list_attendance_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: AttendanceQuery,
) -> Result<Vec<Attendance>, ActionError> {
    let principal = authorize(principal, &[Role::SuperAdmin, Role::Supervisor])?;
    Validator::new()
        .date_order(query.from, query.to, "to")
        .validate()?;
    let scope = resolve_scope(state.store.as_ref(), principal, query.project_id)?;
    Ok(state.store.list_attendance(&AttendanceFilter {
        scope,
        laborer_id: query.laborer_id,
        from: query.from,
        to: query.to,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ErrorCode;
    use crate::core::shared::enums::ProjectStatus;
    use crate::core::shared::test_utils::{date, TestHarness};
    use crate::labor::toggle_laborer_status;

    fn input(laborer_id: Uuid, project_id: Uuid, day: u32) -> AttendanceInput {
        AttendanceInput {
            laborer_id: Some(laborer_id),
            project_id: Some(project_id),
            work_date: Some(date(2024, 4, day)),
            status: Some(AttendanceStatus::Present),
            hours_worked: Some(BigDecimal::from(8)),
        }
    }

    #[test]
    fn test_one_record_per_laborer_per_day() {
        let h = TestHarness::new();
        let sup = h.supervisor("Peter Kamau");
        let project = h.project("Karen Gardens", ProjectStatus::Active);
        h.assign(project.id, sup.user_id);
        let laborer = h.laborer("John Otieno", Some(project.id));

        let first = record_attendance(&h.state, Some(&sup), input(laborer.id, project.id, 1));
        assert!(first.is_created());
        assert_eq!(first.data.unwrap().recorded_by, sup.user_id);

        let again = record_attendance(&h.state, Some(&sup), input(laborer.id, project.id, 1));
        assert_eq!(again.code, Some(ErrorCode::Conflict));
        assert!(record_attendance(&h.state, Some(&sup), input(laborer.id, project.id, 2)).success);
    }

    #[test]
    fn test_inactive_laborer_conflicts() {
        let h = TestHarness::new();
        let admin = h.admin();
        let project = h.project("Karen Gardens", ProjectStatus::Active);
        let laborer = h.laborer("John Otieno", Some(project.id));
        assert!(toggle_laborer_status(&h.state, Some(&admin), laborer.id).success);

        let outcome = record_attendance(&h.state, Some(&admin), input(laborer.id, project.id, 1));
        assert_eq!(outcome.code, Some(ErrorCode::Conflict));
    }

    #[test]
    fn test_hours_and_missing_fields() {
        let h = TestHarness::new();
        let admin = h.admin();
        let project = h.project("Karen Gardens", ProjectStatus::Active);
        let laborer = h.laborer("John Otieno", Some(project.id));

        let mut long_day = input(laborer.id, project.id, 1);
        long_day.hours_worked = Some(BigDecimal::from(25));
        let fields = record_attendance(&h.state, Some(&admin), long_day)
            .field_errors
            .unwrap();
        assert_eq!(fields["hoursWorked"], "must be between 0 and 24");

        let fields = record_attendance(&h.state, Some(&admin), AttendanceInput::default())
            .field_errors
            .unwrap();
        for field in ["laborerId", "projectId", "workDate", "status"] {
            assert!(fields.contains_key(field), "missing {}", field);
        }
    }

    #[test]
    fn test_supervisor_outside_project() {
        let h = TestHarness::new();
        let sup = h.supervisor("Peter Kamau");
        let project = h.project("Karen Gardens", ProjectStatus::Active);
        let laborer = h.laborer("John Otieno", Some(project.id));

        let outcome = record_attendance(&h.state, Some(&sup), input(laborer.id, project.id, 1));
        assert_eq!(outcome.code, Some(ErrorCode::Forbidden));
        let unknown = record_attendance(&h.state, Some(&sup), input(Uuid::new_v4(), Uuid::new_v4(), 1));
        assert_eq!(unknown.code, Some(ErrorCode::NotFound));
    }

    #[test]
    fn test_supervisor_cannot_mark_foreign_laborer() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor("Peter Kamau");
        let karen = h.project("Karen Gardens", ProjectStatus::Active);
        let runda = h.project("Runda Estate", ProjectStatus::Active);
        h.assign(karen.id, sup.user_id);
        let foreign = h.laborer("Mary Akinyi", Some(runda.id));
        let floating = h.laborer("James Mwangi", None);

        for laborer_id in [foreign.id, floating.id] {
            let outcome = record_attendance(&h.state, Some(&sup), input(laborer_id, karen.id, 1));
            assert_eq!(outcome.code, Some(ErrorCode::Forbidden));
        }
        assert_eq!(h.store.laborer_history_counts(foreign.id).unwrap(), (0, 0));

        assert!(record_attendance(&h.state, Some(&admin), input(foreign.id, karen.id, 1)).success);
    }

    #[test]
    fn test_list_attendance_by_range() {
        let h = TestHarness::new();
        let admin = h.admin();
        let project = h.project("Karen Gardens", ProjectStatus::Active);
        let laborer = h.laborer("John Otieno", Some(project.id));
        for day in [1, 2, 3, 10] {
            assert!(record_attendance(&h.state, Some(&admin), input(laborer.id, project.id, day)).success);
        }

        let query = AttendanceQuery {
            laborer_id: Some(laborer.id),
            from: Some(date(2024, 4, 2)),
            to: Some(date(2024, 4, 9)),
            ..Default::default()
        };
        let rows = list_attendance(&h.state, Some(&admin), query).data.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].work_date, date(2024, 4, 3));

        let backwards = AttendanceQuery {
            from: Some(date(2024, 4, 9)),
            to: Some(date(2024, 4, 2)),
            ..Default::default()
        };
        assert_eq!(
            list_attendance(&h.state, Some(&admin), backwards).code,
            Some(ErrorCode::ValidationError)
        );
    }
}
