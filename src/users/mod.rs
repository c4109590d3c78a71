//! Supervisor accounts.
//!
//! Every account lives in two places: the identity provider (credentials) and
//! the local `users` table (role, activity, project assignments). Writes that
//! touch both undo the first half when the second half fails.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::action::{blocking_store, ActionError, ActionResult};
use crate::core::middleware::{require_admin, Principal};
use crate::core::shared::enums::Role;
use crate::core::shared::models::{ProjectSupervisor, User};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::non_blank;
use crate::directory::{IdentityError, NewAccount};
use crate::security::validation::Validator;
use crate::store::prelude::*;

pub mod api;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupervisorInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupervisorInput {
    #[serde(default)]
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupervisorQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub project_id: Uuid,
    pub supervisor_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorView {
    #[serde(flatten)]
    pub user: User,
    pub project_ids: Vec<Uuid>,
}

fn validate_profile(name: &str, phone: Option<&str>) -> Validator {
    Validator::new()
        .string_required(name, "name")
        .length(name, "name", Some(2), Some(100))
        .phone(phone, "phone")
}

/// Loads a user that must hold the supervisor role.
fn find_supervisor(state: &AppState, id: Uuid) -> Result<User, ActionError> {
    match state.store.find_user(id)? {
        Some(user) if user.role == Role::Supervisor => Ok(user),
        _ => Err(ActionError::not_found("Supervisor")),
    }
}

pub async fn create_supervisor(
    state: &AppState,
    principal: Option<&Principal>,
    input: CreateSupervisorInput,
) -> ActionResult<User> {
    ActionResult::from_created(
        "create_supervisor",
        create_supervisor_inner(state, principal, input).await,
    )
}

async fn create_supervisor_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: CreateSupervisorInput,
) -> Result<User, ActionError> {
    let admin = require_admin(principal)?;

    let phone = non_blank(input.phone);
    validate_profile(&input.name, phone.as_deref())
        .string_required(&input.email, "email")
        .email(&input.email, "email")
        .password(&input.password)
        .validate()?;

    let email = input.email.trim().to_lowercase();
    let lookup = email.clone();
    let existing = blocking_store(&state.store, move |store| store.find_user_by_email(&lookup)).await?;
    if existing.is_some() {
        return Err(ActionError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let account = NewAccount {
        email: email.clone(),
        name: input.name.trim().to_string(),
        phone: phone.clone(),
        password: input.password,
    };
    let auth_id = state.identity.create_account(&account).await?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        auth_id: auth_id.clone(),
        email,
        name: account.name,
        phone,
        role: Role::Supervisor,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let row = user.clone();
    if let Err(insert_err) = blocking_store(&state.store, move |store| store.insert_user(&row)).await {
        warn!("Local insert of supervisor failed, removing identity account {}", auth_id);
        if let Err(e) = state.identity.delete_account(&auth_id).await {
            error!("Orphaned identity account {} after failed insert: {}", auth_id, e);
        }
        return Err(insert_err);
    }

    info!("Supervisor {} created by {}", user.id, admin.user_id);
    Ok(user)
}

pub fn list_supervisors(
    state: &AppState,
    principal: Option<&Principal>,
    query: SupervisorQuery,
) -> ActionResult<Vec<SupervisorView>> {
    ActionResult::from_result("list_supervisors", list_supervisors_inner(state, principal, query))
}

fn list_supervisors_inner(
    state: &AppState,
    principal: Option<&Principal>,
    query: SupervisorQuery,
) -> Result<Vec<SupervisorView>, ActionError> {
    require_admin(principal)?;
    state
        .store
        .list_users(Some(Role::Supervisor), query.active)?
        .into_iter()
        .map(|user| {
            let project_ids = state.store.supervisor_project_ids(user.id)?;
            Ok(SupervisorView { user, project_ids })
        })
        .collect()
}

pub fn get_supervisor(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<SupervisorView> {
    ActionResult::from_result("get_supervisor", get_supervisor_inner(state, principal, id))
}

fn get_supervisor_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<SupervisorView, ActionError> {
    require_admin(principal)?;
    let user = find_supervisor(state, id)?;
    let project_ids = state.store.supervisor_project_ids(user.id)?;
    Ok(SupervisorView { user, project_ids })
}

pub fn update_supervisor(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: UpdateSupervisorInput,
) -> ActionResult<User> {
    ActionResult::from_result(
        "update_supervisor",
        update_supervisor_inner(state, principal, id, input),
    )
}

fn update_supervisor_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
    input: UpdateSupervisorInput,
) -> Result<User, ActionError> {
    require_admin(principal)?;
    let phone = non_blank(input.phone);
    validate_profile(&input.name, phone.as_deref()).validate()?;

    let mut user = find_supervisor(state, id)?;
    user.name = input.name.trim().to_string();
    user.phone = phone;
    user.updated_at = Utc::now();
    state.store.update_user(&user)?;
    info!("Supervisor {} updated", user.id);
    Ok(user)
}

pub async fn toggle_supervisor_status(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<User> {
    ActionResult::from_result(
        "toggle_supervisor_status",
        toggle_supervisor_status_inner(state, principal, id).await,
    )
}

async fn toggle_supervisor_status_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<User, ActionError> {
    require_admin(principal)?;

    let original = blocking_store(&state.store, move |store| store.find_user(id)).await?;
    let original = match original {
        Some(user) if user.role == Role::Supervisor => user,
        _ => return Err(ActionError::not_found("Supervisor")),
    };

    let mut toggled = original.clone();
    toggled.is_active = !original.is_active;
    toggled.updated_at = Utc::now();
    let row = toggled.clone();
    blocking_store(&state.store, move |store| store.update_user(&row)).await?;

    if let Err(identity_err) = state
        .identity
        .set_account_active(&original.auth_id, toggled.is_active)
        .await
    {
        warn!("Reverting status of supervisor {}: {}", id, identity_err);
        let row = original.clone();
        if let Err(e) = blocking_store(&state.store, move |store| store.update_user(&row)).await {
            error!("Failed to revert status of supervisor {}: {}", id, e);
        }
        return Err(identity_err.into());
    }

    info!("Supervisor {} is now {}", id, if toggled.is_active { "active" } else { "inactive" });
    Ok(toggled)
}

pub async fn delete_supervisor(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> ActionResult<Uuid> {
    ActionResult::from_result(
        "delete_supervisor",
        delete_supervisor_inner(state, principal, id).await,
    )
}

async fn delete_supervisor_inner(
    state: &AppState,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Uuid, ActionError> {
    require_admin(principal)?;

    let (user, submissions, project_ids) = blocking_store(&state.store, move |store| {
        let user = store.find_user(id)?;
        let submissions = store.count_user_submissions(id)?;
        let project_ids = store.supervisor_project_ids(id)?;
        Ok((user, submissions, project_ids))
    })
    .await?;

    let user = match user {
        Some(user) if user.role == Role::Supervisor => user,
        _ => return Err(ActionError::not_found("Supervisor")),
    };
    if submissions > 0 {
        return Err(ActionError::Conflict(
            "Supervisor has submitted requests or reports and cannot be deleted".to_string(),
        ));
    }

    blocking_store(&state.store, move |store| store.delete_user(id)).await?;

    match state.identity.delete_account(&user.auth_id).await {
        Ok(()) => {}
        Err(IdentityError::NotFound) => {
            warn!("Identity account {} was already gone", user.auth_id);
        }
        Err(identity_err) => {
            warn!("Restoring supervisor {} after identity failure: {}", id, identity_err);
            let row = user.clone();
            let restored = blocking_store(&state.store, move |store| {
                store.insert_user(&row)?;
                let now = Utc::now();
                for project_id in project_ids {
                    store.assign_supervisor(&ProjectSupervisor {
                        project_id,
                        supervisor_id: row.id,
                        assigned_at: now,
                    })?;
                }
                Ok(())
            })
            .await;
            if let Err(e) = restored {
                error!("Failed to restore supervisor {}: {}", id, e);
            }
            return Err(identity_err.into());
        }
    }

    info!("Supervisor {} deleted", id);
    Ok(id)
}

pub fn assign_supervisor(
    state: &AppState,
    principal: Option<&Principal>,
    input: AssignmentInput,
) -> ActionResult<ProjectSupervisor> {
    ActionResult::from_created("assign_supervisor", assign_supervisor_inner(state, principal, input))
}

fn assign_supervisor_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: AssignmentInput,
) -> Result<ProjectSupervisor, ActionError> {
    require_admin(principal)?;
    if state.store.find_project(input.project_id)?.is_none() {
        return Err(ActionError::not_found("Project"));
    }
    let supervisor = find_supervisor(state, input.supervisor_id)?;
    if !supervisor.is_active {
        return Err(ActionError::Conflict(
            "Inactive supervisors cannot be assigned to projects".to_string(),
        ));
    }
    if state
        .store
        .project_supervisor_ids(input.project_id)?
        .contains(&supervisor.id)
    {
        return Err(ActionError::Conflict(
            "Supervisor is already assigned to this project".to_string(),
        ));
    }

    let assignment = ProjectSupervisor {
        project_id: input.project_id,
        supervisor_id: supervisor.id,
        assigned_at: Utc::now(),
    };
    state.store.assign_supervisor(&assignment)?;
    info!("Supervisor {} assigned to project {}", supervisor.id, input.project_id);
    Ok(assignment)
}

pub fn unassign_supervisor(
    state: &AppState,
    principal: Option<&Principal>,
    input: AssignmentInput,
) -> ActionResult<AssignmentView> {
    ActionResult::from_result(
        "unassign_supervisor",
        unassign_supervisor_inner(state, principal, input),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub project_id: Uuid,
    pub supervisor_id: Uuid,
}

fn unassign_supervisor_inner(
    state: &AppState,
    principal: Option<&Principal>,
    input: AssignmentInput,
) -> Result<AssignmentView, ActionError> {
    require_admin(principal)?;
    if !state
        .store
        .unassign_supervisor(input.project_id, input.supervisor_id)?
    {
        return Err(ActionError::not_found("Assignment"));
    }
    info!(
        "Supervisor {} removed from project {}",
        input.supervisor_id, input.project_id
    );
    Ok(AssignmentView {
        project_id: input.project_id,
        supervisor_id: input.supervisor_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ErrorCode;
    use crate::core::shared::enums::ProjectStatus;
    use crate::core::shared::test_utils::{IdentityCall, MockIdentityProvider, TestHarness};

    fn input(email: &str) -> CreateSupervisorInput {
        CreateSupervisorInput {
            name: "Grace Wanjiru".to_string(),
            email: email.to_string(),
            phone: Some("+254712345678".to_string()),
            password: "Sturdy123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_supervisor() {
        let h = TestHarness::new();
        let admin = h.admin();

        let outcome = create_supervisor(&h.state, Some(&admin), input("Grace@Yard.io")).await;
        assert!(outcome.success);
        assert!(outcome.is_created());
        let user = outcome.data.unwrap();
        assert_eq!(user.email, "grace@yard.io");
        assert_eq!(user.role, Role::Supervisor);
        assert_eq!(user.auth_id, "idp-1");
        assert!(h.store.find_user(user.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_supervisor_requires_admin() {
        let h = TestHarness::new();
        let sup = h.supervisor("Peter Kamau");

        let anonymous = create_supervisor(&h.state, None, input("a@yard.io")).await;
        assert_eq!(anonymous.code, Some(ErrorCode::Unauthorized));
        let forbidden = create_supervisor(&h.state, Some(&sup), input("a@yard.io")).await;
        assert_eq!(forbidden.code, Some(ErrorCode::Forbidden));
        assert!(h.identity.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_supervisor_collects_field_errors() {
        let h = TestHarness::new();
        let admin = h.admin();
        let bad = CreateSupervisorInput {
            name: "G".to_string(),
            email: "not-an-email".to_string(),
            phone: Some("12".to_string()),
            password: "weak".to_string(),
        };

        let outcome = create_supervisor(&h.state, Some(&admin), bad).await;
        assert_eq!(outcome.code, Some(ErrorCode::ValidationError));
        let fields = outcome.field_errors.unwrap();
        for key in ["name", "email", "phone", "password"] {
            assert!(fields.contains_key(key), "missing {}", key);
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_before_identity_call() {
        let h = TestHarness::new();
        let admin = h.admin();
        let existing = h.supervisor_user("Grace Wanjiru");

        let outcome =
            create_supervisor(&h.state, Some(&admin), input(&existing.email.to_uppercase())).await;
        assert_eq!(outcome.code, Some(ErrorCode::Conflict));
        assert!(h.identity.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_identity_duplicate_is_conflict() {
        let h = TestHarness::new();
        let admin = h.admin();
        MockIdentityProvider::set(&h.identity.conflict_on_create, true);

        let outcome = create_supervisor(&h.state, Some(&admin), input("new@yard.io")).await;
        assert_eq!(outcome.code, Some(ErrorCode::Conflict));
        assert!(h.store.find_user_by_email("new@yard.io").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_insert_deletes_identity_account() {
        let h = TestHarness::new();
        let admin = h.admin();
        h.store.fail_user_writes(true);

        let outcome = create_supervisor(&h.state, Some(&admin), input("new@yard.io")).await;
        assert_eq!(outcome.code, Some(ErrorCode::ServerError));
        assert_eq!(
            h.identity.recorded_calls().await,
            vec![
                IdentityCall::Create("new@yard.io".to_string()),
                IdentityCall::Delete("idp-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_double_toggle_restores_status() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor_user("Amina Hassan");

        let first = toggle_supervisor_status(&h.state, Some(&admin), sup.id).await;
        assert!(!first.data.unwrap().is_active);
        let second = toggle_supervisor_status(&h.state, Some(&admin), sup.id).await;
        assert!(second.data.unwrap().is_active);
        assert!(h.store.find_user(sup.id).unwrap().unwrap().is_active);
        assert_eq!(
            h.identity.recorded_calls().await,
            vec![
                IdentityCall::SetActive(sup.auth_id.clone(), false),
                IdentityCall::SetActive(sup.auth_id.clone(), true),
            ]
        );
    }

    #[tokio::test]
    async fn test_toggle_reverts_when_identity_fails() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor_user("Amina Hassan");
        MockIdentityProvider::set(&h.identity.fail_set_active, true);

        let outcome = toggle_supervisor_status(&h.state, Some(&admin), sup.id).await;
        assert_eq!(outcome.code, Some(ErrorCode::ServerError));
        assert!(h.store.find_user(sup.id).unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_toggle_unknown_or_admin_is_not_found() {
        let h = TestHarness::new();
        let admin = h.admin();
        let outcome = toggle_supervisor_status(&h.state, Some(&admin), admin.user_id).await;
        assert_eq!(outcome.code, Some(ErrorCode::NotFound));
        let outcome = toggle_supervisor_status(&h.state, Some(&admin), Uuid::new_v4()).await;
        assert_eq!(outcome.code, Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn test_delete_supervisor() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor_user("Otieno Ouma");
        let project = h.project("Lavington", ProjectStatus::Active);
        h.assign(project.id, sup.id);

        let outcome = delete_supervisor(&h.state, Some(&admin), sup.id).await;
        assert!(outcome.success);
        assert!(h.store.find_user(sup.id).unwrap().is_none());
        assert!(h.store.project_supervisor_ids(project.id).unwrap().is_empty());
        assert_eq!(
            h.identity.recorded_calls().await,
            vec![IdentityCall::Delete(sup.auth_id.clone())]
        );
    }

    #[tokio::test]
    async fn test_delete_restores_when_identity_fails() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor_user("Otieno Ouma");
        let project = h.project("Lavington", ProjectStatus::Active);
        h.assign(project.id, sup.id);
        MockIdentityProvider::set(&h.identity.fail_delete, true);

        let outcome = delete_supervisor(&h.state, Some(&admin), sup.id).await;
        assert_eq!(outcome.code, Some(ErrorCode::ServerError));
        assert!(h.store.find_user(sup.id).unwrap().is_some());
        assert_eq!(h.store.project_supervisor_ids(project.id).unwrap(), vec![sup.id]);
    }

    #[tokio::test]
    async fn test_delete_with_submissions_conflicts() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor_user("Otieno Ouma");
        let project = h.project("Lavington", ProjectStatus::Active);
        let now = Utc::now();
        h.store
            .insert_labor_request(&crate::core::shared::models::LaborRequest {
                id: Uuid::new_v4(),
                project_id: project.id,
                requested_by: sup.id,
                worker_type: crate::core::shared::enums::WorkerType::Temporary,
                headcount: 3,
                needed_from: now.date_naive(),
                needed_until: None,
                notes: None,
                status: crate::core::shared::enums::RequestStatus::Pending,
                reviewed_by: None,
                reviewed_at: None,
                review_note: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let outcome = delete_supervisor(&h.state, Some(&admin), sup.id).await;
        assert_eq!(outcome.code, Some(ErrorCode::Conflict));
        assert!(h.store.find_user(sup.id).unwrap().is_some());
        assert!(h.identity.recorded_calls().await.is_empty());
    }

    #[test]
    fn test_assign_and_unassign() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor_user("Otieno Ouma");
        let project = h.project("Lavington", ProjectStatus::Active);
        let pair = AssignmentInput {
            project_id: project.id,
            supervisor_id: sup.id,
        };

        assert!(assign_supervisor(&h.state, Some(&admin), pair.clone()).success);
        assert_eq!(
            assign_supervisor(&h.state, Some(&admin), pair.clone()).code,
            Some(ErrorCode::Conflict)
        );
        assert!(unassign_supervisor(&h.state, Some(&admin), pair.clone()).success);
        assert_eq!(
            unassign_supervisor(&h.state, Some(&admin), pair).code,
            Some(ErrorCode::NotFound)
        );
    }

    #[test]
    fn test_assign_guards() {
        let h = TestHarness::new();
        let admin = h.admin();
        let mut sup = h.supervisor_user("Otieno Ouma");
        let project = h.project("Lavington", ProjectStatus::Active);

        let unknown_project = AssignmentInput {
            project_id: Uuid::new_v4(),
            supervisor_id: sup.id,
        };
        assert_eq!(
            assign_supervisor(&h.state, Some(&admin), unknown_project).code,
            Some(ErrorCode::NotFound)
        );

        sup.is_active = false;
        h.store.update_user(&sup).unwrap();
        let inactive = AssignmentInput {
            project_id: project.id,
            supervisor_id: sup.id,
        };
        assert_eq!(
            assign_supervisor(&h.state, Some(&admin), inactive).code,
            Some(ErrorCode::Conflict)
        );
    }

    #[test]
    fn test_update_and_list_supervisors() {
        let h = TestHarness::new();
        let admin = h.admin();
        let sup = h.supervisor_user("Otieno Ouma");

        let updated = update_supervisor(
            &h.state,
            Some(&admin),
            sup.id,
            UpdateSupervisorInput {
                name: "  Otieno O. Ouma ".to_string(),
                phone: Some("   ".to_string()),
            },
        );
        let user = updated.data.unwrap();
        assert_eq!(user.name, "Otieno O. Ouma");
        assert_eq!(user.phone, None);

        let listed = list_supervisors(&h.state, Some(&admin), SupervisorQuery::default());
        let views = listed.data.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].user.id, sup.id);

        let inactive_only = list_supervisors(
            &h.state,
            Some(&admin),
            SupervisorQuery { active: Some(false) },
        );
        assert!(inactive_only.data.unwrap().is_empty());

        assert_eq!(
            get_supervisor(&h.state, Some(&admin), admin.user_id).code,
            Some(ErrorCode::NotFound)
        );
    }
}
