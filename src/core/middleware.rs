use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::action::{run_blocking, ActionError, ActionResult};
use crate::core::shared::enums::Role;
use crate::core::shared::models::User;
use crate::core::shared::state::AppState;
use crate::store::prelude::*;
use crate::store::ProjectScope;

/// Caller identity resolved from the bearer token and the local user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

fn bearer_token(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn resolve_principal(state: &AppState, token: &str) -> Option<Principal> {
    let auth_id = match state.identity.introspect(token).await {
        Ok(Some(subject)) => subject,
        Ok(None) => {
            debug!("Bearer token is not active");
            return None;
        }
        Err(e) => {
            warn!("Token introspection failed: {}", e);
            return None;
        }
    };

    let store = state.store.clone();
    let lookup = tokio::task::spawn_blocking(move || store.find_user_by_auth_id(&auth_id)).await;
    match lookup {
        Ok(Ok(Some(user))) if user.is_active => Some(Principal::from(&user)),
        Ok(Ok(Some(user))) => {
            debug!("User {} is deactivated", user.id);
            None
        }
        Ok(Ok(None)) => {
            debug!("Token subject has no local account");
            None
        }
        Ok(Err(e)) => {
            warn!("Failed to load user for token: {}", e);
            None
        }
        Err(e) => {
            warn!("User lookup task failed: {}", e);
            None
        }
    }
}

/// Attaches the caller's [`Principal`] to the request when the token resolves.
/// Never rejects; actions decide what an anonymous caller may do.
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request) {
        if let Some(principal) = resolve_principal(&state, &token).await {
            request.extensions_mut().insert(principal);
        }
    }
    next.run(request).await
}

/// Optional principal for handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Principal>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}

pub fn authorize<'a>(
    principal: Option<&'a Principal>,
    allowed: &[Role],
) -> Result<&'a Principal, ActionError> {
    let principal = principal.ok_or_else(ActionError::unauthenticated)?;
    if allowed.contains(&principal.role) {
        Ok(principal)
    } else {
        Err(ActionError::forbidden())
    }
}

pub fn require_admin(principal: Option<&Principal>) -> Result<&Principal, ActionError> {
    authorize(principal, &[Role::SuperAdmin])
}

/// Admins see everything; supervisors only the projects they are assigned to.
pub fn ensure_project_access(
    store: &dyn Store,
    principal: &Principal,
    project_id: Uuid,
) -> Result<(), ActionError> {
    if principal.is_admin() {
        return Ok(());
    }
    let assigned = store.supervisor_project_ids(principal.user_id)?;
    if assigned.contains(&project_id) {
        Ok(())
    } else {
        Err(ActionError::Forbidden(
            "You are not assigned to this project".to_string(),
        ))
    }
}

/// Project scope for listings, narrowed to `requested` when given.
pub fn resolve_scope(
    store: &dyn Store,
    principal: &Principal,
    requested: Option<Uuid>,
) -> Result<ProjectScope, ActionError> {
    if principal.is_admin() {
        return Ok(requested.map(|id| vec![id]));
    }
    let assigned = store.supervisor_project_ids(principal.user_id)?;
    match requested {
        Some(id) if assigned.contains(&id) => Ok(Some(vec![id])),
        Some(_) => Err(ActionError::Forbidden(
            "You are not assigned to this project".to_string(),
        )),
        None => Ok(Some(assigned)),
    }
}

/// The caller's own user row.
pub fn current_user(state: &AppState, principal: Option<&Principal>) -> ActionResult<User> {
    ActionResult::from_result("current_user", current_user_inner(state, principal))
}

fn current_user_inner(state: &AppState, principal: Option<&Principal>) -> Result<User, ActionError> {
    let principal = principal.ok_or_else(ActionError::unauthenticated)?;
    state
        .store
        .find_user(principal.user_id)?
        .ok_or_else(|| ActionError::not_found("User"))
}

pub async fn current_user_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> ActionResult<User> {
    run_blocking("current_user", move || current_user(&state, principal.as_ref())).await
}
