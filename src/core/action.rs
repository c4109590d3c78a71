//! Uniform result envelope returned by every business action.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::directory::IdentityError;
use crate::security::validation::{ValidationError, ValidationResult};
use crate::store::{Store, StoreError, StoreResult};

const MASKED_SERVER_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ServerError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Server(String),
}

impl ActionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Server(_) => ErrorCode::ServerError,
        }
    }

    /// Validation failure pinned to one field.
    pub fn field(field: &str, message: &str) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.to_string(), message.to_string());
        Self::Validation {
            message: "Validation failed".to_string(),
            field_errors,
        }
    }

    /// Validation failure with no field attached, e.g. a malformed body.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    pub fn unauthenticated() -> Self {
        Self::Unauthorized("Authentication required".to_string())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("You don't have permission to perform this action".to_string())
    }
}

impl From<ValidationResult> for ActionError {
    fn from(result: ValidationResult) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            field_errors: result.field_errors(),
        }
    }
}

impl From<ValidationError> for ActionError {
    fn from(error: ValidationError) -> Self {
        ValidationResult::single(error).into()
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found("Record"),
            StoreError::UniqueViolation(constraint) => {
                debug!("Unique constraint {} rejected the write", constraint);
                Self::Conflict("A record with the same details already exists".to_string())
            }
            StoreError::ForeignKeyViolation(constraint) => {
                debug!("Foreign key {} rejected the write", constraint);
                Self::Conflict("The record is referenced by other data".to_string())
            }
            other => Self::Server(other.to_string()),
        }
    }
}

impl From<IdentityError> for ActionError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::AlreadyExists => {
                Self::Conflict("An account with this email already exists".to_string())
            }
            IdentityError::NotFound => Self::not_found("Identity account"),
            other => Self::Server(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    created: bool,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            code: None,
            field_errors: None,
            data: Some(data),
            created: false,
        }
    }

    /// Success that answers with 201 over HTTP.
    pub fn created(data: T) -> Self {
        Self {
            created: true,
            ..Self::ok(data)
        }
    }

    pub fn failure(err: ActionError) -> Self {
        let code = err.code();
        let (message, field_errors) = match err {
            ActionError::Validation {
                message,
                field_errors,
            } => {
                let fields = if field_errors.is_empty() {
                    None
                } else {
                    Some(field_errors)
                };
                (message, fields)
            }
            ActionError::Server(_) => (MASKED_SERVER_MESSAGE.to_string(), None),
            other => (other.to_string(), None),
        };
        Self {
            success: false,
            message: Some(message),
            code: Some(code),
            field_errors,
            data: None,
            created: false,
        }
    }

    /// Converts an action outcome, logging failures under the action name.
    pub fn from_result(action: &str, result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => {
                match &err {
                    ActionError::Server(detail) => error!("{} failed: {}", action, detail),
                    ActionError::Validation { field_errors, .. } => {
                        debug!("{} rejected input: {:?}", action, field_errors)
                    }
                    ActionError::Unauthorized(_) | ActionError::Forbidden(_) => {
                        warn!("{} denied: {}", action, err)
                    }
                    other => debug!("{} refused: {}", action, other),
                }
                Self::failure(err)
            }
        }
    }

    /// Like [`ActionResult::from_result`], answering 201 on success.
    pub fn from_created(action: &str, result: Result<T, ActionError>) -> Self {
        let mut outcome = Self::from_result(action, result);
        outcome.created = outcome.success;
        outcome
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn status(&self) -> StatusCode {
        match (self.success, self.code) {
            (true, _) if self.created => StatusCode::CREATED,
            (true, _) => StatusCode::OK,
            (false, Some(code)) => code.status(),
            (false, None) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResult<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Runs a synchronous action on the blocking pool.
pub async fn run_blocking<T, F>(action: &'static str, f: F) -> ActionResult<T>
where
    F: FnOnce() -> ActionResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(outcome) => outcome,
        Err(e) => ActionResult::from_result(
            action,
            Err(ActionError::Server(format!("task join error: {}", e))),
        ),
    }
}

/// Runs store calls from async actions without stalling the runtime.
pub async fn blocking_store<T, F>(store: &Arc<dyn Store>, f: F) -> Result<T, ActionError>
where
    F: FnOnce(&dyn Store) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| ActionError::Server(format!("task join error: {}", e)))?
        .map_err(ActionError::from)
}

fn rejection_response(message: String) -> Response {
    ActionResult::<()>::failure(ActionError::invalid_input(message)).into_response()
}

/// `Json` extractor whose rejection is a VALIDATION_ERROR envelope.
pub struct ActionJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ActionJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let rejection: JsonRejection = rejection;
                Err(rejection_response(rejection.body_text()))
            }
        }
    }
}

/// `Path` extractor whose rejection is a VALIDATION_ERROR envelope.
pub struct ActionPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ActionPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection| rejection_response(rejection.body_text()))
    }
}

/// `Query` extractor whose rejection is a VALIDATION_ERROR envelope.
pub struct ActionQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ActionQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| rejection_response(rejection.body_text()))
    }
}
