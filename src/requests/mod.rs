//! Supervisor asks for more material or more hands, reviewed by an admin.
//!
//! Both kinds share one review lifecycle: a request starts PENDING and is
//! decided exactly once.

use serde::Deserialize;
use uuid::Uuid;

use crate::core::action::ActionError;
use crate::core::shared::enums::RequestStatus;
use crate::core::shared::utils::non_blank;
use crate::security::validation::{ValidationError, Validator};

pub mod api;
pub mod labor;
pub mod material;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQuery {
    pub project_id: Option<Uuid>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub decision: Option<RequestStatus>,
    pub note: Option<String>,
}

/// A validated review: the final status and the reviewer's note.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decision {
    pub status: RequestStatus,
    pub note: Option<String>,
}

impl ReviewInput {
    pub(crate) fn into_decision(self) -> Result<Decision, ActionError> {
        let note = non_blank(self.note);
        let decision = self.decision;
        Validator::new()
            .present(decision.as_ref(), "decision")
            .custom(|| match decision {
                Some(RequestStatus::Pending) => Some(ValidationError::InvalidValue {
                    field: "decision".to_string(),
                    message: "must be APPROVED or REJECTED".to_string(),
                }),
                _ => None,
            })
            .custom(|| match (decision, &note) {
                (Some(RequestStatus::Rejected), None) => Some(ValidationError::InvalidValue {
                    field: "note".to_string(),
                    message: "is required when rejecting a request".to_string(),
                }),
                _ => None,
            })
            .optional_length(note.as_deref(), "note", 500)
            .validate()?;
        let status = decision.ok_or_else(|| ActionError::field("decision", "is required"))?;
        Ok(Decision { status, note })
    }
}

/// Only pending requests may be decided.
pub(crate) fn ensure_pending(status: RequestStatus) -> Result<(), ActionError> {
    if status == RequestStatus::Pending {
        Ok(())
    } else {
        Err(ActionError::Conflict(format!(
            "Request has already been {}",
            status.as_str().to_lowercase()
        )))
    }
}
