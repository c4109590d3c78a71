//! First-run setup: the administrator account cannot be created through the API.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::core::action::ActionError;
use crate::core::shared::enums::Role;
use crate::core::shared::models::User;
use crate::security::validation::Validator;
use crate::store::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    /// Subject of an account that already exists at the identity provider.
    pub auth_id: String,
    pub email: String,
    pub name: String,
}

impl AdminSeed {
    /// Parses `<auth-id> <email> <name...>`; the name may span several arguments.
    pub fn from_args(args: &[String]) -> Option<Self> {
        match args {
            [auth_id, email, name @ ..] if !name.is_empty() => Some(Self {
                auth_id: auth_id.clone(),
                email: email.clone(),
                name: name.join(" "),
            }),
            _ => None,
        }
    }
}

/// Links an identity provider account to a new local super administrator.
pub fn seed_admin(store: &dyn Store, seed: &AdminSeed) -> Result<User, ActionError> {
    Validator::new()
        .string_required(&seed.auth_id, "authId")
        .string_required(&seed.email, "email")
        .email(&seed.email, "email")
        .string_required(&seed.name, "name")
        .length(&seed.name, "name", Some(2), Some(100))
        .validate()?;

    let email = seed.email.trim().to_lowercase();
    let auth_id = seed.auth_id.trim().to_string();
    if store.find_user_by_email(&email)?.is_some() {
        return Err(ActionError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }
    if store.find_user_by_auth_id(&auth_id)?.is_some() {
        return Err(ActionError::Conflict(
            "This identity account is already linked".to_string(),
        ));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        auth_id,
        email,
        name: seed.name.trim().to_string(),
        phone: None,
        role: Role::SuperAdmin,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user)?;
    info!("Seeded administrator {} <{}>", user.id, user.email);
    Ok(user)
}
