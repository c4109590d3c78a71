use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::config::AppConfig;
use crate::core::middleware::Principal;
use crate::core::shared::enums::{ProjectStatus, Role, WorkerType};
use crate::core::shared::models::{
    InventoryItem, Laborer, MaterialCategory, Project, ProjectSupervisor, User,
};
use crate::core::shared::state::AppState;
use crate::directory::{IdentityError, IdentityProvider, NewAccount};
use crate::store::memory::MemoryStore;
use crate::store::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    Create(String),
    Delete(String),
    SetActive(String, bool),
}

/// Records every call; individual operations can be told to fail.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    pub calls: Arc<Mutex<Vec<IdentityCall>>>,
    tokens: Mutex<HashMap<String, String>>,
    next_id: AtomicUsize,
    pub conflict_on_create: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_set_active: AtomicBool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue_token(&self, token: &str, auth_id: &str) {
        self.tokens
            .lock()
            .await
            .insert(token.to_string(), auth_id.to_string());
    }

    pub async fn recorded_calls(&self) -> Vec<IdentityCall> {
        self.calls.lock().await.clone()
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn introspect(&self, token: &str) -> Result<Option<String>, IdentityError> {
        Ok(self.tokens.lock().await.get(token).cloned())
    }

    async fn create_account(&self, account: &NewAccount) -> Result<String, IdentityError> {
        self.calls
            .lock()
            .await
            .push(IdentityCall::Create(account.email.clone()));
        if self.conflict_on_create.load(Ordering::SeqCst) {
            return Err(IdentityError::AlreadyExists);
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("mock create failure".to_string()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(format!("idp-{}", n + 1))
    }

    async fn delete_account(&self, auth_id: &str) -> Result<(), IdentityError> {
        self.calls
            .lock()
            .await
            .push(IdentityCall::Delete(auth_id.to_string()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("mock delete failure".to_string()));
        }
        Ok(())
    }

    async fn set_account_active(&self, auth_id: &str, active: bool) -> Result<(), IdentityError> {
        self.calls
            .lock()
            .await
            .push(IdentityCall::SetActive(auth_id.to_string(), active));
        if self.fail_set_active.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("mock state failure".to_string()));
        }
        Ok(())
    }
}

/// Application state over in-memory collaborators plus fixture builders.
pub struct TestHarness {
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<MockIdentityProvider>,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(MockIdentityProvider::new());
        let state = Arc::new(AppState::new(
            store.clone(),
            identity.clone(),
            AppConfig::default(),
        ));
        Self {
            state,
            store,
            identity,
        }
    }

    fn user(&self, role: Role, name: &str) -> User {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let user = User {
            id,
            auth_id: format!("auth-{}", id.simple()),
            email: format!("{}@yard.test", name.to_lowercase().replace(' ', ".")),
            name: name.to_string(),
            phone: None,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_user(&user).unwrap();
        user
    }

    pub fn admin(&self) -> Principal {
        Principal::from(&self.user(Role::SuperAdmin, "Root Admin"))
    }

    pub fn supervisor_user(&self, name: &str) -> User {
        self.user(Role::Supervisor, name)
    }

    pub fn supervisor(&self, name: &str) -> Principal {
        Principal::from(&self.supervisor_user(name))
    }

    pub fn project(&self, name: &str, status: ProjectStatus) -> Project {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            client_name: None,
            location: None,
            description: None,
            status,
            start_date: None,
            end_date: None,
            budget: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_project(&project).unwrap();
        project
    }

    pub fn assign(&self, project_id: Uuid, supervisor_id: Uuid) {
        self.store
            .assign_supervisor(&ProjectSupervisor {
                project_id,
                supervisor_id,
                assigned_at: Utc::now(),
            })
            .unwrap();
    }

    pub fn category(&self, name: &str) -> MaterialCategory {
        let now = Utc::now();
        let category = MaterialCategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_category(&category).unwrap();
        category
    }

    pub fn item(
        &self,
        project_id: Uuid,
        category_id: Uuid,
        name: &str,
        quantity: i32,
        threshold: i32,
        unit_cost: i64,
    ) -> InventoryItem {
        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            project_id,
            category_id,
            name: name.to_string(),
            unit: "bag".to_string(),
            quantity,
            initial_quantity: quantity,
            threshold,
            unit_cost: BigDecimal::from(unit_cost),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_item(&item).unwrap();
        item
    }

    pub fn laborer(&self, name: &str, project_id: Option<Uuid>) -> Laborer {
        let now = Utc::now();
        let laborer = Laborer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: None,
            worker_type: WorkerType::Temporary,
            daily_wage: BigDecimal::from(800),
            project_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_laborer(&laborer).unwrap();
        laborer
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
