//! Repository traits over the relational store.
//!
//! Handlers only ever talk to [`Store`]; `PgStore` is the diesel-backed
//! implementation used by the server.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::shared::enums::{ProjectStatus, RequestStatus, Role};
use crate::core::shared::models::{
    Attendance, DailyReport, Expense, Income, InventoryItem, InventoryUsage, LaborRequest,
    Laborer, MaterialCategory, MaterialRequest, MaterialRequestDetail, MaterialRequestItem,
    Payment, Project, ProjectSupervisor, User,
};

#[cfg(test)]
pub mod memory;
pub mod pg;

pub use pg::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("Connection pool error: {0}")]
    Pool(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::NotFound => Self::NotFound,
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.constraint_name().unwrap_or("unique").to_string())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation(
                    info.constraint_name().unwrap_or("foreign key").to_string(),
                )
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Restricts a listing to a set of projects. `None` means every project.
pub type ProjectScope = Option<Vec<Uuid>>;

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub scope: ProjectScope,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub scope: ProjectScope,
    pub category_id: Option<Uuid>,
    pub low_stock_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LaborerFilter {
    pub scope: ProjectScope,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub scope: ProjectScope,
    pub laborer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub scope: ProjectScope,
    pub laborer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub scope: ProjectScope,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub scope: ProjectScope,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub trait UserStore {
    fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Case-insensitive lookup.
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    fn find_user_by_auth_id(&self, auth_id: &str) -> StoreResult<Option<User>>;
    fn list_users(&self, role: Option<Role>, active: Option<bool>) -> StoreResult<Vec<User>>;
    fn insert_user(&self, user: &User) -> StoreResult<()>;
    fn update_user(&self, user: &User) -> StoreResult<()>;
    /// Deletes the user and its project assignments in one transaction.
    fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
    /// Rows authored by the user: requests, daily reports, usage and attendance entries.
    fn count_user_submissions(&self, id: Uuid) -> StoreResult<i64>;
}

pub trait ProjectStore {
    fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;
    fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>>;
    fn insert_project(&self, project: &Project) -> StoreResult<()>;
    fn update_project(&self, project: &Project) -> StoreResult<()>;
    fn delete_project(&self, id: Uuid) -> StoreResult<bool>;
    fn assign_supervisor(&self, assignment: &ProjectSupervisor) -> StoreResult<()>;
    fn unassign_supervisor(&self, project_id: Uuid, supervisor_id: Uuid) -> StoreResult<bool>;
    fn supervisor_project_ids(&self, supervisor_id: Uuid) -> StoreResult<Vec<Uuid>>;
    fn project_supervisor_ids(&self, project_id: Uuid) -> StoreResult<Vec<Uuid>>;
}

pub trait CategoryStore {
    fn find_category(&self, id: Uuid) -> StoreResult<Option<MaterialCategory>>;
    /// Case-insensitive, whitespace-trimmed lookup.
    fn find_category_by_name(&self, name: &str) -> StoreResult<Option<MaterialCategory>>;
    fn list_categories(&self) -> StoreResult<Vec<MaterialCategory>>;
    fn insert_category(&self, category: &MaterialCategory) -> StoreResult<()>;
    fn update_category(&self, category: &MaterialCategory) -> StoreResult<()>;
    fn delete_category(&self, id: Uuid) -> StoreResult<bool>;
    fn count_category_items(&self, id: Uuid) -> StoreResult<i64>;
}

pub trait InventoryStore {
    fn find_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>>;
    /// Looks an item up by its (project, category, name) key, name ignoring case.
    fn find_item_by_key(
        &self,
        project_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<InventoryItem>>;
    fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>>;
    fn insert_item(&self, item: &InventoryItem) -> StoreResult<()>;
    fn update_item(&self, item: &InventoryItem) -> StoreResult<()>;
    fn delete_item(&self, id: Uuid) -> StoreResult<bool>;
    /// Usage rows plus material-request lines pointing at the item.
    fn count_item_references(&self, id: Uuid) -> StoreResult<i64>;
    /// Adds `amount` to both quantity columns, but only while the item is at or
    /// below its threshold. Returns `None` when the condition did not hold.
    fn restock_item(&self, id: Uuid, amount: i32) -> StoreResult<Option<InventoryItem>>;
    /// Decrements the item by the usage quantity and records the usage row, in one
    /// transaction. Returns `None` when the stock on hand is insufficient.
    fn consume_item(&self, usage: &InventoryUsage) -> StoreResult<Option<InventoryItem>>;
    fn list_usages(&self, item_id: Uuid) -> StoreResult<Vec<InventoryUsage>>;
}

pub trait LaborStore {
    fn find_laborer(&self, id: Uuid) -> StoreResult<Option<Laborer>>;
    fn list_laborers(&self, filter: &LaborerFilter) -> StoreResult<Vec<Laborer>>;
    fn insert_laborer(&self, laborer: &Laborer) -> StoreResult<()>;
    fn update_laborer(&self, laborer: &Laborer) -> StoreResult<()>;
    fn delete_laborer(&self, id: Uuid) -> StoreResult<bool>;
    /// Returns `(attendance_rows, payment_rows)` for the laborer.
    fn laborer_history_counts(&self, id: Uuid) -> StoreResult<(i64, i64)>;
    fn find_attendance(&self, laborer_id: Uuid, work_date: NaiveDate) -> StoreResult<Option<Attendance>>;
    fn insert_attendance(&self, record: &Attendance) -> StoreResult<()>;
    fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>>;
    fn insert_payment(&self, payment: &Payment) -> StoreResult<()>;
    fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>>;
}

pub trait RequestStore {
    /// Stores the request and its lines atomically.
    fn insert_material_request(
        &self,
        request: &MaterialRequest,
        items: &[MaterialRequestItem],
    ) -> StoreResult<()>;
    fn find_material_request(&self, id: Uuid) -> StoreResult<Option<MaterialRequestDetail>>;
    fn list_material_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<MaterialRequestDetail>>;
    /// Writes the review only while the stored request is still PENDING.
    /// Returns `false` when another review got there first.
    fn apply_material_review(&self, request: &MaterialRequest) -> StoreResult<bool>;
    fn insert_labor_request(&self, request: &LaborRequest) -> StoreResult<()>;
    fn find_labor_request(&self, id: Uuid) -> StoreResult<Option<LaborRequest>>;
    fn list_labor_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<LaborRequest>>;
    /// Same contract as [`RequestStore::apply_material_review`].
    fn apply_labor_review(&self, request: &LaborRequest) -> StoreResult<bool>;
}

pub trait FinanceStore {
    fn insert_income(&self, income: &Income) -> StoreResult<()>;
    fn list_incomes(&self, project_id: Option<Uuid>) -> StoreResult<Vec<Income>>;
    fn delete_income(&self, id: Uuid) -> StoreResult<bool>;
    fn insert_expense(&self, expense: &Expense) -> StoreResult<()>;
    fn list_expenses(&self, project_id: Option<Uuid>) -> StoreResult<Vec<Expense>>;
    fn delete_expense(&self, id: Uuid) -> StoreResult<bool>;
}

pub trait ReportStore {
    fn find_daily_report(
        &self,
        project_id: Uuid,
        supervisor_id: Uuid,
        report_date: NaiveDate,
    ) -> StoreResult<Option<DailyReport>>;
    fn insert_daily_report(&self, report: &DailyReport) -> StoreResult<()>;
    fn list_daily_reports(&self, filter: &ReportFilter) -> StoreResult<Vec<DailyReport>>;
}

/// Everything a request handler may touch.
pub trait Store:
    UserStore
    + ProjectStore
    + CategoryStore
    + InventoryStore
    + LaborStore
    + RequestStore
    + FinanceStore
    + ReportStore
    + Send
    + Sync
{
    /// Cheap round-trip used by the health check.
    fn ping(&self) -> bool;
}

/// Brings every repository trait into scope for method calls on `dyn Store`.
pub mod prelude {
    pub use super::{
        CategoryStore, FinanceStore, InventoryStore, LaborStore, ProjectStore, ReportStore,
        RequestStore, Store, UserStore,
    };
}

/// True when `project_id` falls inside `scope`.
pub fn in_scope(scope: &ProjectScope, project_id: Uuid) -> bool {
    scope.as_ref().map_or(true, |ids| ids.contains(&project_id))
}
