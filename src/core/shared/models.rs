use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AttendanceStatus, PaymentMethod, ProjectStatus, RequestStatus, Role, WorkerType};
use super::schema::{
    attendance, daily_reports, expenses, incomes, inventory_items, inventory_usages,
    labor_requests, laborers, material_categories, material_request_items, material_requests,
    payments, project_supervisors, projects, users,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Subject of the account at the identity provider.
    pub auth_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub client_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = project_supervisors)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSupervisor {
    pub project_id: Uuid,
    pub supervisor_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = material_categories)]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = inventory_items)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: i32,
    pub initial_quantity: i32,
    pub threshold: i32,
    pub unit_cost: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = inventory_usages)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUsage {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub used_on: NaiveDate,
    pub notes: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = laborers)]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct Laborer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub worker_type: WorkerType,
    pub daily_wage: BigDecimal,
    pub project_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = attendance)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub laborer_id: Uuid,
    pub project_id: Uuid,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus,
    pub hours_worked: Option<BigDecimal>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = payments)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub laborer_id: Uuid,
    pub project_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub paid_on: NaiveDate,
    pub method: PaymentMethod,
    pub notes: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = material_requests)]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: Uuid,
    pub project_id: Uuid,
    pub requested_by: Uuid,
    pub status: RequestStatus,
    pub notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = material_request_items)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequestItem {
    pub id: Uuid,
    pub request_id: Uuid,
    /// Existing inventory line being topped up, if any.
    pub item_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequestDetail {
    #[serde(flatten)]
    pub request: MaterialRequest,
    pub items: Vec<MaterialRequestItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = labor_requests)]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct LaborRequest {
    pub id: Uuid,
    pub project_id: Uuid,
    pub requested_by: Uuid,
    pub worker_type: WorkerType,
    pub headcount: i32,
    pub needed_from: NaiveDate,
    pub needed_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = incomes)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount: BigDecimal,
    pub received_on: NaiveDate,
    pub source: String,
    pub notes: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = expenses)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount: BigDecimal,
    pub spent_on: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = daily_reports)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub id: Uuid,
    pub project_id: Uuid,
    pub supervisor_id: Uuid,
    pub report_date: NaiveDate,
    pub work_summary: String,
    pub issues: Option<String>,
    pub weather: Option<String>,
    pub created_at: DateTime<Utc>,
}
