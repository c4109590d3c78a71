//! In-process [`Store`] used by the action tests. Mirrors the unique
//! indexes of the migrations (users, categories, inventory items, assignments,
//! attendance, daily reports) so guard failures surface the same way.
//! Foreign keys and NUMERIC precision are not modelled.

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::{
    in_scope, AttendanceFilter, CategoryStore, FinanceStore, InventoryStore, ItemFilter,
    LaborStore, LaborerFilter, PaymentFilter, ProjectFilter, ProjectStore, ReportFilter,
    ReportStore, RequestFilter, RequestStore, Store, StoreError, StoreResult, UserStore,
};
use crate::core::shared::enums::{RequestStatus, Role};
use crate::core::shared::models::{
    Attendance, DailyReport, Expense, Income, InventoryItem, InventoryUsage, LaborRequest,
    Laborer, MaterialCategory, MaterialRequest, MaterialRequestDetail, MaterialRequestItem,
    Payment, Project, ProjectSupervisor, User,
};
use crate::core::shared::utils::normalize_name;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    assignments: Vec<ProjectSupervisor>,
    categories: HashMap<Uuid, MaterialCategory>,
    items: HashMap<Uuid, InventoryItem>,
    usages: Vec<InventoryUsage>,
    laborers: HashMap<Uuid, Laborer>,
    attendance: Vec<Attendance>,
    payments: Vec<Payment>,
    material_requests: HashMap<Uuid, MaterialRequest>,
    material_request_items: Vec<MaterialRequestItem>,
    labor_requests: HashMap<Uuid, LaborRequest>,
    incomes: Vec<Income>,
    expenses: Vec<Expense>,
    reports: Vec<DailyReport>,
}

impl Tables {
    /// `inventory_items_key_idx`: (project, category, lower(name)).
    fn check_item_key(&self, item: &InventoryItem) -> StoreResult<()> {
        let name = normalize_name(&item.name);
        let taken = self.items.values().any(|other| {
            other.id != item.id
                && other.project_id == item.project_id
                && other.category_id == item.category_id
                && normalize_name(&other.name) == name
        });
        if taken {
            return Err(StoreError::UniqueViolation("inventory_items_key_idx".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_user_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent user insert/update/delete fail with a database error.
    pub fn fail_user_writes(&self, fail: bool) {
        self.fail_user_writes.store(fail, Ordering::SeqCst);
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_user_writes(&self) -> StoreResult<()> {
        if self.fail_user_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("simulated user write failure".to_string()));
        }
        Ok(())
    }
}

fn sorted_by<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    rows
}

impl UserStore for MemoryStore {
    fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_name(email);
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| normalize_name(&u.email) == email)
            .cloned())
    }

    fn find_user_by_auth_id(&self, auth_id: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.auth_id == auth_id)
            .cloned())
    }

    fn list_users(&self, role: Option<Role>, active: Option<bool>) -> StoreResult<Vec<User>> {
        let rows = self
            .tables()
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .filter(|u| active.map_or(true, |a| u.is_active == a))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |u: &User| u.name.clone()))
    }

    fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.check_user_writes()?;
        let mut tables = self.tables();
        let email = normalize_name(&user.email);
        if tables
            .users
            .values()
            .any(|u| normalize_name(&u.email) == email || u.auth_id == user.auth_id)
        {
            return Err(StoreError::UniqueViolation("users_email_lower_idx".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    fn update_user(&self, user: &User) -> StoreResult<()> {
        self.check_user_writes()?;
        let mut tables = self.tables();
        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        self.check_user_writes()?;
        let mut tables = self.tables();
        tables.assignments.retain(|a| a.supervisor_id != id);
        Ok(tables.users.remove(&id).is_some())
    }

    fn count_user_submissions(&self, id: Uuid) -> StoreResult<i64> {
        let tables = self.tables();
        let count = tables
            .material_requests
            .values()
            .filter(|r| r.requested_by == id)
            .count()
            + tables
                .labor_requests
                .values()
                .filter(|r| r.requested_by == id)
                .count()
            + tables.reports.iter().filter(|r| r.supervisor_id == id).count()
            + tables.usages.iter().filter(|u| u.recorded_by == id).count()
            + tables.attendance.iter().filter(|a| a.recorded_by == id).count();
        Ok(count as i64)
    }
}

impl ProjectStore for MemoryStore {
    fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.tables().projects.get(&id).cloned())
    }

    fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let rows = self
            .tables()
            .projects
            .values()
            .filter(|p| in_scope(&filter.scope, p.id))
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |p: &Project| std::cmp::Reverse(p.created_at)))
    }

    fn insert_project(&self, project: &Project) -> StoreResult<()> {
        self.tables().projects.insert(project.id, project.clone());
        Ok(())
    }

    fn update_project(&self, project: &Project) -> StoreResult<()> {
        match self.tables().projects.get_mut(&project.id) {
            Some(existing) => {
                *existing = project.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables();
        if tables.projects.remove(&id).is_none() {
            return Ok(false);
        }
        tables.assignments.retain(|a| a.project_id != id);
        let item_ids: Vec<Uuid> = tables
            .items
            .values()
            .filter(|i| i.project_id == id)
            .map(|i| i.id)
            .collect();
        tables.items.retain(|_, i| i.project_id != id);
        tables.usages.retain(|u| !item_ids.contains(&u.item_id));
        tables.attendance.retain(|a| a.project_id != id);
        let request_ids: Vec<Uuid> = tables
            .material_requests
            .values()
            .filter(|r| r.project_id == id)
            .map(|r| r.id)
            .collect();
        tables.material_requests.retain(|_, r| r.project_id != id);
        tables
            .material_request_items
            .retain(|i| !request_ids.contains(&i.request_id));
        tables.labor_requests.retain(|_, r| r.project_id != id);
        tables.incomes.retain(|i| i.project_id != id);
        tables.expenses.retain(|e| e.project_id != id);
        tables.reports.retain(|r| r.project_id != id);
        for laborer in tables.laborers.values_mut() {
            if laborer.project_id == Some(id) {
                laborer.project_id = None;
            }
        }
        for payment in tables.payments.iter_mut() {
            if payment.project_id == Some(id) {
                payment.project_id = None;
            }
        }
        Ok(true)
    }

    fn assign_supervisor(&self, assignment: &ProjectSupervisor) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables.assignments.iter().any(|a| {
            a.project_id == assignment.project_id && a.supervisor_id == assignment.supervisor_id
        }) {
            return Err(StoreError::UniqueViolation("project_supervisors_pkey".to_string()));
        }
        tables.assignments.push(assignment.clone());
        Ok(())
    }

    fn unassign_supervisor(&self, project_id: Uuid, supervisor_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.assignments.len();
        tables
            .assignments
            .retain(|a| !(a.project_id == project_id && a.supervisor_id == supervisor_id));
        Ok(tables.assignments.len() < before)
    }

    fn supervisor_project_ids(&self, supervisor_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .tables()
            .assignments
            .iter()
            .filter(|a| a.supervisor_id == supervisor_id)
            .map(|a| a.project_id)
            .collect())
    }

    fn project_supervisor_ids(&self, project_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .tables()
            .assignments
            .iter()
            .filter(|a| a.project_id == project_id)
            .map(|a| a.supervisor_id)
            .collect())
    }
}

impl CategoryStore for MemoryStore {
    fn find_category(&self, id: Uuid) -> StoreResult<Option<MaterialCategory>> {
        Ok(self.tables().categories.get(&id).cloned())
    }

    fn find_category_by_name(&self, name: &str) -> StoreResult<Option<MaterialCategory>> {
        let name = normalize_name(name);
        Ok(self
            .tables()
            .categories
            .values()
            .find(|c| normalize_name(&c.name) == name)
            .cloned())
    }

    fn list_categories(&self) -> StoreResult<Vec<MaterialCategory>> {
        let rows = self.tables().categories.values().cloned().collect();
        Ok(sorted_by(rows, |c: &MaterialCategory| c.name.clone()))
    }

    fn insert_category(&self, category: &MaterialCategory) -> StoreResult<()> {
        let mut tables = self.tables();
        let name = normalize_name(&category.name);
        if tables
            .categories
            .values()
            .any(|c| normalize_name(&c.name) == name)
        {
            return Err(StoreError::UniqueViolation(
                "material_categories_name_lower_idx".to_string(),
            ));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    fn update_category(&self, category: &MaterialCategory) -> StoreResult<()> {
        match self.tables().categories.get_mut(&category.id) {
            Some(existing) => {
                *existing = category.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables().categories.remove(&id).is_some())
    }

    fn count_category_items(&self, id: Uuid) -> StoreResult<i64> {
        Ok(self
            .tables()
            .items
            .values()
            .filter(|i| i.category_id == id)
            .count() as i64)
    }
}

impl InventoryStore for MemoryStore {
    fn find_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        Ok(self.tables().items.get(&id).cloned())
    }

    fn find_item_by_key(
        &self,
        project_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        let name = normalize_name(name);
        Ok(self
            .tables()
            .items
            .values()
            .find(|i| {
                i.project_id == project_id
                    && i.category_id == category_id
                    && normalize_name(&i.name) == name
            })
            .cloned())
    }

    fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>> {
        let rows = self
            .tables()
            .items
            .values()
            .filter(|i| in_scope(&filter.scope, i.project_id))
            .filter(|i| filter.category_id.map_or(true, |c| i.category_id == c))
            .filter(|i| !filter.low_stock_only || i.is_low_stock())
            .cloned()
            .collect();
        Ok(sorted_by(rows, |i: &InventoryItem| i.name.clone()))
    }

    fn insert_item(&self, item: &InventoryItem) -> StoreResult<()> {
        let mut tables = self.tables();
        tables.check_item_key(item)?;
        tables.items.insert(item.id, item.clone());
        Ok(())
    }

    fn update_item(&self, item: &InventoryItem) -> StoreResult<()> {
        let mut tables = self.tables();
        tables.check_item_key(item)?;
        match tables.items.get_mut(&item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables().items.remove(&id).is_some())
    }

    fn count_item_references(&self, id: Uuid) -> StoreResult<i64> {
        let tables = self.tables();
        let usages = tables.usages.iter().filter(|u| u.item_id == id).count();
        let lines = tables
            .material_request_items
            .iter()
            .filter(|l| l.item_id == Some(id))
            .count();
        Ok((usages + lines) as i64)
    }

    fn restock_item(&self, id: Uuid, amount: i32) -> StoreResult<Option<InventoryItem>> {
        let mut tables = self.tables();
        match tables.items.get_mut(&id) {
            Some(item) if item.is_low_stock() => {
                let (Some(quantity), Some(initial)) = (
                    item.quantity.checked_add(amount),
                    item.initial_quantity.checked_add(amount),
                ) else {
                    return Err(StoreError::Database("integer out of range".to_string()));
                };
                item.quantity = quantity;
                item.initial_quantity = initial;
                item.updated_at = Utc::now();
                Ok(Some(item.clone()))
            }
            _ => Ok(None),
        }
    }

    fn consume_item(&self, usage: &InventoryUsage) -> StoreResult<Option<InventoryItem>> {
        let mut tables = self.tables();
        let updated = match tables.items.get_mut(&usage.item_id) {
            Some(item) if item.quantity >= usage.quantity => {
                item.quantity -= usage.quantity;
                item.updated_at = Utc::now();
                item.clone()
            }
            _ => return Ok(None),
        };
        tables.usages.push(usage.clone());
        Ok(Some(updated))
    }

    fn list_usages(&self, item_id: Uuid) -> StoreResult<Vec<InventoryUsage>> {
        let rows = self
            .tables()
            .usages
            .iter()
            .filter(|u| u.item_id == item_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |u: &InventoryUsage| {
            std::cmp::Reverse((u.used_on, u.created_at))
        }))
    }
}

impl LaborStore for MemoryStore {
    fn find_laborer(&self, id: Uuid) -> StoreResult<Option<Laborer>> {
        Ok(self.tables().laborers.get(&id).cloned())
    }

    fn list_laborers(&self, filter: &LaborerFilter) -> StoreResult<Vec<Laborer>> {
        let rows = self
            .tables()
            .laborers
            .values()
            .filter(|l| match (&filter.scope, l.project_id) {
                (None, _) => true,
                (Some(ids), Some(project_id)) => ids.contains(&project_id),
                (Some(_), None) => false,
            })
            .filter(|l| filter.active.map_or(true, |a| l.is_active == a))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |l: &Laborer| l.name.clone()))
    }

    fn insert_laborer(&self, laborer: &Laborer) -> StoreResult<()> {
        self.tables().laborers.insert(laborer.id, laborer.clone());
        Ok(())
    }

    fn update_laborer(&self, laborer: &Laborer) -> StoreResult<()> {
        match self.tables().laborers.get_mut(&laborer.id) {
            Some(existing) => {
                *existing = laborer.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_laborer(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables().laborers.remove(&id).is_some())
    }

    fn laborer_history_counts(&self, id: Uuid) -> StoreResult<(i64, i64)> {
        let tables = self.tables();
        let attendance_rows = tables.attendance.iter().filter(|a| a.laborer_id == id).count();
        let payment_rows = tables.payments.iter().filter(|p| p.laborer_id == id).count();
        Ok((attendance_rows as i64, payment_rows as i64))
    }

    fn find_attendance(&self, laborer_id: Uuid, work_date: NaiveDate) -> StoreResult<Option<Attendance>> {
        Ok(self
            .tables()
            .attendance
            .iter()
            .find(|a| a.laborer_id == laborer_id && a.work_date == work_date)
            .cloned())
    }

    fn insert_attendance(&self, record: &Attendance) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables
            .attendance
            .iter()
            .any(|a| a.laborer_id == record.laborer_id && a.work_date == record.work_date)
        {
            return Err(StoreError::UniqueViolation(
                "attendance_laborer_id_work_date_key".to_string(),
            ));
        }
        tables.attendance.push(record.clone());
        Ok(())
    }

    fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let rows = self
            .tables()
            .attendance
            .iter()
            .filter(|a| in_scope(&filter.scope, a.project_id))
            .filter(|a| filter.laborer_id.map_or(true, |l| a.laborer_id == l))
            .filter(|a| filter.from.map_or(true, |from| a.work_date >= from))
            .filter(|a| filter.to.map_or(true, |to| a.work_date <= to))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |a: &Attendance| std::cmp::Reverse(a.work_date)))
    }

    fn insert_payment(&self, payment: &Payment) -> StoreResult<()> {
        self.tables().payments.push(payment.clone());
        Ok(())
    }

    fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>> {
        let rows = self
            .tables()
            .payments
            .iter()
            .filter(|p| match (&filter.scope, p.project_id) {
                (None, _) => true,
                (Some(ids), Some(project_id)) => ids.contains(&project_id),
                (Some(_), None) => false,
            })
            .filter(|p| filter.laborer_id.map_or(true, |l| p.laborer_id == l))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |p: &Payment| std::cmp::Reverse(p.paid_on)))
    }
}

impl RequestStore for MemoryStore {
    fn insert_material_request(
        &self,
        request: &MaterialRequest,
        items: &[MaterialRequestItem],
    ) -> StoreResult<()> {
        let mut tables = self.tables();
        tables.material_requests.insert(request.id, request.clone());
        tables.material_request_items.extend(items.iter().cloned());
        Ok(())
    }

    fn find_material_request(&self, id: Uuid) -> StoreResult<Option<MaterialRequestDetail>> {
        let tables = self.tables();
        Ok(tables.material_requests.get(&id).map(|request| MaterialRequestDetail {
            request: request.clone(),
            items: tables
                .material_request_items
                .iter()
                .filter(|i| i.request_id == id)
                .cloned()
                .collect(),
        }))
    }

    fn list_material_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<MaterialRequestDetail>> {
        let tables = self.tables();
        let rows = tables
            .material_requests
            .values()
            .filter(|r| in_scope(&filter.scope, r.project_id))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .map(|request| MaterialRequestDetail {
                request: request.clone(),
                items: tables
                    .material_request_items
                    .iter()
                    .filter(|i| i.request_id == request.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(sorted_by(rows, |d: &MaterialRequestDetail| {
            std::cmp::Reverse(d.request.created_at)
        }))
    }

    fn apply_material_review(&self, request: &MaterialRequest) -> StoreResult<bool> {
        match self.tables().material_requests.get_mut(&request.id) {
            Some(existing) if existing.status == RequestStatus::Pending => {
                *existing = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn insert_labor_request(&self, request: &LaborRequest) -> StoreResult<()> {
        self.tables().labor_requests.insert(request.id, request.clone());
        Ok(())
    }

    fn find_labor_request(&self, id: Uuid) -> StoreResult<Option<LaborRequest>> {
        Ok(self.tables().labor_requests.get(&id).cloned())
    }

    fn list_labor_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<LaborRequest>> {
        let rows = self
            .tables()
            .labor_requests
            .values()
            .filter(|r| in_scope(&filter.scope, r.project_id))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |r: &LaborRequest| std::cmp::Reverse(r.created_at)))
    }

    fn apply_labor_review(&self, request: &LaborRequest) -> StoreResult<bool> {
        match self.tables().labor_requests.get_mut(&request.id) {
            Some(existing) if existing.status == RequestStatus::Pending => {
                *existing = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl FinanceStore for MemoryStore {
    fn insert_income(&self, income: &Income) -> StoreResult<()> {
        self.tables().incomes.push(income.clone());
        Ok(())
    }

    fn list_incomes(&self, project_id: Option<Uuid>) -> StoreResult<Vec<Income>> {
        let rows = self
            .tables()
            .incomes
            .iter()
            .filter(|i| project_id.map_or(true, |p| i.project_id == p))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |i: &Income| std::cmp::Reverse(i.received_on)))
    }

    fn delete_income(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.incomes.len();
        tables.incomes.retain(|i| i.id != id);
        Ok(tables.incomes.len() < before)
    }

    fn insert_expense(&self, expense: &Expense) -> StoreResult<()> {
        self.tables().expenses.push(expense.clone());
        Ok(())
    }

    fn list_expenses(&self, project_id: Option<Uuid>) -> StoreResult<Vec<Expense>> {
        let rows = self
            .tables()
            .expenses
            .iter()
            .filter(|e| project_id.map_or(true, |p| e.project_id == p))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |e: &Expense| std::cmp::Reverse(e.spent_on)))
    }

    fn delete_expense(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != id);
        Ok(tables.expenses.len() < before)
    }
}

impl ReportStore for MemoryStore {
    fn find_daily_report(
        &self,
        project_id: Uuid,
        supervisor_id: Uuid,
        report_date: NaiveDate,
    ) -> StoreResult<Option<DailyReport>> {
        Ok(self
            .tables()
            .reports
            .iter()
            .find(|r| {
                r.project_id == project_id
                    && r.supervisor_id == supervisor_id
                    && r.report_date == report_date
            })
            .cloned())
    }

    fn insert_daily_report(&self, report: &DailyReport) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables.reports.iter().any(|r| {
            r.project_id == report.project_id
                && r.supervisor_id == report.supervisor_id
                && r.report_date == report.report_date
        }) {
            return Err(StoreError::UniqueViolation(
                "daily_reports_project_id_supervisor_id_report_date_key".to_string(),
            ));
        }
        tables.reports.push(report.clone());
        Ok(())
    }

    fn list_daily_reports(&self, filter: &ReportFilter) -> StoreResult<Vec<DailyReport>> {
        let rows = self
            .tables()
            .reports
            .iter()
            .filter(|r| in_scope(&filter.scope, r.project_id))
            .filter(|r| filter.from.map_or(true, |from| r.report_date >= from))
            .filter(|r| filter.to.map_or(true, |to| r.report_date <= to))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |r: &DailyReport| std::cmp::Reverse(r.report_date)))
    }
}

impl Store for MemoryStore {
    fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::enums::ProjectStatus;
    use crate::core::shared::test_utils::{date, TestHarness};

    #[test]
    fn test_item_key_is_unique_ignoring_case() {
        let h = TestHarness::new();
        let project = h.project("Karen Gardens", ProjectStatus::Active);
        let soil = h.category("Soil");
        let item = h.item(project.id, soil.id, "Red soil", 10, 2, 300);

        let mut twin = item.clone();
        twin.id = Uuid::new_v4();
        twin.name = "RED SOIL".to_string();
        assert!(matches!(
            h.store.insert_item(&twin),
            Err(StoreError::UniqueViolation(_))
        ));

        let other = h.category("Mulch");
        twin.category_id = other.id;
        assert!(h.store.insert_item(&twin).is_ok());
        assert!(h.store.update_item(&item).is_ok());
    }

    #[test]
    fn test_one_daily_report_per_key() {
        let h = TestHarness::new();
        let sup = h.supervisor("Peter Kamau");
        let project = h.project("Karen Gardens", ProjectStatus::Active);
        let report = DailyReport {
            id: Uuid::new_v4(),
            project_id: project.id,
            supervisor_id: sup.user_id,
            report_date: date(2024, 4, 3),
            work_summary: "Edged every flower bed".to_string(),
            issues: None,
            weather: None,
            created_at: Utc::now(),
        };
        h.store.insert_daily_report(&report).unwrap();

        let again = DailyReport {
            id: Uuid::new_v4(),
            ..report
        };
        assert!(matches!(
            h.store.insert_daily_report(&again),
            Err(StoreError::UniqueViolation(_))
        ));
    }
}
