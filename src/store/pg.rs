use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    AttendanceFilter, CategoryStore, FinanceStore, InventoryStore, ItemFilter, LaborStore,
    LaborerFilter, PaymentFilter, ProjectFilter, ProjectStore, ReportFilter, ReportStore,
    RequestFilter, RequestStore, Store, StoreError, StoreResult, UserStore,
};
use crate::core::shared::enums::{RequestStatus, Role};
use crate::core::shared::models::{
    Attendance, DailyReport, Expense, Income, InventoryItem, InventoryUsage, LaborRequest,
    Laborer, MaterialCategory, MaterialRequest, MaterialRequestDetail, MaterialRequestItem,
    Payment, Project, ProjectSupervisor, User,
};
use crate::core::shared::schema::{
    attendance, daily_reports, expenses, incomes, inventory_items, inventory_usages,
    labor_requests, laborers, material_categories, material_request_items, material_requests,
    payments, project_supervisors, projects, users,
};
use crate::core::shared::utils::{normalize_name, DbPool};

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<PgPooled> {
        Ok(self.pool.get()?)
    }
}

fn nullable_ids(ids: &[Uuid]) -> Vec<Option<Uuid>> {
    ids.iter().copied().map(Some).collect()
}

fn expect_row(affected: usize) -> StoreResult<()> {
    if affected == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

impl UserStore for PgStore {
    fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table.find(id).first(&mut conn).optional()?)
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table
            .filter(lower(users::email).eq(normalize_name(email)))
            .first(&mut conn)
            .optional()?)
    }

    fn find_user_by_auth_id(&self, auth_id: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table
            .filter(users::auth_id.eq(auth_id))
            .first(&mut conn)
            .optional()?)
    }

    fn list_users(&self, role: Option<Role>, active: Option<bool>) -> StoreResult<Vec<User>> {
        let mut conn = self.conn()?;
        let mut q = users::table.into_boxed();
        if let Some(role) = role {
            q = q.filter(users::role.eq(role));
        }
        if let Some(active) = active {
            q = q.filter(users::is_active.eq(active));
        }
        Ok(q.order(users::name.asc()).load(&mut conn)?)
    }

    fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(users::table)
            .values(user)
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(users::table.find(user.id))
            .set(user)
            .execute(&mut conn)?;
        expect_row(affected)
    }

    fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::delete(project_supervisors::table.filter(project_supervisors::supervisor_id.eq(id)))
                .execute(conn)?;
            let deleted = diesel::delete(users::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
    }

    fn count_user_submissions(&self, id: Uuid) -> StoreResult<i64> {
        let mut conn = self.conn()?;
        let material: i64 = material_requests::table
            .filter(material_requests::requested_by.eq(id))
            .count()
            .get_result(&mut conn)?;
        let labor: i64 = labor_requests::table
            .filter(labor_requests::requested_by.eq(id))
            .count()
            .get_result(&mut conn)?;
        let reports: i64 = daily_reports::table
            .filter(daily_reports::supervisor_id.eq(id))
            .count()
            .get_result(&mut conn)?;
        let usages: i64 = inventory_usages::table
            .filter(inventory_usages::recorded_by.eq(id))
            .count()
            .get_result(&mut conn)?;
        let attendance_rows: i64 = attendance::table
            .filter(attendance::recorded_by.eq(id))
            .count()
            .get_result(&mut conn)?;
        Ok(material + labor + reports + usages + attendance_rows)
    }
}

impl ProjectStore for PgStore {
    fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let mut conn = self.conn()?;
        Ok(projects::table.find(id).first(&mut conn).optional()?)
    }

    fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let mut conn = self.conn()?;
        let mut q = projects::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(projects::id.eq_any(ids.clone()));
        }
        if let Some(status) = filter.status {
            q = q.filter(projects::status.eq(status));
        }
        Ok(q.order(projects::created_at.desc()).load(&mut conn)?)
    }

    fn insert_project(&self, project: &Project) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(projects::table)
            .values(project)
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_project(&self, project: &Project) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(projects::table.find(project.id))
            .set(project)
            .execute(&mut conn)?;
        expect_row(affected)
    }

    fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(projects::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn assign_supervisor(&self, assignment: &ProjectSupervisor) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(project_supervisors::table)
            .values(assignment)
            .execute(&mut conn)?;
        Ok(())
    }

    fn unassign_supervisor(&self, project_id: Uuid, supervisor_id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            project_supervisors::table
                .filter(project_supervisors::project_id.eq(project_id))
                .filter(project_supervisors::supervisor_id.eq(supervisor_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn supervisor_project_ids(&self, supervisor_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        Ok(project_supervisors::table
            .filter(project_supervisors::supervisor_id.eq(supervisor_id))
            .select(project_supervisors::project_id)
            .load(&mut conn)?)
    }

    fn project_supervisor_ids(&self, project_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        Ok(project_supervisors::table
            .filter(project_supervisors::project_id.eq(project_id))
            .select(project_supervisors::supervisor_id)
            .load(&mut conn)?)
    }
}

impl CategoryStore for PgStore {
    fn find_category(&self, id: Uuid) -> StoreResult<Option<MaterialCategory>> {
        let mut conn = self.conn()?;
        Ok(material_categories::table.find(id).first(&mut conn).optional()?)
    }

    fn find_category_by_name(&self, name: &str) -> StoreResult<Option<MaterialCategory>> {
        let mut conn = self.conn()?;
        Ok(material_categories::table
            .filter(lower(material_categories::name).eq(normalize_name(name)))
            .first(&mut conn)
            .optional()?)
    }

    fn list_categories(&self) -> StoreResult<Vec<MaterialCategory>> {
        let mut conn = self.conn()?;
        Ok(material_categories::table
            .order(material_categories::name.asc())
            .load(&mut conn)?)
    }

    fn insert_category(&self, category: &MaterialCategory) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(material_categories::table)
            .values(category)
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_category(&self, category: &MaterialCategory) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(material_categories::table.find(category.id))
            .set(category)
            .execute(&mut conn)?;
        expect_row(affected)
    }

    fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(material_categories::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn count_category_items(&self, id: Uuid) -> StoreResult<i64> {
        let mut conn = self.conn()?;
        Ok(inventory_items::table
            .filter(inventory_items::category_id.eq(id))
            .count()
            .get_result(&mut conn)?)
    }
}

impl InventoryStore for PgStore {
    fn find_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        let mut conn = self.conn()?;
        Ok(inventory_items::table.find(id).first(&mut conn).optional()?)
    }

    fn find_item_by_key(
        &self,
        project_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<InventoryItem>> {
        let mut conn = self.conn()?;
        Ok(inventory_items::table
            .filter(inventory_items::project_id.eq(project_id))
            .filter(inventory_items::category_id.eq(category_id))
            .filter(lower(inventory_items::name).eq(normalize_name(name)))
            .first(&mut conn)
            .optional()?)
    }

    fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>> {
        let mut conn = self.conn()?;
        let mut q = inventory_items::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(inventory_items::project_id.eq_any(ids.clone()));
        }
        if let Some(category_id) = filter.category_id {
            q = q.filter(inventory_items::category_id.eq(category_id));
        }
        if filter.low_stock_only {
            q = q.filter(inventory_items::quantity.le(inventory_items::threshold));
        }
        Ok(q.order(inventory_items::name.asc()).load(&mut conn)?)
    }

    fn insert_item(&self, item: &InventoryItem) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(inventory_items::table)
            .values(item)
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_item(&self, item: &InventoryItem) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(inventory_items::table.find(item.id))
            .set(item)
            .execute(&mut conn)?;
        expect_row(affected)
    }

    fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(inventory_items::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn count_item_references(&self, id: Uuid) -> StoreResult<i64> {
        let mut conn = self.conn()?;
        let usages: i64 = inventory_usages::table
            .filter(inventory_usages::item_id.eq(id))
            .count()
            .get_result(&mut conn)?;
        let request_lines: i64 = material_request_items::table
            .filter(material_request_items::item_id.eq(id))
            .count()
            .get_result(&mut conn)?;
        Ok(usages + request_lines)
    }

    fn restock_item(&self, id: Uuid, amount: i32) -> StoreResult<Option<InventoryItem>> {
        let mut conn = self.conn()?;
        Ok(diesel::update(
            inventory_items::table
                .filter(inventory_items::id.eq(id))
                .filter(inventory_items::quantity.le(inventory_items::threshold)),
        )
        .set((
            inventory_items::quantity.eq(inventory_items::quantity + amount),
            inventory_items::initial_quantity.eq(inventory_items::initial_quantity + amount),
            inventory_items::updated_at.eq(Utc::now()),
        ))
        .get_result::<InventoryItem>(&mut conn)
        .optional()?)
    }

    fn consume_item(&self, usage: &InventoryUsage) -> StoreResult<Option<InventoryItem>> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let updated = diesel::update(
                inventory_items::table
                    .filter(inventory_items::id.eq(usage.item_id))
                    .filter(inventory_items::quantity.ge(usage.quantity)),
            )
            .set((
                inventory_items::quantity.eq(inventory_items::quantity - usage.quantity),
                inventory_items::updated_at.eq(Utc::now()),
            ))
            .get_result::<InventoryItem>(conn)
            .optional()?;

            let Some(item) = updated else {
                return Ok(None);
            };

            diesel::insert_into(inventory_usages::table)
                .values(usage)
                .execute(conn)?;
            Ok(Some(item))
        })
    }

    fn list_usages(&self, item_id: Uuid) -> StoreResult<Vec<InventoryUsage>> {
        let mut conn = self.conn()?;
        Ok(inventory_usages::table
            .filter(inventory_usages::item_id.eq(item_id))
            .order((inventory_usages::used_on.desc(), inventory_usages::created_at.desc()))
            .load(&mut conn)?)
    }
}

impl LaborStore for PgStore {
    fn find_laborer(&self, id: Uuid) -> StoreResult<Option<Laborer>> {
        let mut conn = self.conn()?;
        Ok(laborers::table.find(id).first(&mut conn).optional()?)
    }

    fn list_laborers(&self, filter: &LaborerFilter) -> StoreResult<Vec<Laborer>> {
        let mut conn = self.conn()?;
        let mut q = laborers::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(laborers::project_id.eq_any(nullable_ids(ids)));
        }
        if let Some(active) = filter.active {
            q = q.filter(laborers::is_active.eq(active));
        }
        Ok(q.order(laborers::name.asc()).load(&mut conn)?)
    }

    fn insert_laborer(&self, laborer: &Laborer) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(laborers::table)
            .values(laborer)
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_laborer(&self, laborer: &Laborer) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(laborers::table.find(laborer.id))
            .set(laborer)
            .execute(&mut conn)?;
        expect_row(affected)
    }

    fn delete_laborer(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(laborers::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn laborer_history_counts(&self, id: Uuid) -> StoreResult<(i64, i64)> {
        let mut conn = self.conn()?;
        let attendance_rows: i64 = attendance::table
            .filter(attendance::laborer_id.eq(id))
            .count()
            .get_result(&mut conn)?;
        let payment_rows: i64 = payments::table
            .filter(payments::laborer_id.eq(id))
            .count()
            .get_result(&mut conn)?;
        Ok((attendance_rows, payment_rows))
    }

    fn find_attendance(&self, laborer_id: Uuid, work_date: NaiveDate) -> StoreResult<Option<Attendance>> {
        let mut conn = self.conn()?;
        Ok(attendance::table
            .filter(attendance::laborer_id.eq(laborer_id))
            .filter(attendance::work_date.eq(work_date))
            .first(&mut conn)
            .optional()?)
    }

    fn insert_attendance(&self, record: &Attendance) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(attendance::table)
            .values(record)
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let mut conn = self.conn()?;
        let mut q = attendance::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(attendance::project_id.eq_any(ids.clone()));
        }
        if let Some(laborer_id) = filter.laborer_id {
            q = q.filter(attendance::laborer_id.eq(laborer_id));
        }
        if let Some(from) = filter.from {
            q = q.filter(attendance::work_date.ge(from));
        }
        if let Some(to) = filter.to {
            q = q.filter(attendance::work_date.le(to));
        }
        Ok(q.order(attendance::work_date.desc()).load(&mut conn)?)
    }

    fn insert_payment(&self, payment: &Payment) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(payments::table)
            .values(payment)
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>> {
        let mut conn = self.conn()?;
        let mut q = payments::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(payments::project_id.eq_any(nullable_ids(ids)));
        }
        if let Some(laborer_id) = filter.laborer_id {
            q = q.filter(payments::laborer_id.eq(laborer_id));
        }
        Ok(q.order(payments::paid_on.desc()).load(&mut conn)?)
    }
}

fn attach_items(
    conn: &mut PgConnection,
    requests: Vec<MaterialRequest>,
) -> StoreResult<Vec<MaterialRequestDetail>> {
    let ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
    let lines: Vec<MaterialRequestItem> = material_request_items::table
        .filter(material_request_items::request_id.eq_any(ids))
        .order(material_request_items::name.asc())
        .load(conn)?;

    let mut by_request: HashMap<Uuid, Vec<MaterialRequestItem>> = HashMap::new();
    for line in lines {
        by_request.entry(line.request_id).or_default().push(line);
    }

    Ok(requests
        .into_iter()
        .map(|request| {
            let items = by_request.remove(&request.id).unwrap_or_default();
            MaterialRequestDetail { request, items }
        })
        .collect())
}

impl RequestStore for PgStore {
    fn insert_material_request(
        &self,
        request: &MaterialRequest,
        items: &[MaterialRequestItem],
    ) -> StoreResult<()> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::insert_into(material_requests::table)
                .values(request)
                .execute(conn)?;
            diesel::insert_into(material_request_items::table)
                .values(items)
                .execute(conn)?;
            Ok(())
        })
    }

    fn find_material_request(&self, id: Uuid) -> StoreResult<Option<MaterialRequestDetail>> {
        let mut conn = self.conn()?;
        let request: Option<MaterialRequest> = material_requests::table
            .find(id)
            .first(&mut conn)
            .optional()?;
        match request {
            Some(request) => Ok(attach_items(&mut conn, vec![request])?.pop()),
            None => Ok(None),
        }
    }

    fn list_material_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<MaterialRequestDetail>> {
        let mut conn = self.conn()?;
        let mut q = material_requests::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(material_requests::project_id.eq_any(ids.clone()));
        }
        if let Some(status) = filter.status {
            q = q.filter(material_requests::status.eq(status));
        }
        let requests: Vec<MaterialRequest> =
            q.order(material_requests::created_at.desc()).load(&mut conn)?;
        attach_items(&mut conn, requests)
    }

    fn apply_material_review(&self, request: &MaterialRequest) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let affected = diesel::update(
            material_requests::table
                .filter(material_requests::id.eq(request.id))
                .filter(material_requests::status.eq(RequestStatus::Pending)),
        )
        .set(request)
        .execute(&mut conn)?;
        Ok(affected > 0)
    }

    fn insert_labor_request(&self, request: &LaborRequest) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(labor_requests::table)
            .values(request)
            .execute(&mut conn)?;
        Ok(())
    }

    fn find_labor_request(&self, id: Uuid) -> StoreResult<Option<LaborRequest>> {
        let mut conn = self.conn()?;
        Ok(labor_requests::table.find(id).first(&mut conn).optional()?)
    }

    fn list_labor_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<LaborRequest>> {
        let mut conn = self.conn()?;
        let mut q = labor_requests::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(labor_requests::project_id.eq_any(ids.clone()));
        }
        if let Some(status) = filter.status {
            q = q.filter(labor_requests::status.eq(status));
        }
        Ok(q.order(labor_requests::created_at.desc()).load(&mut conn)?)
    }

    fn apply_labor_review(&self, request: &LaborRequest) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let affected = diesel::update(
            labor_requests::table
                .filter(labor_requests::id.eq(request.id))
                .filter(labor_requests::status.eq(RequestStatus::Pending)),
        )
        .set(request)
        .execute(&mut conn)?;
        Ok(affected > 0)
    }
}

impl FinanceStore for PgStore {
    fn insert_income(&self, income: &Income) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(incomes::table)
            .values(income)
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_incomes(&self, project_id: Option<Uuid>) -> StoreResult<Vec<Income>> {
        let mut conn = self.conn()?;
        let mut q = incomes::table.into_boxed();
        if let Some(project_id) = project_id {
            q = q.filter(incomes::project_id.eq(project_id));
        }
        Ok(q.order(incomes::received_on.desc()).load(&mut conn)?)
    }

    fn delete_income(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(incomes::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn insert_expense(&self, expense: &Expense) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(expenses::table)
            .values(expense)
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_expenses(&self, project_id: Option<Uuid>) -> StoreResult<Vec<Expense>> {
        let mut conn = self.conn()?;
        let mut q = expenses::table.into_boxed();
        if let Some(project_id) = project_id {
            q = q.filter(expenses::project_id.eq(project_id));
        }
        Ok(q.order(expenses::spent_on.desc()).load(&mut conn)?)
    }

    fn delete_expense(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(expenses::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

impl ReportStore for PgStore {
    fn find_daily_report(
        &self,
        project_id: Uuid,
        supervisor_id: Uuid,
        report_date: NaiveDate,
    ) -> StoreResult<Option<DailyReport>> {
        let mut conn = self.conn()?;
        Ok(daily_reports::table
            .filter(daily_reports::project_id.eq(project_id))
            .filter(daily_reports::supervisor_id.eq(supervisor_id))
            .filter(daily_reports::report_date.eq(report_date))
            .first(&mut conn)
            .optional()?)
    }

    fn insert_daily_report(&self, report: &DailyReport) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(daily_reports::table)
            .values(report)
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_daily_reports(&self, filter: &ReportFilter) -> StoreResult<Vec<DailyReport>> {
        let mut conn = self.conn()?;
        let mut q = daily_reports::table.into_boxed();
        if let Some(ids) = &filter.scope {
            q = q.filter(daily_reports::project_id.eq_any(ids.clone()));
        }
        if let Some(from) = filter.from {
            q = q.filter(daily_reports::report_date.ge(from));
        }
        if let Some(to) = filter.to {
            q = q.filter(daily_reports::report_date.le(to));
        }
        Ok(q.order(daily_reports::report_date.desc()).load(&mut conn)?)
    }
}

impl Store for PgStore {
    fn ping(&self) -> bool {
        self.conn()
            .and_then(|mut conn| {
                diesel::sql_query("SELECT 1")
                    .execute(&mut conn)
                    .map_err(StoreError::from)
            })
            .is_ok()
    }
}
