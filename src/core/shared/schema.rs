diesel::table! {
    users (id) {
        id -> Uuid,
        auth_id -> Text,
        email -> Text,
        name -> Text,
        phone -> Nullable<Text>,
        role -> Int2,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    projects (id) {
        id -> Uuid,
        name -> Text,
        client_name -> Nullable<Text>,
        location -> Nullable<Text>,
        description -> Nullable<Text>,
        status -> Int2,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        budget -> Nullable<Numeric>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    project_supervisors (project_id, supervisor_id) {
        project_id -> Uuid,
        supervisor_id -> Uuid,
        assigned_at -> Timestamptz,
    }
}

diesel::table! {
    material_categories (id) {
        id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    inventory_items (id) {
        id -> Uuid,
        project_id -> Uuid,
        category_id -> Uuid,
        name -> Text,
        unit -> Text,
        quantity -> Int4,
        initial_quantity -> Int4,
        threshold -> Int4,
        unit_cost -> Numeric,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    inventory_usages (id) {
        id -> Uuid,
        item_id -> Uuid,
        quantity -> Int4,
        used_on -> Date,
        notes -> Nullable<Text>,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    laborers (id) {
        id -> Uuid,
        name -> Text,
        phone -> Nullable<Text>,
        worker_type -> Int2,
        daily_wage -> Numeric,
        project_id -> Nullable<Uuid>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    attendance (id) {
        id -> Uuid,
        laborer_id -> Uuid,
        project_id -> Uuid,
        work_date -> Date,
        status -> Int2,
        hours_worked -> Nullable<Numeric>,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    payments (id) {
        id -> Uuid,
        laborer_id -> Uuid,
        project_id -> Nullable<Uuid>,
        amount -> Numeric,
        paid_on -> Date,
        method -> Int2,
        notes -> Nullable<Text>,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    material_requests (id) {
        id -> Uuid,
        project_id -> Uuid,
        requested_by -> Uuid,
        status -> Int2,
        notes -> Nullable<Text>,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        review_note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    material_request_items (id) {
        id -> Uuid,
        request_id -> Uuid,
        item_id -> Nullable<Uuid>,
        name -> Text,
        quantity -> Int4,
        unit -> Text,
    }
}

diesel::table! {
    labor_requests (id) {
        id -> Uuid,
        project_id -> Uuid,
        requested_by -> Uuid,
        worker_type -> Int2,
        headcount -> Int4,
        needed_from -> Date,
        needed_until -> Nullable<Date>,
        notes -> Nullable<Text>,
        status -> Int2,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        review_note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    incomes (id) {
        id -> Uuid,
        project_id -> Uuid,
        amount -> Numeric,
        received_on -> Date,
        source -> Text,
        notes -> Nullable<Text>,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    expenses (id) {
        id -> Uuid,
        project_id -> Uuid,
        amount -> Numeric,
        spent_on -> Date,
        category -> Text,
        description -> Nullable<Text>,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    daily_reports (id) {
        id -> Uuid,
        project_id -> Uuid,
        supervisor_id -> Uuid,
        report_date -> Date,
        work_summary -> Text,
        issues -> Nullable<Text>,
        weather -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(project_supervisors -> projects (project_id));
diesel::joinable!(project_supervisors -> users (supervisor_id));
diesel::joinable!(inventory_items -> projects (project_id));
diesel::joinable!(inventory_items -> material_categories (category_id));
diesel::joinable!(inventory_usages -> inventory_items (item_id));
diesel::joinable!(attendance -> laborers (laborer_id));
diesel::joinable!(payments -> laborers (laborer_id));
diesel::joinable!(material_request_items -> material_requests (request_id));
diesel::joinable!(material_requests -> projects (project_id));
diesel::joinable!(labor_requests -> projects (project_id));
diesel::joinable!(incomes -> projects (project_id));
diesel::joinable!(expenses -> projects (project_id));
diesel::joinable!(daily_reports -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    projects,
    project_supervisors,
    material_categories,
    inventory_items,
    inventory_usages,
    laborers,
    attendance,
    payments,
    material_requests,
    material_request_items,
    labor_requests,
    incomes,
    expenses,
    daily_reports,
);
