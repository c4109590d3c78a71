//! Back-office server for a landscaping business.

pub mod api_router;
pub mod core;
pub mod dashboard;
pub mod directory;
pub mod finance;
pub mod inventory;
pub mod labor;
pub mod main_module;
pub mod project;
pub mod reports;
pub mod requests;
pub mod security;
pub mod store;
pub mod users;
