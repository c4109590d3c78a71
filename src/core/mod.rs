pub mod action;
pub mod config;
pub mod middleware;
pub mod shared;
