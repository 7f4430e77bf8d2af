//! Business logic services.

pub mod auth;
pub mod csv_export;
pub mod csv_import;
pub mod dashboard;
pub mod folder_tree;
pub mod run_status;

pub use auth::configure_routes as configure_auth_routes;
