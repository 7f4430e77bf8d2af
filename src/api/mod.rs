//! API endpoint modules.

pub mod dashboard;
pub mod folders;
pub mod health;
pub mod openapi;
pub mod tags;
pub mod test_cases;
pub mod test_runs;
pub mod test_suites;

pub use dashboard::configure_routes as configure_dashboard_routes;
pub use folders::configure_routes as configure_folder_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use tags::configure_routes as configure_tag_routes;
pub use test_cases::configure_routes as configure_test_case_routes;
pub use test_runs::configure_routes as configure_test_run_routes;
pub use test_suites::configure_routes as configure_test_suite_routes;

use actix_web::web;

use crate::error::AppError;

/// Register every `/api/v1` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(crate::services::configure_auth_routes)
        .configure(configure_folder_routes)
        .configure(configure_tag_routes)
        .configure(configure_test_case_routes)
        .configure(configure_test_suite_routes)
        .configure(configure_test_run_routes)
        .configure(configure_dashboard_routes);
}

/// Malformed JSON, query strings and path segments become 400 INVALID_INPUT.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    );
}
