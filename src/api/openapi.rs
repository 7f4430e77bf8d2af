//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::config::SESSION_COOKIE;
use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Test Plan Server",
        version = "0.1.0",
        description = "API server for organizing test cases in folders, running them as test suites and reporting on the results"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        services::auth::signup,
        services::auth::signin,
        services::auth::signout,
        services::auth::session,
        // Folder endpoints
        api::folders::list_folders,
        api::folders::folder_tree,
        api::folders::get_folder,
        api::folders::create_folder,
        api::folders::update_folder,
        api::folders::delete_folder,
        api::tags::list_tags,
        // Test case endpoints
        api::test_cases::list_test_cases,
        api::test_cases::get_test_case,
        api::test_cases::create_test_case,
        api::test_cases::update_test_case,
        api::test_cases::delete_test_case,
        api::test_cases::bulk_delete_test_cases,
        api::test_cases::export_test_cases,
        api::test_cases::import_test_cases,
        // Suite and run endpoints
        api::test_suites::list_suites,
        api::test_suites::get_suite,
        api::test_suites::create_suite,
        api::test_suites::update_suite,
        api::test_suites::delete_suite,
        api::test_runs::get_run,
        api::test_runs::update_run,
        // Dashboard endpoints
        api::dashboard::dashboard_stats,
        api::dashboard::reports,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth
            models::SignupRequest,
            models::SigninRequest,
            models::AuthResponse,
            models::UserResponse,
            // Folders
            models::Folder,
            models::FolderNode,
            models::CreateFolderRequest,
            models::UpdateFolderRequest,
            // Test cases
            models::Priority,
            models::StepInput,
            models::Step,
            models::Tag,
            models::TestCasePayload,
            models::TestCaseDetail,
            models::ListTestCasesQuery,
            models::BulkDeleteRequest,
            models::BulkDeleteResponse,
            models::ImportRequest,
            models::ImportRowError,
            models::ImportResponse,
            models::TestCaseFilter,
            // Suites and runs
            models::RunStatus,
            models::SuiteStats,
            models::CreateSuiteRequest,
            models::UpdateSuiteRequest,
            models::TestSuiteSummary,
            models::TestSuiteDetail,
            models::RunEntrySummary,
            models::StepResult,
            models::RunEntryDetail,
            models::StepResultUpdate,
            models::UpdateRunEntryRequest,
            // Dashboard
            models::StatusCount,
            models::TrendPoint,
            models::DashboardSummary,
            models::DashboardStats,
            models::PriorityCount,
            models::RecentSuite,
            models::ReportTestCaseRow,
            models::ReportsResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Sign up, sign in and session"),
        (name = "Folders", description = "Folder hierarchy"),
        (name = "Tags", description = "Test case tags"),
        (name = "Test Cases", description = "Test cases, CSV import and export"),
        (name = "Test Suites", description = "Suites created from test case snapshots"),
        (name = "Test Runs", description = "Executing run entries"),
        (name = "Dashboard", description = "Aggregate statistics and reports")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add session cookie security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::new(SESSION_COOKIE),
                    ),
                ),
            );
        }
    }
}
