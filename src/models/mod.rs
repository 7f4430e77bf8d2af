//! Domain models for the test plan server.

pub mod dashboard;
pub mod folder;
pub mod status;
pub mod test_case;
pub mod test_suite;
pub mod user;

// Re-export commonly used types
pub use dashboard::{
    DashboardStats, DashboardSummary, PriorityCount, RecentSuite, ReportTestCaseRow,
    ReportsResponse, StatusCount, TrendPoint,
};
pub use folder::{CreateFolderRequest, Folder, FolderNode, UpdateFolderRequest};
pub use status::{Priority, RunStatus};
pub use test_case::{
    BulkDeleteRequest, BulkDeleteResponse, ImportRequest, ImportResponse, ImportRowError,
    ListTestCasesQuery, Step, StepInput, Tag, TestCaseDetail, TestCaseFilter, TestCasePayload,
};
pub use test_suite::{
    CreateSuiteRequest, RunEntryDetail, RunEntrySummary, StepResult, StepResultUpdate,
    SuiteStats, TestSuiteDetail, TestSuiteSummary, UpdateRunEntryRequest, UpdateSuiteRequest,
};
pub use user::{AuthResponse, SessionClaims, SigninRequest, SignupRequest, User, UserResponse};
