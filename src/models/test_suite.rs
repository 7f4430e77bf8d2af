//! Test suite and test run models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::RunStatus;
use super::test_case::TestCaseDetail;
use super::user::UserResponse;

/// Suite-level counts. `passRate` is the executed share (passed + failed + blocked).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuiteStats {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub blocked: u32,
    pub not_run: u32,
    pub executed: u32,
    pub pass_rate: u32,
}

/// Request to create a suite from test cases.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuiteRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub test_case_ids: Vec<i32>,
}

/// Request to update the suite's own status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSuiteRequest {
    pub status: String,
}

/// Suite with its stats, as listed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteSummary {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub stats: SuiteStats,
}

/// Run entry inside a suite detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunEntrySummary {
    pub id: i32,
    pub test_case_id: Option<i32>,
    pub test_case_title: String,
    pub status: String,
    pub actual_result: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub assignee: Option<UserResponse>,
    /// Current priority of the source test case, if it still exists.
    pub priority: Option<String>,
}

/// Suite with its entries in insertion order.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteDetail {
    #[serde(flatten)]
    pub suite: TestSuiteSummary,
    pub entries: Vec<RunEntrySummary>,
}

/// Frozen step copy with its execution outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub id: i32,
    pub step_number: i32,
    pub action: String,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub status: String,
}

impl From<crate::entity::test_run_step_result::Model> for StepResult {
    fn from(m: crate::entity::test_run_step_result::Model) -> Self {
        Self {
            id: m.id,
            step_number: m.step_number,
            action: m.action,
            expected_result: m.expected_result,
            actual_result: m.actual_result,
            status: m.status,
        }
    }
}

/// Run entry with its step results and the live source test case.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunEntryDetail {
    pub id: i32,
    pub test_suite_id: i32,
    pub suite_title: String,
    pub test_case_id: Option<i32>,
    pub test_case_title: String,
    pub status: String,
    pub actual_result: Option<String>,
    pub assigned_to: Option<i32>,
    pub executed_at: Option<DateTime<Utc>>,
    pub step_results: Vec<StepResult>,
    pub test_case: Option<TestCaseDetail>,
}

/// Per-step outcome submitted with a run entry update.
///
/// `action` and `expectedResult` are accepted for compatibility and ignored:
/// the frozen copy never changes.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepResultUpdate {
    pub step_number: i32,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub actual_result: Option<String>,
    pub status: RunStatus,
}

/// Run entry update payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRunEntryRequest {
    pub status: RunStatus,
    #[serde(default)]
    pub actual_result: Option<String>,
    #[serde(default)]
    pub step_results: Option<Vec<StepResultUpdate>>,
}
