//! Dashboard and report aggregates.

use serde::Serialize;
use utoipa::ToSchema;

use super::test_suite::SuiteStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Executions on one calendar day, `date` formatted for display (e.g. `Mar 4`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrendPoint {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_test_cases: u64,
    pub total_test_suites: u64,
    pub total_test_runs: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub status_distribution: Vec<StatusCount>,
    pub execution_trend: Vec<TrendPoint>,
    pub summary: DashboardSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriorityCount {
    pub priority: String,
    pub count: u64,
}

/// One of the most recent suites with its stats.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSuite {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub stats: SuiteStats,
}

/// Row of the filtered test case table on the reports page.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTestCaseRow {
    pub id: i32,
    pub title: String,
    pub priority: String,
    pub status: String,
    pub is_automated: bool,
    pub folder_name: Option<String>,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportsResponse {
    pub summary: DashboardSummary,
    pub status_distribution: Vec<StatusCount>,
    pub priority_distribution: Vec<PriorityCount>,
    pub recent_suites: Vec<RecentSuite>,
    /// round(passed / total run entries * 100).
    pub overall_pass_rate: u32,
    pub test_cases: Vec<ReportTestCaseRow>,
}
