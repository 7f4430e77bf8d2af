//! Read-only aggregate queries behind the dashboard and reports.

use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::entity::{test_case, test_run_entry, test_suite};
use crate::error::AppResult;
use crate::models::{
    DashboardStats, DashboardSummary, RecentSuite, ReportTestCaseRow, ReportsResponse, RunStatus,
    TestCaseFilter,
};
use crate::services::dashboard::{
    execution_trend, priority_distribution, status_distribution, trend_start,
};
use crate::services::run_status::percentage;

use super::{DbPool, test_suites};

/// Suites shown on the reports page.
pub const RECENT_SUITES: u64 = 5;

async fn summary<C: ConnectionTrait>(db: &C) -> AppResult<DashboardSummary> {
    Ok(DashboardSummary {
        total_test_cases: test_case::Entity::find().count(db).await?,
        total_test_suites: test_suite::Entity::find().count(db).await?,
        total_test_runs: test_run_entry::Entity::find().count(db).await?,
    })
}

async fn entry_statuses<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Option<String>>> {
    let statuses: Vec<Option<String>> = test_run_entry::Entity::find()
        .select_only()
        .column(test_run_entry::Column::Status)
        .into_tuple()
        .all(db)
        .await?;
    Ok(statuses)
}

async fn recent_executions<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> AppResult<Vec<DateTime<Utc>>> {
    let executed: Vec<Option<DateTime<Utc>>> = test_run_entry::Entity::find()
        .select_only()
        .column(test_run_entry::Column::ExecutedAt)
        .filter(test_run_entry::Column::ExecutedAt.gte(trend_start(now)))
        .into_tuple()
        .all(db)
        .await?;
    Ok(executed.into_iter().flatten().collect())
}

impl DbPool {
    /// Totals, run status distribution and the 30-day execution trend.
    pub async fn dashboard_stats(&self, now: DateTime<Utc>) -> AppResult<DashboardStats> {
        let db = self.connection();

        Ok(DashboardStats {
            status_distribution: status_distribution(entry_statuses(db).await?),
            execution_trend: execution_trend(recent_executions(db, now).await?, now),
            summary: summary(db).await?,
        })
    }

    /// Reports page data: distributions, recent suites, overall pass rate and
    /// the filtered test case table.
    pub async fn reports(&self, filter: &TestCaseFilter) -> AppResult<ReportsResponse> {
        let db = self.connection();

        let statuses = entry_statuses(db).await?;
        let total = statuses.len() as u32;
        let passed = statuses
            .iter()
            .filter(|s| s.as_deref() == Some(RunStatus::Passed.as_str()))
            .count() as u32;

        let priorities: Vec<Option<String>> = test_case::Entity::find()
            .select_only()
            .column(test_case::Column::Priority)
            .into_tuple()
            .all(db)
            .await?;

        let recent_suites = test_suites::summaries(db, Some(RECENT_SUITES))
            .await?
            .into_iter()
            .map(|s| RecentSuite {
                id: s.id,
                title: s.title,
                status: s.status,
                stats: s.stats,
            })
            .collect();

        let test_cases = self
            .report_test_cases(filter)
            .await?
            .into_iter()
            .map(|(case, folder_name, author_name)| ReportTestCaseRow {
                id: case.id,
                title: case.title,
                priority: case.priority,
                status: case.status,
                is_automated: case.is_automated,
                folder_name,
                author_name,
            })
            .collect();

        Ok(ReportsResponse {
            summary: summary(db).await?,
            status_distribution: status_distribution(statuses),
            priority_distribution: priority_distribution(priorities),
            recent_suites,
            overall_pass_rate: percentage(passed, total),
            test_cases,
        })
    }
}
