//! Test suites and the step snapshot taken when a suite is created.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::entity::{
    test_case, test_case_step, test_run_entry, test_run_step_result, test_suite, user,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateSuiteRequest, RunEntrySummary, RunStatus, TestSuiteDetail, TestSuiteSummary,
    UserResponse,
};
use crate::services::run_status::suite_stats;

use super::DbPool;

/// Status given to newly created suites.
pub const DEFAULT_SUITE_STATUS: &str = "In Progress";

fn summary(suite: test_suite::Model, statuses: &[String]) -> TestSuiteSummary {
    TestSuiteSummary {
        id: suite.id,
        title: suite.title,
        description: suite.description,
        status: suite.status,
        created_by: suite.created_by,
        created_at: suite.created_at,
        stats: suite_stats(statuses.iter().map(String::as_str)),
    }
}

/// Entry statuses grouped by suite.
pub async fn entry_statuses<C: ConnectionTrait>(
    db: &C,
    suite_ids: Vec<i32>,
) -> AppResult<HashMap<i32, Vec<String>>> {
    let rows: Vec<(i32, String)> = test_run_entry::Entity::find()
        .select_only()
        .column(test_run_entry::Column::TestSuiteId)
        .column(test_run_entry::Column::Status)
        .filter(test_run_entry::Column::TestSuiteId.is_in(suite_ids))
        .into_tuple()
        .all(db)
        .await?;

    let mut by_suite: HashMap<i32, Vec<String>> = HashMap::new();
    for (suite_id, status) in rows {
        by_suite.entry(suite_id).or_default().push(status);
    }
    Ok(by_suite)
}

/// Suites newest first with their stats, optionally limited.
pub async fn summaries<C: ConnectionTrait>(
    db: &C,
    limit: Option<u64>,
) -> AppResult<Vec<TestSuiteSummary>> {
    let suites = test_suite::Entity::find()
        .order_by_desc(test_suite::Column::CreatedAt)
        .order_by_desc(test_suite::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    let mut statuses = entry_statuses(db, suites.iter().map(|s| s.id).collect()).await?;
    Ok(suites
        .into_iter()
        .map(|s| {
            let entry_statuses = statuses.remove(&s.id).unwrap_or_default();
            summary(s, &entry_statuses)
        })
        .collect())
}

/// Create one run entry for a test case and freeze its current steps into it.
async fn snapshot_entry<C: ConnectionTrait>(
    db: &C,
    suite_id: i32,
    case: &test_case::Model,
    assignee: i32,
) -> AppResult<usize> {
    let entry = test_run_entry::ActiveModel {
        test_suite_id: Set(suite_id),
        test_case_id: Set(Some(case.id)),
        test_case_title: Set(case.title.clone()),
        status: Set(RunStatus::NotRun.as_str().to_string()),
        assigned_to: Set(Some(assignee)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert run entry: {}", e)))?;

    let steps = test_case_step::Entity::find()
        .filter(test_case_step::Column::TestCaseId.eq(case.id))
        .order_by_asc(test_case_step::Column::StepNumber)
        .order_by_asc(test_case_step::Column::Id)
        .all(db)
        .await?;

    if steps.is_empty() {
        return Ok(0);
    }

    let count = steps.len();
    let results = steps.into_iter().map(|step| test_run_step_result::ActiveModel {
        test_run_entry_id: Set(entry.id),
        step_number: Set(step.step_number),
        action: Set(step.action),
        expected_result: Set(step.expected_result),
        status: Set(RunStatus::NotRun.as_str().to_string()),
        ..Default::default()
    });

    test_run_step_result::Entity::insert_many(results)
        .exec_without_returning(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert step results: {}", e)))?;

    Ok(count)
}

impl DbPool {
    /// All suites, newest first, each with its entry stats.
    pub async fn list_suites(&self) -> AppResult<Vec<TestSuiteSummary>> {
        summaries(self.connection(), None).await
    }

    /// Suite with its entries in insertion order.
    pub async fn get_suite(&self, id: i32) -> AppResult<TestSuiteDetail> {
        let db = self.connection();

        let suite = test_suite::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;

        let entries = test_run_entry::Entity::find()
            .filter(test_run_entry::Column::TestSuiteId.eq(id))
            .order_by_asc(test_run_entry::Column::Id)
            .all(db)
            .await?;

        let assignee_ids: HashSet<i32> = entries.iter().filter_map(|e| e.assigned_to).collect();
        let assignees: HashMap<i32, UserResponse> = user::Entity::find()
            .filter(user::Column::Id.is_in(assignee_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, UserResponse::from(u)))
            .collect();

        let case_ids: HashSet<i32> = entries.iter().filter_map(|e| e.test_case_id).collect();
        let priorities: HashMap<i32, String> = test_case::Entity::find()
            .select_only()
            .column(test_case::Column::Id)
            .column(test_case::Column::Priority)
            .filter(test_case::Column::Id.is_in(case_ids))
            .into_tuple::<(i32, String)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let statuses: Vec<String> = entries.iter().map(|e| e.status.clone()).collect();
        let entries = entries
            .into_iter()
            .map(|e| RunEntrySummary {
                assignee: e.assigned_to.and_then(|id| assignees.get(&id).cloned()),
                priority: e.test_case_id.and_then(|id| priorities.get(&id).cloned()),
                id: e.id,
                test_case_id: e.test_case_id,
                test_case_title: e.test_case_title,
                status: e.status,
                actual_result: e.actual_result,
                executed_at: e.executed_at,
            })
            .collect();

        Ok(TestSuiteDetail {
            suite: summary(suite, &statuses),
            entries,
        })
    }

    /// Create a suite and snapshot each listed test case, in the order given.
    ///
    /// Every id yields its own entry, so a repeated id is run more than once.
    /// Any unknown id fails the whole call before anything is written.
    pub async fn create_suite(
        &self,
        req: &CreateSuiteRequest,
        created_by: i32,
    ) -> AppResult<TestSuiteDetail> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }
        if req.test_case_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one test case is required".to_string(),
            ));
        }

        let ids = &req.test_case_ids;

        let txn = self.connection().begin().await?;

        let cases: HashMap<i32, test_case::Model> = test_case::Entity::find()
            .filter(test_case::Column::Id.is_in(ids.iter().copied()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        if let Some(missing) = ids.iter().find(|id| !cases.contains_key(id)) {
            return Err(AppError::NotFound(format!("Test case {}", missing)));
        }

        let suite = test_suite::ActiveModel {
            title: Set(title.to_string()),
            description: Set(req
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)),
            status: Set(DEFAULT_SUITE_STATUS.to_string()),
            created_by: Set(Some(created_by)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert test suite: {}", e)))?;

        let mut step_count = 0;
        for id in ids {
            if let Some(case) = cases.get(id) {
                step_count += snapshot_entry(&txn, suite.id, case, created_by).await?;
            }
        }

        txn.commit().await?;

        info!(
            suite_id = suite.id,
            entries = ids.len(),
            steps = step_count,
            "Test suite created"
        );
        self.get_suite(suite.id).await
    }

    /// Change the suite's own status label.
    pub async fn update_suite_status(&self, id: i32, status: &str) -> AppResult<TestSuiteSummary> {
        let status = status.trim();
        if status.is_empty() {
            return Err(AppError::InvalidInput("Status is required".to_string()));
        }

        let db = self.connection();
        let existing = test_suite::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;

        let mut active: test_suite::ActiveModel = existing.into();
        active.status = Set(status.to_string());
        let updated = active.update(db).await?;

        let mut statuses = entry_statuses(db, vec![id]).await?;
        Ok(summary(updated, &statuses.remove(&id).unwrap_or_default()))
    }

    /// Delete a suite with all of its entries and step results.
    pub async fn delete_suite(&self, id: i32) -> AppResult<()> {
        let result = test_suite::Entity::delete_by_id(id)
            .exec(self.connection())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Test suite {}", id)));
        }
        info!(suite_id = id, "Test suite deleted");
        Ok(())
    }
}
