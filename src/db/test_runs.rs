//! Run entry execution: reading an entry and recording step outcomes.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use sea_orm::*;
use tracing::{debug, warn};

use crate::entity::{test_run_entry, test_run_step_result, test_suite};
use crate::error::{AppError, AppResult};
use crate::models::{
    RunEntryDetail, RunStatus, StepResult, StepResultUpdate, UpdateRunEntryRequest,
};
use crate::services::run_status::derive_entry_status;

use super::{DbPool, test_cases};

async fn load_detail<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<RunEntryDetail> {
    let entry = test_run_entry::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", id)))?;

    let suite_title = test_suite::Entity::find_by_id(entry.test_suite_id)
        .one(db)
        .await?
        .map(|s| s.title)
        .unwrap_or_default();

    let step_results = test_run_step_result::Entity::find()
        .filter(test_run_step_result::Column::TestRunEntryId.eq(id))
        .order_by_asc(test_run_step_result::Column::StepNumber)
        .order_by_asc(test_run_step_result::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(StepResult::from)
        .collect();

    let test_case = match entry.test_case_id {
        Some(case_id) => test_cases::find_detail(db, case_id).await?,
        None => None,
    };

    Ok(RunEntryDetail {
        id: entry.id,
        test_suite_id: entry.test_suite_id,
        suite_title,
        test_case_id: entry.test_case_id,
        test_case_title: entry.test_case_title,
        status: entry.status,
        actual_result: entry.actual_result,
        assigned_to: entry.assigned_to,
        executed_at: entry.executed_at,
        step_results,
        test_case,
    })
}

/// Pick the step result each update applies to.
///
/// `results` must be ordered by `(step_number, id)`. Imported steps may share
/// a number, so the n-th update naming a step number goes to the n-th result
/// with that number. Naming a number with no result left is an error, checked
/// before anything is written.
fn match_step_results(
    results: &[test_run_step_result::Model],
    updates: &[StepResultUpdate],
) -> AppResult<Vec<usize>> {
    let mut slots: HashMap<i32, VecDeque<usize>> = HashMap::new();
    for (idx, result) in results.iter().enumerate() {
        slots.entry(result.step_number).or_default().push_back(idx);
    }

    updates
        .iter()
        .map(|update| {
            slots
                .get_mut(&update.step_number)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "Step {} does not exist in this test run",
                        update.step_number
                    ))
                })
        })
        .collect()
}

impl DbPool {
    /// Run entry with its frozen step results and the live source test case.
    pub async fn get_run_entry(&self, id: i32) -> AppResult<RunEntryDetail> {
        load_detail(self.connection(), id).await
    }

    /// Record an execution of a run entry.
    ///
    /// Step outcomes are matched to the frozen step results by step number
    /// (see [`match_step_results`]); the submitted action and expected result
    /// never overwrite the snapshot. The entry's actual result is replaced,
    /// so omitting it clears it. The entry status is then recomputed from all
    /// of its step results and the derived status takes precedence over the
    /// submitted one.
    pub async fn update_run_entry(
        &self,
        id: i32,
        req: &UpdateRunEntryRequest,
    ) -> AppResult<RunEntryDetail> {
        let txn = self.connection().begin().await?;

        let entry = test_run_entry::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test run {}", id)))?;

        let mut results: Vec<test_run_step_result::Model> = test_run_step_result::Entity::find()
            .filter(test_run_step_result::Column::TestRunEntryId.eq(id))
            .order_by_asc(test_run_step_result::Column::StepNumber)
            .order_by_asc(test_run_step_result::Column::Id)
            .all(&txn)
            .await?;

        let updates = req.step_results.as_deref().unwrap_or_default();
        let targets = match_step_results(&results, updates)?;

        for (update, idx) in updates.iter().zip(targets) {
            let mut active: test_run_step_result::ActiveModel = results[idx].clone().into();
            active.actual_result = Set(update.actual_result.clone());
            active.status = Set(update.status.as_str().to_string());
            results[idx] = active.update(&txn).await?;
        }

        let step_statuses: Vec<RunStatus> = results
            .iter()
            .map(|r| RunStatus::parse(&r.status).unwrap_or_default())
            .collect();

        let status = match derive_entry_status(&step_statuses) {
            Some(derived) => {
                if derived != req.status {
                    warn!(
                        run_entry_id = id,
                        submitted = %req.status,
                        derived = %derived,
                        "Submitted run status disagrees with step results; using derived status"
                    );
                }
                derived
            }
            None => req.status,
        };

        let mut active: test_run_entry::ActiveModel = entry.into();
        active.status = Set(status.as_str().to_string());
        active.actual_result = Set(req.actual_result.clone());
        active.executed_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        let detail = load_detail(&txn, id).await?;
        txn.commit().await?;

        debug!(run_entry_id = id, status = %status, "Run entry updated");
        Ok(detail)
    }
}
