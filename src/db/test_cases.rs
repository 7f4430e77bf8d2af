//! Test case repository: CRUD with ordered steps and tag links, CSV import and export.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::{folder, tag, test_case, test_case_step, test_case_tag, user};
use crate::error::{AppError, AppResult};
use crate::models::{
    ImportResponse, ImportRowError, Step, StepInput, Tag, TestCaseDetail,
    TestCaseFilter, TestCasePayload, UserResponse,
};
use crate::services::csv_export::ExportCase;
use crate::services::csv_import::{self, DraftStep, ImportRow, TestCaseDraft};
use crate::services::folder_tree::FolderTree;

use super::{DbPool, folders, tags};

/// Insert steps with explicit numbers.
async fn insert_steps<C: ConnectionTrait>(
    db: &C,
    test_case_id: i32,
    steps: &[DraftStep],
) -> AppResult<()> {
    if steps.is_empty() {
        return Ok(());
    }

    let models = steps.iter().map(|step| test_case_step::ActiveModel {
        test_case_id: Set(test_case_id),
        step_number: Set(step.step_number),
        action: Set(step.action.clone()),
        expected_result: Set(step.expected_result.clone()),
        ..Default::default()
    });

    test_case_step::Entity::insert_many(models)
        .exec_without_returning(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert steps: {}", e)))?;
    Ok(())
}

/// Number caller steps densely from 1 in array order.
fn renumber(steps: &[StepInput]) -> AppResult<Vec<DraftStep>> {
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let action = step.action.trim();
            if action.is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "Step {} action is required",
                    idx + 1
                )));
            }
            Ok(DraftStep {
                step_number: idx as i32 + 1,
                action: action.to_string(),
                expected_result: step
                    .expected_result
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}

fn required_title(payload: &TestCasePayload) -> AppResult<String> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }
    Ok(title.to_string())
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Attach ordered steps, tags and author to test case rows, preserving row order.
pub async fn hydrate<C: ConnectionTrait>(
    db: &C,
    cases: Vec<test_case::Model>,
) -> AppResult<Vec<TestCaseDetail>> {
    if cases.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = cases.iter().map(|c| c.id).collect();

    let mut steps_by_case: HashMap<i32, Vec<Step>> = HashMap::new();
    for step in test_case_step::Entity::find()
        .filter(test_case_step::Column::TestCaseId.is_in(ids.clone()))
        .order_by_asc(test_case_step::Column::TestCaseId)
        .order_by_asc(test_case_step::Column::StepNumber)
        .order_by_asc(test_case_step::Column::Id)
        .all(db)
        .await?
    {
        steps_by_case
            .entry(step.test_case_id)
            .or_default()
            .push(step.into());
    }

    let links = test_case_tag::Entity::find()
        .filter(test_case_tag::Column::TestCaseId.is_in(ids.clone()))
        .all(db)
        .await?;
    let tag_ids: HashSet<i32> = links.iter().map(|l| l.tag_id).collect();
    let tag_by_id: HashMap<i32, Tag> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, Tag::from(t)))
        .collect();
    let mut tags_by_case: HashMap<i32, Vec<Tag>> = HashMap::new();
    for link in links {
        if let Some(tag) = tag_by_id.get(&link.tag_id) {
            tags_by_case
                .entry(link.test_case_id)
                .or_default()
                .push(tag.clone());
        }
    }
    for case_tags in tags_by_case.values_mut() {
        case_tags.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let author_ids: HashSet<i32> = cases.iter().filter_map(|c| c.author_id).collect();
    let author_by_id: HashMap<i32, UserResponse> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, UserResponse::from(u)))
        .collect();

    Ok(cases
        .into_iter()
        .map(|c| TestCaseDetail {
            steps: steps_by_case.remove(&c.id).unwrap_or_default(),
            tags: tags_by_case.remove(&c.id).unwrap_or_default(),
            author: c.author_id.and_then(|id| author_by_id.get(&id).cloned()),
            id: c.id,
            title: c.title,
            description: c.description,
            pre_conditions: c.pre_conditions,
            priority: c.priority,
            status: c.status,
            is_automated: c.is_automated,
            folder_id: c.folder_id,
            author_id: c.author_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        })
        .collect())
}

/// Load one hydrated test case.
pub async fn find_detail<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<TestCaseDetail>> {
    let Some(model) = test_case::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    Ok(hydrate(db, vec![model]).await?.pop())
}

/// Persist one import draft: folder path, test case row, numbered steps and tags.
async fn insert_draft<C: ConnectionTrait>(
    db: &C,
    draft: &TestCaseDraft,
    default_folder: Option<i32>,
    author_id: i32,
) -> AppResult<i32> {
    let folder_id = match draft.location.as_deref() {
        Some(path) => folders::resolve_path(db, path, default_folder).await?,
        None => default_folder,
    };

    let now = Utc::now();
    let created = test_case::ActiveModel {
        title: Set(draft.title.clone()),
        description: Set(draft.description.clone()),
        pre_conditions: Set(draft.pre_conditions.clone()),
        priority: Set(draft.priority.as_str().to_string()),
        status: Set(draft.status.clone()),
        is_automated: Set(draft.is_automated),
        folder_id: Set(folder_id),
        author_id: Set(Some(author_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert test case: {}", e)))?;

    insert_steps(db, created.id, &draft.steps).await?;
    tags::replace_links(db, created.id, &draft.tags).await?;

    Ok(created.id)
}

/// Test cases matching the export/report filters, newest first.
async fn filtered_cases<C: ConnectionTrait>(
    db: &C,
    filter: &TestCaseFilter,
) -> AppResult<Vec<test_case::Model>> {
    let mut query = test_case::Entity::find();

    if let Some(folder_id) = filter.folder_id {
        let all = folders::list_all(db).await?;
        let scope = FolderTree::new(&all).descendant_ids(folder_id);
        query = query.filter(test_case::Column::FolderId.is_in(scope));
    }
    if let Some(priority) = filter.priority.as_deref().filter(|p| !p.is_empty()) {
        query = query.filter(test_case::Column::Priority.eq(priority));
    }
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(test_case::Column::Status.eq(status));
    }
    if let Some(automated) = filter.automated.as_deref().filter(|a| !a.is_empty()) {
        query = query.filter(test_case::Column::IsAutomated.eq(automated == "true"));
    }

    let cases = query
        .order_by_desc(test_case::Column::CreatedAt)
        .order_by_desc(test_case::Column::Id)
        .all(db)
        .await?;
    Ok(cases)
}

/// Names of the given folders.
pub async fn folder_names<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> AppResult<HashMap<i32, String>> {
    let ids: HashSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(folder::Entity::find()
        .filter(folder::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|f| (f.id, f.name))
        .collect())
}

impl DbPool {
    /// List test cases, optionally restricted to a folder and all of its subfolders.
    pub async fn list_test_cases(&self, folder_id: Option<i32>) -> AppResult<Vec<TestCaseDetail>> {
        let db = self.connection();
        let mut query = test_case::Entity::find();

        if let Some(folder_id) = folder_id {
            let all = folders::list_all(db).await?;
            let scope = FolderTree::new(&all).descendant_ids(folder_id);
            query = query.filter(test_case::Column::FolderId.is_in(scope));
        }

        let cases = query.order_by_asc(test_case::Column::Id).all(db).await?;
        hydrate(db, cases).await
    }

    /// Get a test case with steps, tags and author.
    pub async fn get_test_case(&self, id: i32) -> AppResult<TestCaseDetail> {
        find_detail(self.connection(), id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))
    }

    /// Create a test case. Steps are numbered 1..N in the order supplied.
    pub async fn create_test_case(
        &self,
        payload: &TestCasePayload,
        author_id: i32,
    ) -> AppResult<TestCaseDetail> {
        let title = required_title(payload)?;
        let steps = renumber(payload.steps.as_deref().unwrap_or_default())?;

        let txn = self.connection().begin().await?;

        if let Some(folder_id) = payload.folder_id {
            folders::ensure_exists(&txn, folder_id).await?;
        }

        let now = Utc::now();
        let created = test_case::ActiveModel {
            title: Set(title),
            description: Set(blank_to_none(&payload.description)),
            pre_conditions: Set(blank_to_none(&payload.pre_conditions)),
            priority: Set(payload.priority.unwrap_or_default().as_str().to_string()),
            status: Set(blank_to_none(&payload.status).unwrap_or_else(|| "Draft".to_string())),
            is_automated: Set(payload.is_automated.unwrap_or(false)),
            folder_id: Set(payload.folder_id),
            author_id: Set(Some(author_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert test case: {}", e)))?;

        insert_steps(&txn, created.id, &steps).await?;
        tags::replace_links(&txn, created.id, payload.tags.as_deref().unwrap_or_default())
            .await?;

        let detail = find_detail(&txn, created.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to fetch newly inserted test case".into()))?;
        txn.commit().await?;

        info!(test_case_id = detail.id, steps = detail.steps.len(), "Test case created");
        Ok(detail)
    }

    /// Update a test case, replacing its steps and tags with exactly those supplied.
    ///
    /// Omitted `priority`, `status` and `isAutomated` keep their current values;
    /// every other field is overwritten.
    pub async fn update_test_case(
        &self,
        id: i32,
        payload: &TestCasePayload,
    ) -> AppResult<TestCaseDetail> {
        let title = required_title(payload)?;
        let steps = renumber(payload.steps.as_deref().unwrap_or_default())?;

        let txn = self.connection().begin().await?;

        let existing = test_case::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

        if let Some(folder_id) = payload.folder_id {
            folders::ensure_exists(&txn, folder_id).await?;
        }

        let mut active: test_case::ActiveModel = existing.into();
        active.title = Set(title);
        active.description = Set(blank_to_none(&payload.description));
        active.pre_conditions = Set(blank_to_none(&payload.pre_conditions));
        if let Some(priority) = payload.priority {
            active.priority = Set(priority.as_str().to_string());
        }
        if let Some(status) = blank_to_none(&payload.status) {
            active.status = Set(status);
        }
        if let Some(is_automated) = payload.is_automated {
            active.is_automated = Set(is_automated);
        }
        active.folder_id = Set(payload.folder_id);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        test_case_step::Entity::delete_many()
            .filter(test_case_step::Column::TestCaseId.eq(id))
            .exec(&txn)
            .await?;
        insert_steps(&txn, id, &steps).await?;
        tags::replace_links(&txn, id, payload.tags.as_deref().unwrap_or_default()).await?;

        let detail = find_detail(&txn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;
        txn.commit().await?;

        Ok(detail)
    }

    /// Delete a test case; its steps and tag links go with it.
    ///
    /// Run entries created from it stay, with the reference cleared.
    pub async fn delete_test_case(&self, id: i32) -> AppResult<()> {
        let result = test_case::Entity::delete_by_id(id)
            .exec(self.connection())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Test case {}", id)));
        }
        info!(test_case_id = id, "Test case deleted");
        Ok(())
    }

    /// Delete several test cases at once. Returns the number of rows removed.
    pub async fn bulk_delete_test_cases(&self, ids: &[i32]) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::InvalidInput(
                "testCaseIds must not be empty".to_string(),
            ));
        }

        let result = test_case::Entity::delete_many()
            .filter(test_case::Column::Id.is_in(ids.iter().copied()))
            .exec(self.connection())
            .await?;

        if result.rows_affected < ids.len() as u64 {
            warn!(
                requested = ids.len(),
                deleted = result.rows_affected,
                "Bulk delete removed fewer test cases than requested"
            );
        }
        Ok(result.rows_affected)
    }

    /// Import grouped rows. Each group is committed on its own, so a failing
    /// group is reported and skipped without undoing earlier ones.
    pub async fn import_test_cases(
        &self,
        rows: Vec<ImportRow>,
        default_folder: Option<i32>,
        author_id: i32,
    ) -> AppResult<ImportResponse> {
        if let Some(folder_id) = default_folder {
            folders::ensure_exists(self.connection(), folder_id).await?;
        }

        let groups = csv_import::group_rows(rows);
        let mut imported = 0usize;
        let mut details: Vec<ImportRowError> = Vec::new();

        for (idx, group) in groups.iter().enumerate() {
            let row = idx + 1;

            let draft = match csv_import::build_draft(group) {
                Ok(draft) => draft,
                Err(error) => {
                    details.push(ImportRowError { row, error });
                    continue;
                }
            };

            let txn = self.connection().begin().await?;
            match insert_draft(&txn, &draft, default_folder, author_id).await {
                Ok(_) => match txn.commit().await {
                    Ok(()) => imported += 1,
                    Err(e) => details.push(ImportRowError {
                        row,
                        error: e.to_string(),
                    }),
                },
                Err(e) => {
                    warn!(row, error = %e, "Import group failed");
                    if let Err(rollback) = txn.rollback().await {
                        warn!(row, error = %rollback, "Rollback failed");
                    }
                    details.push(ImportRowError {
                        row,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            groups = groups.len(),
            imported,
            errors = details.len(),
            "CSV import finished"
        );

        Ok(ImportResponse {
            success: true,
            imported,
            errors: details.len(),
            details,
        })
    }

    /// Test cases matching the filters, with folder display names, for CSV export.
    pub async fn export_test_cases(&self, filter: &TestCaseFilter) -> AppResult<Vec<ExportCase>> {
        let db = self.connection();
        let cases = hydrate(db, filtered_cases(db, filter).await?).await?;
        let names = folder_names(db, cases.iter().filter_map(|c| c.folder_id)).await?;

        Ok(cases
            .into_iter()
            .map(|case| ExportCase {
                location: case.folder_id.and_then(|id| names.get(&id).cloned()),
                case,
            })
            .collect())
    }

    /// Filtered test cases for the reports table (no steps or tags needed).
    pub async fn report_test_cases(
        &self,
        filter: &TestCaseFilter,
    ) -> AppResult<Vec<(test_case::Model, Option<String>, Option<String>)>> {
        let db = self.connection();
        let cases = filtered_cases(db, filter).await?;

        let names = folder_names(db, cases.iter().filter_map(|c| c.folder_id)).await?;
        let author_ids: HashSet<i32> = cases.iter().filter_map(|c| c.author_id).collect();
        let authors: HashMap<i32, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(cases
            .into_iter()
            .map(|c| {
                let folder = c.folder_id.and_then(|id| names.get(&id).cloned());
                let author = c
                    .author_id
                    .and_then(|id| authors.get(&id))
                    .map(|u| u.name.clone().unwrap_or_else(|| u.email.clone()));
                (c, folder, author)
            })
            .collect())
    }
}
