//! Database operations for folders, including folder-path resolution.

use chrono::Utc;
use sea_orm::*;
use tracing::{debug, info};

use crate::entity::folder;
use crate::error::{AppError, AppResult};
use crate::models::{CreateFolderRequest, Folder, FolderNode, UpdateFolderRequest};
use crate::services::csv_import::split_folder_path;
use crate::services::folder_tree::FolderTree;

use super::DbPool;

/// Project assigned to folders created without one.
pub const DEFAULT_PROJECT: &str = "Default";

/// All folders in storage order.
pub async fn list_all<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Folder>> {
    let folders = folder::Entity::find()
        .order_by_asc(folder::Column::Id)
        .all(db)
        .await?;
    Ok(folders.into_iter().map(Folder::from).collect())
}

/// Fail with NotFound unless the folder exists.
pub async fn ensure_exists<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    folder::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Folder {}", id)))
}

/// Find the folder named `name` directly under `parent_id` (NULL means root).
pub async fn find_child<C: ConnectionTrait>(
    db: &C,
    name: &str,
    parent_id: Option<i32>,
) -> AppResult<Option<folder::Model>> {
    let parent_filter = match parent_id {
        Some(id) => folder::Column::ParentId.eq(id),
        None => folder::Column::ParentId.is_null(),
    };

    let result = folder::Entity::find()
        .filter(folder::Column::Name.eq(name))
        .filter(parent_filter)
        .order_by_asc(folder::Column::Id)
        .one(db)
        .await?;
    Ok(result)
}

async fn insert<C: ConnectionTrait>(
    db: &C,
    name: &str,
    parent_id: Option<i32>,
    project_name: &str,
) -> AppResult<folder::Model> {
    let model = folder::ActiveModel {
        name: Set(name.to_string()),
        parent_id: Set(parent_id),
        project_name: Set(project_name.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert folder: {}", e)))
}

/// Resolve a backslash-delimited folder path to its leaf folder id.
///
/// Walks the path from the root, reusing an existing folder with the same
/// name under the current parent and creating it otherwise. Lookups always
/// precede creation, so resolving the same path again creates nothing.
/// An empty path yields `default_folder`.
pub async fn resolve_path<C: ConnectionTrait>(
    db: &C,
    path: &str,
    default_folder: Option<i32>,
) -> AppResult<Option<i32>> {
    let segments = split_folder_path(path);
    if segments.is_empty() {
        return Ok(default_folder);
    }

    let mut current: Option<i32> = None;
    for segment in segments {
        let id = match find_child(db, segment, current).await? {
            Some(existing) => existing.id,
            None => {
                let created = insert(db, segment, current, DEFAULT_PROJECT).await?;
                debug!(folder_id = created.id, name = %segment, "Created folder from path");
                created.id
            }
        };
        current = Some(id);
    }

    Ok(current)
}

impl DbPool {
    /// All folders in storage order.
    pub async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        list_all(self.connection()).await
    }

    /// Folder forest for navigation.
    pub async fn folder_tree(&self) -> AppResult<Vec<FolderNode>> {
        let folders = list_all(self.connection()).await?;
        Ok(FolderTree::new(&folders).forest())
    }

    /// Get a folder by ID.
    pub async fn get_folder(&self, id: i32) -> AppResult<Folder> {
        folder::Entity::find_by_id(id)
            .one(self.connection())
            .await?
            .map(Folder::from)
            .ok_or_else(|| AppError::NotFound(format!("Folder {}", id)))
    }

    /// Create a folder under an existing parent (or at the root).
    pub async fn create_folder(&self, req: &CreateFolderRequest) -> AppResult<Folder> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Folder name is required".to_string()));
        }

        let txn = self.connection().begin().await?;

        if let Some(parent_id) = req.parent_id {
            ensure_exists(&txn, parent_id).await?;
        }

        let project = req
            .project_name
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PROJECT);

        let created = insert(&txn, name, req.parent_id, project).await?;
        txn.commit().await?;

        info!(folder_id = created.id, parent_id = ?created.parent_id, "Folder created");
        Ok(created.into())
    }

    /// Rename and optionally move a folder.
    ///
    /// Moving a folder under itself or one of its descendants is rejected.
    pub async fn update_folder(&self, id: i32, req: &UpdateFolderRequest) -> AppResult<Folder> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Folder name is required".to_string()));
        }

        let txn = self.connection().begin().await?;

        let existing = folder::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Folder {}", id)))?;

        let mut active: folder::ActiveModel = existing.into();
        active.name = Set(name.to_string());

        if let Some(parent_id) = req.parent_id {
            if let Some(new_parent) = parent_id {
                ensure_exists(&txn, new_parent).await?;
                let folders = list_all(&txn).await?;
                if FolderTree::new(&folders).is_within(id, new_parent) {
                    return Err(AppError::InvalidInput(
                        "Cannot move a folder into itself or one of its subfolders".to_string(),
                    ));
                }
            }
            active.parent_id = Set(parent_id);
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated.into())
    }

    /// Delete a folder and its subtree. Test cases in it keep existing without a folder.
    pub async fn delete_folder(&self, id: i32) -> AppResult<()> {
        let result = folder::Entity::delete_by_id(id)
            .exec(self.connection())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Folder {}", id)));
        }
        info!(folder_id = id, "Folder deleted");
        Ok(())
    }
}
