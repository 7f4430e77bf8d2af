//! Database operations for tags and test case tag links.

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entity::{tag, test_case_tag};
use crate::error::{AppError, AppResult};
use crate::models::Tag;

use super::DbPool;

/// Find a tag by exact name, creating it if missing.
///
/// Concurrent creators race on the unique name index; the loser's insert is
/// ignored and both re-read the same row.
pub async fn find_or_create<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<i32> {
    if let Some(existing) = find_by_name(db, name).await? {
        return Ok(existing.id);
    }

    let model = tag::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    };
    tag::Entity::insert(model)
        .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert tag: {}", e)))?;

    find_by_name(db, name)
        .await?
        .map(|t| t.id)
        .ok_or_else(|| AppError::Database(format!("Tag '{}' missing after insert", name)))
}

async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Option<tag::Model>> {
    let result = tag::Entity::find()
        .filter(tag::Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(result)
}

/// Replace the tag links of a test case with exactly `names`.
///
/// Names are trimmed; blanks and repeats are ignored.
pub async fn replace_links<C: ConnectionTrait>(
    db: &C,
    test_case_id: i32,
    names: &[String],
) -> AppResult<()> {
    test_case_tag::Entity::delete_many()
        .filter(test_case_tag::Column::TestCaseId.eq(test_case_id))
        .exec(db)
        .await?;

    let mut linked: Vec<i32> = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let tag_id = find_or_create(db, name).await?;
        if linked.contains(&tag_id) {
            continue;
        }
        linked.push(tag_id);

        test_case_tag::Entity::insert(test_case_tag::ActiveModel {
            test_case_id: Set(test_case_id),
            tag_id: Set(tag_id),
        })
        .exec_without_returning(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to link tag: {}", e)))?;
    }

    Ok(())
}

impl DbPool {
    /// All tags ordered by name.
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let tags = tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(self.connection())
            .await?;
        Ok(tags.into_iter().map(Tag::from).collect())
    }
}
