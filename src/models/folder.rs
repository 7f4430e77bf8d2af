//! Folder models.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Folder as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub project_name: String,
}

impl From<crate::entity::folder::Model> for Folder {
    fn from(m: crate::entity::folder::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            parent_id: m.parent_id,
            project_name: m.project_name,
        }
    }
}

/// Folder with its nested children, in storage order.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub project_name: String,
    #[schema(no_recursion)]
    pub children: Vec<FolderNode>,
}

/// Request to create a folder.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i32>,
    #[serde(default)]
    pub project_name: Option<String>,
}

/// Request to rename and/or move a folder.
///
/// `parentId` absent keeps the current parent; `parentId: null` moves the folder to the root.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    pub name: String,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub parent_id: Option<Option<i32>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
