//! Test case models: payloads, listings, bulk delete and CSV import/export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::Priority;
use super::user::UserResponse;

/// Step as supplied by callers; numbering is assigned by position.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepInput {
    pub action: String,
    #[serde(default)]
    pub expected_result: Option<String>,
}

/// Create/update payload. Updates replace steps and tags with exactly what is sent.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestCasePayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pre_conditions: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_automated: Option<bool>,
    #[serde(default)]
    pub folder_id: Option<i32>,
    #[serde(default)]
    pub steps: Option<Vec<StepInput>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Stored step.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: i32,
    pub step_number: i32,
    pub action: String,
    pub expected_result: Option<String>,
}

impl From<crate::entity::test_case_step::Model> for Step {
    fn from(m: crate::entity::test_case_step::Model) -> Self {
        Self {
            id: m.id,
            step_number: m.step_number,
            action: m.action,
            expected_result: m.expected_result,
        }
    }
}

/// Tag as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

impl From<crate::entity::tag::Model> for Tag {
    fn from(m: crate::entity::tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

/// Test case with ordered steps, tags and author.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseDetail {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub pre_conditions: Option<String>,
    pub priority: String,
    pub status: String,
    pub is_automated: bool,
    pub folder_id: Option<i32>,
    pub author_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub steps: Vec<Step>,
    pub tags: Vec<Tag>,
    pub author: Option<UserResponse>,
}

/// Query parameters for listing test cases.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTestCasesQuery {
    /// Restrict to this folder and all of its subfolders.
    pub folder_id: Option<i32>,
}

/// Request body for bulk delete.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub test_case_ids: Vec<i32>,
}

/// Bulk delete outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub success: bool,
    /// Rows actually removed.
    pub deleted: u64,
    /// Ids supplied by the caller.
    pub requested: usize,
}

/// JSON import body: raw rows keyed by column header, plus an optional default folder.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub folder_id: Option<i32>,
}

/// Error for one import group. `row` is the 1-based group index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportRowError {
    pub row: usize,
    pub error: String,
}

/// Import outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: usize,
    pub errors: usize,
    pub details: Vec<ImportRowError>,
}

/// Filters shared by the CSV export and the reports table.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseFilter {
    pub folder_id: Option<i32>,
    pub priority: Option<String>,
    pub status: Option<String>,
    /// `true` or `false`.
    pub automated: Option<String>,
}
