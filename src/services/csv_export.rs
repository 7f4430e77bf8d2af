//! CSV export: one row per step, test case fields on the first row of each block.

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::TestCaseDetail;

/// Display id for a test case, e.g. `TC-0042`.
pub fn format_case_id(id: i32) -> String {
    format!("TC-{:04}", id)
}

/// Test case plus the display name of its folder.
pub struct ExportCase {
    pub case: TestCaseDetail,
    pub location: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct ExportRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Preconditions")]
    preconditions: String,
    #[serde(rename = "Priority")]
    priority: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Automated")]
    automated: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Tags")]
    tags: String,
    #[serde(rename = "StepNumber")]
    step_number: String,
    #[serde(rename = "StepAction")]
    step_action: String,
    #[serde(rename = "ExpectedResult")]
    expected_result: String,
}

impl ExportRow {
    fn header_for(export: &ExportCase) -> Self {
        let case = &export.case;
        Self {
            id: format_case_id(case.id),
            title: case.title.clone(),
            description: case.description.clone().unwrap_or_default(),
            preconditions: case.pre_conditions.clone().unwrap_or_default(),
            priority: case.priority.clone(),
            status: case.status.clone(),
            automated: if case.is_automated { "Yes" } else { "No" }.to_string(),
            location: export.location.clone().unwrap_or_default(),
            tags: case
                .tags
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            ..Default::default()
        }
    }
}

/// Render test cases to CSV bytes with a header row.
pub fn write_csv(cases: &[ExportCase]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for export in cases {
        if export.case.steps.is_empty() {
            writer.serialize(ExportRow::header_for(export))?;
            continue;
        }

        for (idx, step) in export.case.steps.iter().enumerate() {
            let mut row = if idx == 0 {
                ExportRow::header_for(export)
            } else {
                ExportRow::default()
            };
            row.step_number = step.step_number.to_string();
            row.step_action = step.action.clone();
            row.expected_result = step.expected_result.clone().unwrap_or_default();
            writer.serialize(row)?;
        }
    }

    if cases.is_empty() {
        writer.write_record([
            "ID",
            "Title",
            "Description",
            "Preconditions",
            "Priority",
            "Status",
            "Automated",
            "Location",
            "Tags",
            "StepNumber",
            "StepAction",
            "ExpectedResult",
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV export: {}", e)))
}
