//! CSV import: header normalization, row grouping and per-group drafts.
//!
//! Rows arrive either from an uploaded CSV file or as a JSON row list. Both are
//! reduced to [`ImportRow`]s keyed by canonical column names, then grouped into
//! one group per logical test case. Persisting a group is left to the caller.

use std::collections::HashMap;

use crate::error::AppResult;
use crate::models::Priority;

/// Header aliases, keyed by the normalized header.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("id", "id"),
    ("testcaseid", "id"),
    ("title", "title"),
    ("name", "title"),
    ("testcasename", "title"),
    ("description", "description"),
    ("desc", "description"),
    ("preconditions", "preconditions"),
    ("precondition", "preconditions"),
    ("prerequisites", "preconditions"),
    ("priority", "priority"),
    ("status", "status"),
    ("stepnumber", "stepnumber"),
    ("step", "stepnumber"),
    ("stepno", "stepnumber"),
    ("stepaction", "stepaction"),
    ("action", "stepaction"),
    ("teststep", "stepaction"),
    ("expectedresult", "expectedresult"),
    ("expected", "expectedresult"),
    ("expectedoutput", "expectedresult"),
    ("automated", "automated"),
    ("isautomated", "automated"),
    ("location", "location"),
    ("folder", "location"),
    ("path", "location"),
    ("tags", "tags"),
    ("labels", "tags"),
];

/// Lowercase and strip everything outside `[a-z0-9]`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Canonical key for a raw header; unknown headers keep their normalized form.
pub fn canonical_key(header: &str) -> String {
    let normalized = normalize_header(header);
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, key)| (*key).to_string())
        .unwrap_or(normalized)
}

/// One import row keyed by canonical column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    fields: HashMap<String, String>,
}

impl ImportRow {
    /// Build from raw `(header, value)` pairs. When two headers collapse to
    /// the same key, the first non-empty value wins.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut fields: HashMap<String, String> = HashMap::new();
        for (header, value) in pairs {
            let key = canonical_key(header.as_ref());
            if key.is_empty() {
                continue;
            }
            let value = value.into();
            match fields.get(&key) {
                Some(existing) if !existing.trim().is_empty() => {}
                _ => {
                    fields.insert(key, value);
                }
            }
        }
        Self { fields }
    }

    /// Whether the column exists in this row, even if empty.
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

/// Parse CSV bytes with a header row. Blank lines and all-empty records are skipped.
pub fn parse_csv(input: &[u8]) -> AppResult<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let row = ImportRow::from_pairs(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.trim_start_matches('\u{feff}'), v)),
        );
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Convert JSON row objects; scalars are stringified, null becomes empty.
pub fn rows_from_json(data: Vec<serde_json::Map<String, serde_json::Value>>) -> Vec<ImportRow> {
    data.into_iter()
        .map(|object| {
            ImportRow::from_pairs(object.into_iter().map(|(k, v)| {
                let value = match v {
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, value)
            }))
        })
        .collect()
}

/// Group rows into one group per logical test case.
///
/// If the first row carries an `id` column, a non-empty id starts a new group
/// and rows without one extend the current group (rows before the first id are
/// dropped). Otherwise every row with a non-empty title is its own group.
pub fn group_rows(rows: Vec<ImportRow>) -> Vec<Vec<ImportRow>> {
    let id_keyed = rows.first().is_some_and(|row| row.has("id"));
    let mut groups: Vec<Vec<ImportRow>> = Vec::new();

    if !id_keyed {
        return rows
            .into_iter()
            .filter(|row| row.value("title").is_some())
            .map(|row| vec![row])
            .collect();
    }

    for row in rows {
        if row.value("id").is_some() {
            groups.push(vec![row]);
        } else if let Some(current) = groups.last_mut() {
            current.push(row);
        }
    }

    groups
}

/// Step extracted from an import group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftStep {
    pub step_number: i32,
    pub action: String,
    pub expected_result: Option<String>,
}

/// Test case ready to persist, built from one import group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseDraft {
    pub title: String,
    pub description: Option<String>,
    pub pre_conditions: Option<String>,
    pub priority: Priority,
    pub status: String,
    pub is_automated: bool,
    /// Backslash-delimited folder path, if the row names one.
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub steps: Vec<DraftStep>,
}

/// Build the draft for one group. The error string is reported against the group.
pub fn build_draft(group: &[ImportRow]) -> Result<TestCaseDraft, String> {
    let first = group.first().ok_or_else(|| "Title is required".to_string())?;

    let title = first
        .value("title")
        .ok_or_else(|| "Title is required".to_string())?
        .to_string();

    let priority = match first.value("priority") {
        Some(raw) => Priority::parse(raw).ok_or_else(|| format!("Invalid priority '{}'", raw))?,
        None => Priority::default(),
    };

    let mut steps: Vec<DraftStep> = Vec::new();
    for row in group {
        if let (Some(number), Some(action)) = (row.value("stepnumber"), row.value("stepaction")) {
            let step_number = number
                .parse::<i32>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(steps.len() as i32 + 1);
            steps.push(DraftStep {
                step_number,
                action: action.to_string(),
                expected_result: row.value("expectedresult").map(str::to_string),
            });
        }
    }

    Ok(TestCaseDraft {
        title,
        description: first.value("description").map(str::to_string),
        pre_conditions: first.value("preconditions").map(str::to_string),
        priority,
        status: first.value("status").unwrap_or("Draft").to_string(),
        is_automated: first.value("automated").is_some_and(parse_automated),
        location: first.value("location").map(str::to_string),
        tags: first.value("tags").map(split_tags).unwrap_or_default(),
        steps,
    })
}

/// `yes` or `true`, case-insensitive.
pub fn parse_automated(raw: &str) -> bool {
    let raw = raw.trim();
    raw.eq_ignore_ascii_case("yes") || raw.eq_ignore_ascii_case("true")
}

/// Comma-separated tag list, trimmed, blanks and repeats removed.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Folder path segments split on `\`, empty segments discarded.
pub fn split_folder_path(path: &str) -> Vec<&str> {
    path.split('\\')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}
