//! Fixed-shape row record for one Review Item Discrepancy
//!
//! A normalized sheet row is reshaped into [`DiscrepancyRow`] before
//! validation. Business logic only ever touches the named fields; the raw
//! column map is retained for diagnostic logging and nothing else, so
//! extra columns pass through harmlessly.

use serde_json::{Map, Value};

pub const COL_ID: &str = "Id";
pub const COL_CODE: &str = "Code";
pub const COL_SUBJECT: &str = "Subject";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_STATUS: &str = "Status";
pub const COL_PRIORITY: &str = "Priority";
pub const COL_TARGET_VERSION: &str = "Target version";
pub const COL_ORIGINATOR_COMPANY: &str = "Originator Company";
pub const COL_RID_CATEGORY: &str = "RID Category";
pub const COL_PROBLEM_LOCATION: &str = "Problem Location";
pub const COL_RECOMMENDED_SOLUTION: &str = "Recommended Solution";
pub const COL_PARENT_TASK: &str = "Parent task";
pub const COL_ASSIGNEE: &str = "Assignee";
pub const COL_PROJECT: &str = "Project";
pub const COL_REPLY_FROM_RESPONSIBLE: &str = "Reply from the Responsible";
pub const COL_ACTION_TO_IMPLEMENT: &str = "Action to implement";

/// The review workflow states a RID can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Assigned,
    Answered,
    Closed,
    Rejected,
    ClosedWithAction,
    ClosedWithNoAction,
    Implemented,
}

impl Status {
    pub const ALL: [Status; 8] = [
        Status::Open,
        Status::Assigned,
        Status::Answered,
        Status::Closed,
        Status::Rejected,
        Status::ClosedWithAction,
        Status::ClosedWithNoAction,
        Status::Implemented,
    ];

    /// The status name as Redmine and the spreadsheets spell it
    pub fn name(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Assigned => "Assigned",
            Status::Answered => "Answered",
            Status::Closed => "Closed",
            Status::Rejected => "Rejected",
            Status::ClosedWithAction => "Closed with Action",
            Status::ClosedWithNoAction => "Closed with No Action",
            Status::Implemented => "Implemented",
        }
    }

    pub fn from_name(name: &str) -> Option<Status> {
        Status::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A row that does not fit the expected column shape
#[derive(Debug, Clone, PartialEq)]
pub enum RowShapeError {
    MissingColumn { column: String },
    InvalidIssueId { column: String, value: String },
}

impl std::fmt::Display for RowShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowShapeError::MissingColumn { column } => {
                write!(f, "required column '{}' is missing or empty", column)
            }
            RowShapeError::InvalidIssueId { column, value } => {
                write!(f, "column '{}' holds '{}', expected an issue id", column, value)
            }
        }
    }
}

impl std::error::Error for RowShapeError {}

/// One discrepancy record as read from the sheet, shape-checked but not
/// yet validated against the tracker
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepancyRow {
    pub code: String,
    pub subject: String,
    pub description: String,
    /// Raw status text; membership in [`Status`] is a validator concern
    pub status: String,
    pub priority: String,
    pub target_version: Option<String>,
    pub originator_company: String,
    pub rid_category: String,
    pub problem_location: String,
    pub recommended_solution: String,
    pub parent_task: Option<u64>,
    pub assignee: String,
    pub project: String,
    pub reply_from_responsible: Option<String>,
    pub action_to_implement: Option<String>,
    /// Original column map, kept for diagnostics only
    pub raw: Map<String, Value>,
}

impl DiscrepancyRow {
    /// Shape a normalized record into a fixed row
    pub fn from_record(record: Map<String, Value>) -> Result<Self, RowShapeError> {
        let row = DiscrepancyRow {
            code: required_text(&record, COL_CODE)?,
            subject: required_text(&record, COL_SUBJECT)?,
            description: required_text(&record, COL_DESCRIPTION)?,
            status: required_text(&record, COL_STATUS)?,
            priority: required_text(&record, COL_PRIORITY)?,
            target_version: optional_text(&record, COL_TARGET_VERSION),
            originator_company: required_text(&record, COL_ORIGINATOR_COMPANY)?,
            rid_category: required_text(&record, COL_RID_CATEGORY)?,
            problem_location: required_text(&record, COL_PROBLEM_LOCATION)?,
            recommended_solution: required_text(&record, COL_RECOMMENDED_SOLUTION)?,
            parent_task: optional_issue_id(&record, COL_PARENT_TASK)?,
            assignee: required_text(&record, COL_ASSIGNEE)?,
            project: required_text(&record, COL_PROJECT)?,
            reply_from_responsible: optional_text(&record, COL_REPLY_FROM_RESPONSIBLE),
            action_to_implement: optional_text(&record, COL_ACTION_TO_IMPLEMENT),
            raw: record,
        };
        Ok(row)
    }
}

/// Render a cell as text; null and non-scalar cells count as absent
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_text(record: &Map<String, Value>, column: &str) -> Option<String> {
    record.get(column).and_then(cell_text)
}

fn required_text(record: &Map<String, Value>, column: &str) -> Result<String, RowShapeError> {
    optional_text(record, column).ok_or_else(|| RowShapeError::MissingColumn {
        column: column.to_string(),
    })
}

fn optional_issue_id(
    record: &Map<String, Value>,
    column: &str,
) -> Result<Option<u64>, RowShapeError> {
    let Some(text) = optional_text(record, column) else {
        return Ok(None);
    };
    text.parse::<u64>()
        .map(Some)
        .map_err(|_| RowShapeError::InvalidIssueId {
            column: column.to_string(),
            value: text,
        })
}
