//! Per-row validation against the reference cache
//!
//! Checks run in a fixed order and stop at the first failure: project,
//! assignee, parent task, target version, status. The only remote reads
//! are the cache's lazy member/version fills and the parent-issue
//! existence probe; nothing here mutates the tracker.

use crate::api::{ApiError, RedmineApi};

use super::cache::ReferenceCache;
use super::row::{DiscrepancyRow, Status};

/// A row that failed one of the cross-reference checks
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    UnknownProject {
        name: String,
        valid: Vec<String>,
    },
    UnknownAssignee {
        name: String,
        project: String,
        valid: Vec<String>,
    },
    UnknownParentTask {
        issue_id: u64,
    },
    UnknownTargetVersion {
        name: String,
        project: String,
        valid: Vec<String>,
    },
    InvalidStatus {
        value: String,
        valid: Vec<String>,
    },
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::UnknownProject { name, valid } => {
                write!(
                    f,
                    "'{}' is not a known project, valid projects are [{}]",
                    name,
                    valid.join(", ")
                )
            }
            ValidationFailure::UnknownAssignee {
                name,
                project,
                valid,
            } => {
                write!(
                    f,
                    "'{}' is not a member of project '{}', valid assignees are [{}]",
                    name,
                    project,
                    valid.join(", ")
                )
            }
            ValidationFailure::UnknownParentTask { issue_id } => {
                write!(f, "parent task {} does not exist", issue_id)
            }
            ValidationFailure::UnknownTargetVersion {
                name,
                project,
                valid,
            } => {
                write!(
                    f,
                    "'{}' is not a version of project '{}', valid versions are [{}]",
                    name,
                    project,
                    valid.join(", ")
                )
            }
            ValidationFailure::InvalidStatus { value, valid } => {
                write!(
                    f,
                    "'{}' is not a valid status, expected one of [{}]",
                    value,
                    valid.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// Why a single row could not be turned into a validated row
///
/// Validation failures are ordinary row rejections; API errors are the
/// remote misbehaving and get a different recovery policy upstream
/// (connectivity aborts the file, auth aborts the batch).
#[derive(Debug)]
pub enum RowError {
    Invalid(ValidationFailure),
    Api(ApiError),
}

impl From<ValidationFailure> for RowError {
    fn from(failure: ValidationFailure) -> Self {
        RowError::Invalid(failure)
    }
}

impl From<ApiError> for RowError {
    fn from(err: ApiError) -> Self {
        RowError::Api(err)
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::Invalid(failure) => failure.fmt(f),
            RowError::Api(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for RowError {}

/// A discrepancy row whose cross-referenced fields all resolved
///
/// Only [`validate`] constructs one; the resolved ids are what the mapper
/// submits, the textual fields ride along for subject/description and the
/// custom-field payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub row: DiscrepancyRow,
    pub project_id: u64,
    /// Canonical project name from the cache, not the spreadsheet casing
    pub project_name: String,
    pub status: Status,
    pub status_id: u64,
    pub assignee_id: u64,
    pub fixed_version_id: Option<u64>,
    pub parent_issue_id: Option<u64>,
}

/// Cross-check one row against the cache, resolving names to ids
pub fn validate(
    row: DiscrepancyRow,
    cache: &mut ReferenceCache,
    api: &dyn RedmineApi,
) -> Result<ValidatedRow, RowError> {
    // 1. Project
    let (project_id, project_name) = match cache.resolve_project(&row.project) {
        Some(project) => (project.id, project.name.clone()),
        None => {
            return Err(ValidationFailure::UnknownProject {
                name: row.project.clone(),
                valid: cache.project_names(),
            }
            .into());
        }
    };

    // 2. Assignee must be a member of that project
    let members = cache.members(api, project_id)?;
    let assignee_id = match members.get(&row.assignee) {
        Some(&id) => id,
        None => {
            let mut valid: Vec<String> = members.keys().cloned().collect();
            valid.sort();
            return Err(ValidationFailure::UnknownAssignee {
                name: row.assignee.clone(),
                project: project_name,
                valid,
            }
            .into());
        }
    };

    // 3. Parent task, when given, must exist remotely
    let parent_issue_id = match row.parent_task {
        Some(issue_id) => {
            if !api.issue_exists(issue_id)? {
                return Err(ValidationFailure::UnknownParentTask { issue_id }.into());
            }
            Some(issue_id)
        }
        None => None,
    };

    // 4. Target version, when given, must belong to the project
    let fixed_version_id = match &row.target_version {
        Some(version_name) => {
            let versions = cache.versions(api, project_id)?;
            match versions.get(version_name) {
                Some(&id) => Some(id),
                None => {
                    let mut valid: Vec<String> = versions.keys().cloned().collect();
                    valid.sort();
                    return Err(ValidationFailure::UnknownTargetVersion {
                        name: version_name.clone(),
                        project: project_name,
                        valid,
                    }
                    .into());
                }
            }
        }
        None => None,
    };

    // 5. Status must be in the RID enumeration and known to the tracker
    let status = match Status::from_name(&row.status) {
        Some(status) => status,
        None => {
            return Err(ValidationFailure::InvalidStatus {
                value: row.status.clone(),
                valid: Status::ALL.iter().map(|s| s.name().to_string()).collect(),
            }
            .into());
        }
    };
    let status_id = match cache.status_id(status.name()) {
        Some(id) => id,
        None => {
            return Err(ValidationFailure::InvalidStatus {
                value: row.status.clone(),
                valid: cache.status_names(),
            }
            .into());
        }
    };

    Ok(ValidatedRow {
        row,
        project_id,
        project_name,
        status,
        status_id,
        assignee_id,
        fixed_version_id,
        parent_issue_id,
    })
}
