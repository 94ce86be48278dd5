//! Redmine REST API boundary
//!
//! The import pipeline only talks to Redmine through the [`RedmineApi`]
//! trait: reference-data reads (projects, memberships, statuses, versions),
//! a parent-issue existence probe, and issue creation. [`RedmineClient`] is
//! the production implementation over blocking HTTP; tests substitute an
//! in-memory fake.

pub mod client;
pub mod error;
pub mod models;

pub use client::RedmineClient;
pub use error::ApiError;
pub use models::{
    CreatedIssue, CustomFieldValue, IssueStatus, Membership, NamedItem, NewIssue, Project, Version,
};

/// Remote tracker operations the pipeline depends on
pub trait RedmineApi {
    fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    fn list_memberships(&self, project_id: u64) -> Result<Vec<Membership>, ApiError>;
    fn list_statuses(&self) -> Result<Vec<IssueStatus>, ApiError>;
    fn list_versions(&self, project_id: u64) -> Result<Vec<Version>, ApiError>;
    /// Existence probe for parent-task validation; `Ok(false)` on 404
    fn issue_exists(&self, issue_id: u64) -> Result<bool, ApiError>;
    fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, ApiError>;
}
