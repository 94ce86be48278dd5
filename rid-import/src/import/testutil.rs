//! In-memory Redmine fake for cache/validator/orchestrator tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::api::{
    ApiError, CreatedIssue, IssueStatus, Membership, NamedItem, NewIssue, Project, RedmineApi,
    Version,
};
use crate::import::row::DiscrepancyRow;

/// A row that resolves cleanly against the usual test fake: project
/// "Alpha" (id 1), assignee "Jane Doe" (id 7), status "Open", target
/// version "R1" (id 3), no parent task
pub fn sample_row() -> DiscrepancyRow {
    DiscrepancyRow {
        code: "RID-001".to_string(),
        subject: "Antenna gain mismatch".to_string(),
        description: "Observed in test run 4".to_string(),
        status: "Open".to_string(),
        priority: "Normal".to_string(),
        target_version: Some("R1".to_string()),
        originator_company: "ACME".to_string(),
        rid_category: "Design".to_string(),
        problem_location: "Section 3.2".to_string(),
        recommended_solution: "-".to_string(),
        parent_task: None,
        assignee: "Jane Doe".to_string(),
        project: "Alpha".to_string(),
        reply_from_responsible: None,
        action_to_implement: None,
        raw: serde_json::Map::new(),
    }
}

/// Fake tracker backed by plain maps, with per-method call counters
#[derive(Default)]
pub struct FakeRedmine {
    projects: Vec<Project>,
    statuses: Vec<IssueStatus>,
    members: HashMap<u64, Vec<Membership>>,
    versions: HashMap<u64, Vec<Version>>,
    issues: HashSet<u64>,
    auth_rejected: bool,
    unreachable: Cell<bool>,
    reject_creates: bool,
    /// Drop the connection after this many successful creates
    disconnect_after: Option<usize>,
    created: RefCell<Vec<NewIssue>>,
    calls: RefCell<HashMap<&'static str, usize>>,
}

impl FakeRedmine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, id: u64, name: &str) -> Self {
        self.projects.push(Project {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_status(mut self, id: u64, name: &str) -> Self {
        self.statuses.push(IssueStatus {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_member(mut self, project_id: u64, user_id: u64, name: &str) -> Self {
        self.members.entry(project_id).or_default().push(Membership {
            user: Some(NamedItem {
                id: user_id,
                name: name.to_string(),
            }),
        });
        self
    }

    pub fn with_group_membership(mut self, project_id: u64, _group: &str) -> Self {
        self.members
            .entry(project_id)
            .or_default()
            .push(Membership { user: None });
        self
    }

    pub fn with_version(mut self, project_id: u64, version_id: u64, name: &str) -> Self {
        self.versions.entry(project_id).or_default().push(Version {
            id: version_id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_issue(mut self, issue_id: u64) -> Self {
        self.issues.insert(issue_id);
        self
    }

    pub fn with_auth_rejected(mut self) -> Self {
        self.auth_rejected = true;
        self
    }

    pub fn with_creates_rejected(mut self) -> Self {
        self.reject_creates = true;
        self
    }

    pub fn with_disconnect_after_creates(mut self, creates: usize) -> Self {
        self.disconnect_after = Some(creates);
        self
    }

    /// Simulate the remote dropping off the network from now on
    pub fn set_unreachable(&self) {
        self.unreachable.set(true);
    }

    pub fn created(&self) -> Vec<NewIssue> {
        self.created.borrow().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().get(method).copied().unwrap_or(0)
    }

    fn track(&self, method: &'static str) -> Result<(), ApiError> {
        *self.calls.borrow_mut().entry(method).or_insert(0) += 1;
        if self.auth_rejected {
            return Err(ApiError::Auth);
        }
        if self.unreachable.get() {
            return Err(ApiError::Connectivity {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn project_name(&self, project_id: u64) -> String {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("project-{project_id}"))
    }
}

impl RedmineApi for FakeRedmine {
    fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.track("list_projects")?;
        Ok(self.projects.clone())
    }

    fn list_memberships(&self, project_id: u64) -> Result<Vec<Membership>, ApiError> {
        self.track("list_memberships")?;
        Ok(self.members.get(&project_id).cloned().unwrap_or_default())
    }

    fn list_statuses(&self) -> Result<Vec<IssueStatus>, ApiError> {
        self.track("list_statuses")?;
        Ok(self.statuses.clone())
    }

    fn list_versions(&self, project_id: u64) -> Result<Vec<Version>, ApiError> {
        self.track("list_versions")?;
        Ok(self.versions.get(&project_id).cloned().unwrap_or_default())
    }

    fn issue_exists(&self, issue_id: u64) -> Result<bool, ApiError> {
        self.track("issue_exists")?;
        Ok(self.issues.contains(&issue_id))
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, ApiError> {
        self.track("create_issue")?;
        if self.reject_creates {
            return Err(ApiError::Remote {
                status: 422,
                message: "Subject cannot be blank".to_string(),
            });
        }

        let mut created = self.created.borrow_mut();
        created.push(issue.clone());
        if let Some(limit) = self.disconnect_after {
            if created.len() >= limit {
                self.unreachable.set(true);
            }
        }

        Ok(CreatedIssue {
            id: 100 + created.len() as u64,
            subject: issue.subject.clone(),
            project: NamedItem {
                id: issue.project_id,
                name: self.project_name(issue.project_id),
            },
        })
    }
}
