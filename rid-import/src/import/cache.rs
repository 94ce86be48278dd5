//! Snapshot of Redmine reference data for one processing run
//!
//! Projects and statuses are fetched eagerly when the cache is built;
//! member and version lookups are fetched on first reference to a project
//! and memoized for the rest of the run. Nothing is invalidated mid-run:
//! a project created remotely while a batch is in flight will not be seen
//! until the next session builds a fresh cache.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::api::{ApiError, Project, RedmineApi};

/// Case-insensitive key for project-name lookups
fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug)]
pub struct ReferenceCache {
    projects: Vec<Project>,
    /// folded name -> index into `projects`
    project_index: HashMap<String, usize>,
    /// status name (exact) -> status id
    statuses: HashMap<String, u64>,
    status_names: Vec<String>,
    /// project id -> member display name -> user id
    members: HashMap<u64, HashMap<String, u64>>,
    /// project id -> version name -> version id
    versions: HashMap<u64, HashMap<String, u64>>,
}

impl ReferenceCache {
    /// Fetch the eager parts of the snapshot
    pub fn build(api: &dyn RedmineApi) -> Result<Self, ApiError> {
        let projects = api.list_projects()?;

        let mut project_index = HashMap::new();
        for (idx, project) in projects.iter().enumerate() {
            // First entry wins when two canonical names fold together
            match project_index.entry(fold(&project.name)) {
                Entry::Vacant(entry) => {
                    entry.insert(idx);
                }
                Entry::Occupied(_) => {
                    log::warn!(
                        "Project name '{}' is ambiguous under case folding, keeping the first match",
                        project.name
                    );
                }
            }
        }

        let remote_statuses = api.list_statuses()?;
        let status_names: Vec<String> = remote_statuses.iter().map(|s| s.name.clone()).collect();
        let statuses = remote_statuses.into_iter().map(|s| (s.name, s.id)).collect();

        log::info!(
            "Reference cache ready: {} projects, {} statuses",
            projects.len(),
            status_names.len()
        );

        Ok(Self {
            projects,
            project_index,
            statuses,
            status_names,
            members: HashMap::new(),
            versions: HashMap::new(),
        })
    }

    /// Resolve a spreadsheet project name to its canonical entry
    pub fn resolve_project(&self, name: &str) -> Option<&Project> {
        self.project_index
            .get(&fold(name))
            .map(|&idx| &self.projects[idx])
    }

    /// Canonical names of every known project
    pub fn project_names(&self) -> Vec<String> {
        self.projects.iter().map(|p| p.name.clone()).collect()
    }

    pub fn status_id(&self, name: &str) -> Option<u64> {
        self.statuses.get(name).copied()
    }

    pub fn status_names(&self) -> Vec<String> {
        self.status_names.clone()
    }

    /// Member display-name -> user-id map for a project, fetched once
    pub fn members(
        &mut self,
        api: &dyn RedmineApi,
        project_id: u64,
    ) -> Result<&HashMap<String, u64>, ApiError> {
        match self.members.entry(project_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let memberships = api.list_memberships(project_id)?;
                let mut map = HashMap::new();
                for membership in memberships {
                    // Group memberships have no user and cannot be assignees
                    if let Some(user) = membership.user {
                        map.insert(user.name, user.id);
                    }
                }
                log::debug!("Cached {} members for project {}", map.len(), project_id);
                Ok(entry.insert(map))
            }
        }
    }

    /// Version name -> version-id map for a project, fetched once
    pub fn versions(
        &mut self,
        api: &dyn RedmineApi,
        project_id: u64,
    ) -> Result<&HashMap<String, u64>, ApiError> {
        match self.versions.entry(project_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let versions = api.list_versions(project_id)?;
                let map = versions.into_iter().map(|v| (v.name, v.id)).collect();
                log::debug!("Cached versions for project {}", project_id);
                Ok(entry.insert(map))
            }
        }
    }
}
