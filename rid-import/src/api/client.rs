//! Blocking HTTP client for the Redmine REST API
//!
//! All endpoints are the `.json` variants with HTTP basic auth. List
//! endpoints are fetched page by page (Redmine caps `limit` at 100).

use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::RedmineApi;
use super::error::ApiError;
use super::models::{CreatedIssue, IssueStatus, Membership, NewIssue, Project, Version};

/// Redmine caps list endpoints at 100 items per page
const PAGE_SIZE: u64 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated session handle against one Redmine instance
pub struct RedmineClient {
    http: reqwest::blocking::Client,
    base_url: String,
    username: String,
    password: String,
}

impl RedmineClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        })
    }

    fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .map_err(ApiError::from_transport)?;
        Self::read_json(path, response)
    }

    /// Map the response status onto the error taxonomy and decode the body
    fn read_json(path: &str, response: reqwest::blocking::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Auth);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                resource: path.to_string(),
            });
        }
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        response.json().map_err(|err| ApiError::Decode {
            message: err.to_string(),
        })
    }

    /// Fetch every page of a list endpoint, decoding the items under `key`
    fn list_paged<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut offset = 0u64;

        loop {
            let page = self.get(&format!("{path}?limit={PAGE_SIZE}&offset={offset}"))?;
            let rows = page
                .get(key)
                .and_then(Value::as_array)
                .cloned()
                .ok_or_else(|| ApiError::Decode {
                    message: format!("missing '{key}' in response from {path}"),
                })?;

            let fetched = rows.len() as u64;
            for row in rows {
                items.push(serde_json::from_value(row).map_err(|err| ApiError::Decode {
                    message: err.to_string(),
                })?);
            }

            offset += fetched;
            // Endpoints without a total_count return everything in one page
            let done = match page.get("total_count").and_then(Value::as_u64) {
                Some(total) => offset >= total,
                None => true,
            };
            if done || fetched == 0 {
                break;
            }
        }

        Ok(items)
    }
}

impl RedmineApi for RedmineClient {
    fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.list_paged("projects.json", "projects")
    }

    fn list_memberships(&self, project_id: u64) -> Result<Vec<Membership>, ApiError> {
        self.list_paged(
            &format!("projects/{project_id}/memberships.json"),
            "memberships",
        )
    }

    fn list_statuses(&self) -> Result<Vec<IssueStatus>, ApiError> {
        self.list_paged("issue_statuses.json", "issue_statuses")
    }

    fn list_versions(&self, project_id: u64) -> Result<Vec<Version>, ApiError> {
        self.list_paged(&format!("projects/{project_id}/versions.json"), "versions")
    }

    fn issue_exists(&self, issue_id: u64) -> Result<bool, ApiError> {
        match self.get(&format!("issues/{issue_id}.json")) {
            Ok(_) => Ok(true),
            Err(ApiError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, ApiError> {
        let url = format!("{}/issues.json", self.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&serde_json::json!({ "issue": issue }))
            .send()
            .map_err(ApiError::from_transport)?;

        let body = Self::read_json("issues.json", response)?;
        let created = body.get("issue").cloned().ok_or_else(|| ApiError::Decode {
            message: "missing 'issue' in create response".to_string(),
        })?;
        serde_json::from_value(created).map_err(|err| ApiError::Decode {
            message: err.to_string(),
        })
    }
}
