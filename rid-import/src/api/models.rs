//! Serde models for the Redmine JSON payloads we read and write

use serde::{Deserialize, Serialize};

/// A Redmine project as returned by `GET /projects.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    /// Display name with canonical casing (e.g. "SouthPAN GASS")
    pub name: String,
}

/// A reference to a named record (user, project, version) inside a payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedItem {
    pub id: u64,
    pub name: String,
}

/// One row of `GET /projects/{id}/memberships.json`
///
/// Group memberships carry a `group` object instead of `user`; those rows
/// cannot be assignees and are skipped by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(default)]
    pub user: Option<NamedItem>,
}

/// An issue status from `GET /issue_statuses.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub id: u64,
    pub name: String,
}

/// A fixed version from `GET /projects/{id}/versions.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: u64,
    pub name: String,
}

/// The issue object returned by `POST /issues.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: u64,
    pub subject: String,
    pub project: NamedItem,
}

/// One custom-field assignment inside a create-issue payload
///
/// Redmine accepts an explicit `"value": null` for fields the source row
/// does not carry, so the value is serialized even when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomFieldValue {
    pub id: u32,
    pub name: &'static str,
    pub value: Option<String>,
}

/// Payload for `POST /issues.json`, wrapped as `{"issue": ...}` on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub project_id: u64,
    pub tracker_id: u32,
    pub status_id: u64,
    pub assigned_to_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_version_id: Option<u64>,
    pub subject: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_issue_id: Option<u64>,
    pub custom_fields: Vec<CustomFieldValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_without_user_deserializes() {
        // Group membership rows have "group" instead of "user"
        let membership: Membership =
            serde_json::from_value(serde_json::json!({"group": {"id": 5, "name": "Reviewers"}}))
                .unwrap();
        assert!(membership.user.is_none());
    }

    #[test]
    fn test_new_issue_omits_absent_version_and_parent() {
        let issue = NewIssue {
            project_id: 1,
            tracker_id: 18,
            status_id: 2,
            assigned_to_id: 3,
            fixed_version_id: None,
            subject: "subject".to_string(),
            description: "description".to_string(),
            parent_issue_id: None,
            custom_fields: vec![],
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert!(json.get("fixed_version_id").is_none());
        assert!(json.get("parent_issue_id").is_none());
    }

    #[test]
    fn test_custom_field_serializes_null_value() {
        let field = CustomFieldValue {
            id: 106,
            name: "Reply from the Responsible",
            value: None,
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json.get("value"), Some(&serde_json::Value::Null));
    }
}
