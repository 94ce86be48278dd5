//! Translate a validated row into the Redmine create-issue payload
//!
//! Pure translation, no lookups and no re-validation: every id on
//! [`ValidatedRow`] was resolved by the validator, so an unresolvable
//! value reaching this point is a validator defect, not an input error.

use crate::api::{CustomFieldValue, NewIssue};

use super::validate::ValidatedRow;

/// Tracker type id identifying Review Item Discrepancy issues
pub const RID_TRACKER_ID: u32 = 18;

// Custom-field ids as configured on the tracker
const CF_CODE: u32 = 1;
const CF_ORIGINATOR_COMPANY: u32 = 99;
const CF_PROBLEM_LOCATION: u32 = 104;
const CF_RECOMMENDED_SOLUTION: u32 = 105;
const CF_REPLY_FROM_RESPONSIBLE: u32 = 106;
const CF_ACTION_TO_IMPLEMENT: u32 = 107;

/// Build the create-issue request for a validated row
pub fn to_create_request(validated: &ValidatedRow) -> NewIssue {
    let row = &validated.row;

    let custom_fields = vec![
        CustomFieldValue {
            id: CF_CODE,
            name: "Code",
            value: Some(row.code.clone()),
        },
        CustomFieldValue {
            id: CF_ORIGINATOR_COMPANY,
            name: "Originator Company",
            value: Some(row.originator_company.clone()),
        },
        CustomFieldValue {
            id: CF_PROBLEM_LOCATION,
            name: "Problem Location",
            value: Some(row.problem_location.clone()),
        },
        CustomFieldValue {
            id: CF_RECOMMENDED_SOLUTION,
            name: "Recommended Solution",
            value: Some(row.recommended_solution.clone()),
        },
        CustomFieldValue {
            id: CF_REPLY_FROM_RESPONSIBLE,
            name: "Reply from the Responsible",
            value: row.reply_from_responsible.clone(),
        },
        CustomFieldValue {
            id: CF_ACTION_TO_IMPLEMENT,
            name: "Action to Implement",
            value: row.action_to_implement.clone(),
        },
    ];

    NewIssue {
        project_id: validated.project_id,
        tracker_id: RID_TRACKER_ID,
        status_id: validated.status_id,
        assigned_to_id: validated.assignee_id,
        fixed_version_id: validated.fixed_version_id,
        subject: row.subject.clone(),
        description: row.description.clone(),
        parent_issue_id: validated.parent_issue_id,
        custom_fields,
    }
}
