//! Issue-tracker domain models.
//!
//! These are the normalized shapes the pipeline works with, independent
//! of the GitLab wire format (see `adapters::gitlab::models` for that).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Composite warehouse key for an issue: `{project_id}-{iid}`.
///
/// Issue sequence numbers (`iid`) restart per project, so the project id
/// is baked into the key to keep it unique across the whole warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey(String);

impl IssueKey {
    pub fn new(project_id: i64, iid: i64) -> Self {
        Self(format!("{project_id}-{iid}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A project as listed by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    /// Owning group (namespace) id, when the project lives in a group.
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
}

/// A user reference as it appears on issues and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
    pub name: String,
}

/// A milestone attached to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub state: String,
}

/// An issue as listed by the tracker's REST API.
///
/// Start/due dates are not part of the listing; they come from the
/// secondary work-item query (see [`IssueDates`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Globally unique numeric id.
    pub id: i64,
    /// Sequence number within the project.
    pub iid: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub issue_type: Option<String>,
    pub labels: Vec<String>,
    pub milestone: Option<Milestone>,
    pub assignee: Option<UserRef>,
    pub author: Option<UserRef>,
}

impl Issue {
    /// The composite warehouse key for this issue.
    pub fn key(&self) -> IssueKey {
        IssueKey::new(self.project_id, self.iid)
    }
}

/// A comment (note) on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub author: UserRef,
    /// System-generated notes (state changes, label edits) are excluded
    /// from participant derivation.
    pub system: bool,
}

/// Start/due dates from the work-item date widget, each optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueDates {
    pub start: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
}
