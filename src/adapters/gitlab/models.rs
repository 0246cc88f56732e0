//! GitLab REST and GraphQL wire models.
//!
//! These structs map to the GitLab API JSON payloads. They are used
//! internally by the GitLab adapter and are not part of the domain
//! model; conversion happens at the adapter boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{Issue, IssueDates, Milestone, Note, Project, UserRef};

/// A project returned by `GET /api/v4/projects/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    pub id: i64,
    pub name: String,
    /// Owning namespace (group or user); absent on some instance setups.
    #[serde(default)]
    pub namespace: Option<GitLabNamespace>,
}

/// The namespace object nested in a project payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabNamespace {
    pub id: i64,
    pub name: String,
}

/// A user object as embedded in issues and notes.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub id: i64,
    pub username: String,
    pub name: String,
}

/// A milestone object nested in an issue payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMilestone {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// An issue returned by `GET /api/v4/projects/:id/issues`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabIssue {
    /// Globally unique numeric id.
    pub id: i64,
    /// Sequence number within the project.
    pub iid: i64,
    pub project_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub milestone: Option<GitLabMilestone>,
    #[serde(default)]
    pub assignee: Option<GitLabUser>,
    #[serde(default)]
    pub author: Option<GitLabUser>,
}

/// A note (comment) returned by the issue notes endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabNote {
    /// True for system-generated notes (label edits, state changes).
    #[serde(default)]
    pub system: bool,
    pub author: GitLabUser,
}

impl From<GitLabUser> for UserRef {
    fn from(user: GitLabUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
        }
    }
}

impl From<GitLabProject> for Project {
    fn from(project: GitLabProject) -> Self {
        let (group_id, group_name) = match project.namespace {
            Some(ns) => (Some(ns.id), Some(ns.name)),
            None => (None, None),
        };
        Self {
            id: project.id,
            name: project.name,
            group_id,
            group_name,
        }
    }
}

impl From<GitLabMilestone> for Milestone {
    fn from(milestone: GitLabMilestone) -> Self {
        Self {
            id: milestone.id,
            title: milestone.title,
            description: milestone.description,
            start_date: milestone.start_date,
            due_date: milestone.due_date,
            state: milestone.state,
        }
    }
}

impl From<GitLabIssue> for Issue {
    fn from(issue: GitLabIssue) -> Self {
        Self {
            id: issue.id,
            iid: issue.iid,
            project_id: issue.project_id,
            title: issue.title,
            description: issue.description,
            state: issue.state,
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            issue_type: issue.issue_type,
            labels: issue.labels,
            milestone: issue.milestone.map(Into::into),
            assignee: issue.assignee.map(Into::into),
            author: issue.author.map(Into::into),
        }
    }
}

impl From<GitLabNote> for Note {
    fn from(note: GitLabNote) -> Self {
        Self {
            author: note.author.into(),
            system: note.system,
        }
    }
}

/// Request body for `POST /api/graphql`.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

/// Response envelope for the work-item date query.
///
/// Every level is optional: a project without work items, an issue
/// without the date widget, or a GraphQL error payload all deserialize
/// cleanly and resolve to absent dates.
#[derive(Debug, Deserialize)]
pub struct DateQueryResponse {
    #[serde(default)]
    pub data: Option<DateQueryData>,
}

#[derive(Debug, Deserialize)]
pub struct DateQueryData {
    #[serde(default)]
    pub project: Option<WorkItemProject>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemProject {
    #[serde(default, rename = "workItems")]
    pub work_items: Option<WorkItemConnection>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemConnection {
    #[serde(default)]
    pub nodes: Vec<WorkItemNode>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemNode {
    #[serde(default)]
    pub widgets: Vec<DateWidget>,
}

/// The `WorkItemWidgetStartAndDueDate` fragment fields.
#[derive(Debug, Deserialize)]
pub struct DateWidget {
    #[serde(default, rename = "startDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
}

impl DateQueryResponse {
    /// Walk the nested payload down to the first widget of the first
    /// work item, degrading to absent dates at every missing level.
    pub fn into_dates(self) -> IssueDates {
        let widget = self
            .data
            .and_then(|d| d.project)
            .and_then(|p| p.work_items)
            .and_then(|w| w.nodes.into_iter().next())
            .and_then(|n| n.widgets.into_iter().next());

        match widget {
            Some(w) => IssueDates {
                start: w.start_date,
                due: w.due_date,
            },
            None => IssueDates::default(),
        }
    }
}
