//! Port for the remote issue tracker.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::errors::EtlResult;
use crate::domain::models::{Issue, IssueDates, Note, Project};

/// Read-side operations the pipeline needs from the issue tracker.
///
/// The production implementation is the GitLab adapter; tests substitute
/// an in-memory fake.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch one project by numeric id.
    async fn fetch_project(&self, project_id: i64) -> EtlResult<Project>;

    /// List all issues of a project created at or after `created_after`,
    /// across all pages.
    async fn list_issues(&self, project_id: i64, created_after: NaiveDate)
        -> EtlResult<Vec<Issue>>;

    /// List all notes (comments) of an issue, across all pages.
    async fn list_notes(&self, project_id: i64, issue_iid: i64) -> EtlResult<Vec<Note>>;

    /// Fetch the start/due dates of an issue via the work-item date
    /// widget query. An issue without the widget resolves to absent
    /// dates, not an error.
    async fn fetch_start_due_dates(&self, issue_iid: i64) -> EtlResult<IssueDates>;
}
