//! Participant resolution.
//!
//! Commenters are derived from the issue's notes: system-generated
//! notes are excluded and authors are deduplicated by user id, keeping
//! first-seen order. Assignee and creator roles are read straight off
//! the issue's own fields by the orchestrator and are independent of
//! this lookup.

use std::collections::HashSet;

use crate::domain::errors::EtlResult;
use crate::domain::models::{Issue, UserRef};
use crate::domain::ports::IssueTracker;

/// Distinct human commenters of an issue.
///
/// A failure listing notes propagates as a typed error; the caller
/// decides to degrade (the orchestrator logs and loads the issue with
/// an empty commenter set).
pub async fn resolve_commenters<T>(tracker: &T, issue: &Issue) -> EtlResult<Vec<UserRef>>
where
    T: IssueTracker + ?Sized,
{
    let notes = tracker.list_notes(issue.project_id, issue.iid).await?;

    let mut seen = HashSet::new();
    let mut commenters = Vec::new();
    for note in notes {
        if note.system {
            continue;
        }
        if seen.insert(note.author.id) {
            commenters.push(note.author);
        }
    }

    Ok(commenters)
}
