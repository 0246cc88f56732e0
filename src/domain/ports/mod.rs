//! Ports (trait seams) between the pipeline and its collaborators.

pub mod issue_tracker;

pub use issue_tracker::IssueTracker;
