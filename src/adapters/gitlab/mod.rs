//! GitLab adapter: REST + GraphQL client behind the [`IssueTracker`]
//! port.
//!
//! [`IssueTracker`]: crate::domain::ports::IssueTracker

pub mod client;
pub mod models;
pub mod retry;

pub use client::GitLabClient;
pub use retry::RetryPolicy;
