//! Domain models.

pub mod config;
pub mod issue;
pub mod participation;

pub use config::{
    Config, GitLabConfig, HttpConfig, LoggingConfig, RefreshMode, RunConfig, WarehouseConfig,
};
pub use issue::{Issue, IssueDates, IssueKey, Milestone, Note, Project, UserRef};
pub use participation::{Classification, Role};
