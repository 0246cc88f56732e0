//! issuestar - GitLab issue ETL into a star-schema warehouse
//!
//! issuestar extracts issues, milestones, labels, assignees and comment
//! authors from a GitLab instance and loads them into a PostgreSQL
//! warehouse laid out as a star schema, for downstream reporting.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain** (`domain`): models, ports, and typed errors
//! - **Adapters** (`adapters`): the GitLab REST/GraphQL client and the
//!   PostgreSQL warehouse store
//! - **Services** (`services`): label classification, participant
//!   resolution, and the load orchestrator
//! - **Infrastructure** (`infrastructure`): configuration loading
//! - **CLI** (`cli`): command-line entry point
//!
//! Each issue's dimension upserts and fact inserts commit as one
//! transaction; per-call failures (date query, note listing) degrade to
//! absent values instead of aborting the run.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{EtlError, EtlResult};
pub use domain::models::{
    Classification, Config, Issue, IssueDates, IssueKey, Milestone, Note, Project, RefreshMode,
    Role, UserRef,
};
pub use domain::ports::IssueTracker;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{classify, LoadOrchestrator, RunSummary};
