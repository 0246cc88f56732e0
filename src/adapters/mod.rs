//! Adapters for external collaborators: the GitLab APIs and the
//! PostgreSQL warehouse.

pub mod gitlab;
pub mod postgres;
