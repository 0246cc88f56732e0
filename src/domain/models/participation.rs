//! Participation roles and label-derived classification.

use serde::{Deserialize, Serialize};

/// Role a user plays on an issue. Non-exclusive: one issue yields one
/// participation fact row per (user, role) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Assignee,
    Commenter,
    Creator,
}

impl Role {
    /// Warehouse string form, stored verbatim in the participation fact.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Assignee => "Assignee",
            Role::Commenter => "Commenter",
            Role::Creator => "Creator",
        }
    }
}

/// (process, activity) pair parsed from a marker label, both optional.
///
/// Attached identically to every participation row of an issue; it is
/// never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub process: Option<String>,
    pub activity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_match_warehouse_values() {
        assert_eq!(Role::Assignee.as_str(), "Assignee");
        assert_eq!(Role::Commenter.as_str(), "Commenter");
        assert_eq!(Role::Creator.as_str(), "Creator");
    }
}
