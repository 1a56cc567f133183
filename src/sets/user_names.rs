//! Allowed user names for the failed-login policy.

use std::collections::BTreeSet;

use super::split_list;

/// Case-sensitive set of user names that may fail a login without being banned.
///
/// An empty set disables the check entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserNameAllowSet {
    names: BTreeSet<String>,
}

impl UserNameAllowSet {
    /// Build from a comma-separated list. No lookups, no patterns.
    pub fn build(list: &str) -> Self {
        Self {
            names: split_list(list).map(String::from).collect(),
        }
    }

    pub fn contains(&self, user_name: &str) -> bool {
        self.names.contains(user_name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Names joined with `,`, for diagnostics.
    pub fn joined(&self) -> String {
        self.names.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }
}
