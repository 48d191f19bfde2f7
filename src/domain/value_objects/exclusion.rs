//! Exclusion set value object
//!
//! Bare entry names pruned from a tree sync. Matching is a membership test on
//! a single path segment: `node_modules` prunes every directory or file named
//! exactly `node_modules`, at any depth, and nothing else.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Names excluded when a sync does not specify its own set
pub const DEFAULT_EXCLUSIONS: &[&str] = &[".git", "node_modules", "__pycache__"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<String>);

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::from_names(DEFAULT_EXCLUSIONS.iter().copied())
    }
}

impl ExclusionSet {
    /// An exclusion set that excludes nothing
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
        )
    }

    /// Whether an entry with this bare name is pruned
    pub fn matches(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
