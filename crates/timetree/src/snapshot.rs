//! Immutable copies of the profile tree taken by the update pass.

use serde::{Deserialize, Serialize};

use crate::stats::Stats;

/// Statistics of one profile and all of its descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Profile name.
    pub name: String,
    /// Names from the root down to this profile.
    pub path: String,
    /// Whether the profile aggregates children.
    pub composite: bool,
    /// Whether the profile keeps raw samples.
    pub retains_samples: bool,
    /// Concurrency divisor.
    pub threads: usize,
    /// Aggregated statistics.
    pub stats: Stats,
    /// Children sorted by name.
    pub children: Vec<ProfileSnapshot>,
}

impl ProfileSnapshot {
    /// Direct child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Descendant reached by following `path` from this profile.
    #[must_use]
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&Self> {
        path.iter().try_fold(self, |node, segment| node.child(segment.as_ref()))
    }
}

/// Statistics of a group and its profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Group name.
    pub name: String,
    /// Sum over all profiles in the group.
    pub stats: Stats,
    /// Top-level profiles sorted by name.
    pub profiles: Vec<ProfileSnapshot>,
}

impl GroupSnapshot {
    /// Top-level profile named `name`.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&ProfileSnapshot> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Profile reached by following `path` from the group.
    #[must_use]
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&ProfileSnapshot> {
        let (first, rest) = path.split_first()?;
        self.profile(first.as_ref())?.find(rest)
    }
}

impl From<ProfileSnapshot> for GroupSnapshot {
    fn from(root: ProfileSnapshot) -> Self {
        Self {
            name: root.name,
            stats: root.stats,
            profiles: root.children,
        }
    }
}

/// Statistics of every group in a registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Groups sorted by name.
    pub groups: Vec<GroupSnapshot>,
}

impl RegistrySnapshot {
    /// Group named `name`.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupSnapshot> {
        self.groups.iter().find(|g| g.name == name)
    }
}
