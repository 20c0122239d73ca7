//! Group registry and the process-wide instance.

use std::sync::{Arc, OnceLock};

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, TimetreeError};
use crate::group::Group;
use crate::profile::Profile;
use crate::snapshot::RegistrySnapshot;

/// Global registry, created on first use.
static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Map from group name to group. Groups are never removed.
#[derive(Debug)]
pub struct Registry {
    config: Arc<Config>,
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid(Config::default())
    }

    /// Create an empty registry with a custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Configuration shared by every group of this registry.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Group named `name`, created if missing.
    pub fn group(&self, name: &str) -> Arc<Group> {
        if let Some(group) = self.get(name) {
            return group;
        }

        self.adopt(Group::new(name.to_string(), Arc::clone(&self.config)))
    }

    /// Insert `candidate` unless its name is taken; first one wins.
    fn adopt(&self, candidate: Group) -> Arc<Group> {
        let mut groups = self.groups.write();
        match groups.entry(candidate.name().to_string()) {
            Entry::Occupied(existing) => {
                tracing::warn!(group = candidate.name(), "attempt to redeclare group detected");
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => {
                tracing::debug!(group = candidate.name(), "group created");
                Arc::clone(slot.insert(Arc::new(candidate)))
            }
        }
    }

    /// Existing group named `name`, without creating it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// All groups sorted by name.
    #[must_use]
    pub fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<Arc<Group>> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }

    /// Profile `name` of the group named after the default segment.
    pub fn profile(&self, name: &str) -> Arc<Profile> {
        self.group(&self.config.default_segment).profile(name)
    }

    /// Recompute stale statistics of every group and copy them out.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            groups: self.groups().iter().map(|g| g.snapshot()).collect(),
        }
    }

    /// Print every group's statistics tables to stdout.
    pub fn print(&self) {
        println!("{}", self.snapshot());
    }
}

/// Initialize the process-wide registry with a custom configuration.
///
/// Must be called before anything touches the global registry.
pub fn init(config: Config) -> Result<()> {
    let registry = Registry::with_config(config)?;
    GLOBAL
        .set(registry)
        .map_err(|_| TimetreeError::AlreadyInitialized)
}

/// The process-wide registry, created with the default configuration if
/// [`init`] was not called.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::new)
}

/// Group named `name` in the process-wide registry.
pub fn group(name: &str) -> Arc<Group> {
    global().group(name)
}

/// Profile `name` of the default group in the process-wide registry.
pub fn profile(name: &str) -> Arc<Profile> {
    global().profile(name)
}

/// Snapshot of the process-wide registry.
#[must_use]
pub fn snapshot() -> RegistrySnapshot {
    global().snapshot()
}

/// Print the process-wide registry to stdout.
pub fn print() {
    global().print();
}
