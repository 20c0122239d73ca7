//! Templates for creating profiles.

use std::sync::{Arc, Weak};

use crate::config::Config;
use crate::profile::Profile;

/// Requested concurrency divisor, resolved against the core count of the
/// configuration a profile is created under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Threads {
    /// Clamped to the available cores.
    Capped(usize),
    /// Used as is.
    Unchecked(usize),
    /// Every available core.
    AllCores,
}

/// Template describing the next profile created through it.
///
/// Every composite profile and every group owns one and stamps new children
/// with it. The child's own builder inherits sample retention and thread count
/// but always starts non-composite, so children default to leaves.
///
/// A builder carries no configuration. The default segment and the core count
/// come from the registry the new profile is attached to, so the thread
/// ceiling of [`Builder::threads`] is applied when the profile is created.
///
/// Builders are plain values: configuring one never affects a template that is
/// already installed on a node. Use [`Profile::set_builder`] or
/// [`Group::set_builder`](crate::Group::set_builder) to install a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builder {
    composite: bool,
    retain_samples: bool,
    threads: Threads,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Create a builder for single-threaded, memoryless leaves.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            composite: false,
            retain_samples: false,
            threads: Threads::Capped(1),
        }
    }

    /// Make new profiles composite (aggregating children) or leaves.
    #[must_use]
    pub const fn composite(mut self, composite: bool) -> Self {
        self.composite = composite;
        self
    }

    /// Make new profiles keep every raw sample and recompute lazily.
    #[must_use]
    pub const fn retain_samples(mut self, retain: bool) -> Self {
        self.retain_samples = retain;
        self
    }

    /// Set the thread count, clamped to `[1, available cores]`.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Threads::Capped(non_zero_threads(threads));
        self
    }

    /// Set the thread count without the core ceiling.
    #[must_use]
    pub fn threads_unchecked(mut self, threads: usize) -> Self {
        self.threads = Threads::Unchecked(non_zero_threads(threads));
        self
    }

    /// Use every available core.
    #[must_use]
    pub const fn multi_threaded(mut self) -> Self {
        self.threads = Threads::AllCores;
        self
    }

    /// Use a single thread.
    #[must_use]
    pub const fn single_threaded(mut self) -> Self {
        self.threads = Threads::Capped(1);
        self
    }

    /// Whether new profiles are composite.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        self.composite
    }

    /// Whether new profiles retain raw samples.
    #[must_use]
    pub const fn retains_samples(&self) -> bool {
        self.retain_samples
    }

    /// Thread count a new profile gets on a host with `cores` available cores.
    #[must_use]
    pub fn thread_count(&self, cores: usize) -> usize {
        let cores = cores.max(1);
        match self.threads {
            Threads::Capped(n) => n.min(cores),
            Threads::Unchecked(n) => n,
            Threads::AllCores => cores,
        }
    }

    /// Create a standalone profile that belongs to no registry, using the
    /// default configuration.
    #[must_use]
    pub fn build(&self, name: impl Into<String>) -> Arc<Profile> {
        self.build_with_config(name, Config::default())
    }

    /// Create a standalone profile under a custom configuration.
    #[must_use]
    pub fn build_with_config(&self, name: impl Into<String>, config: Config) -> Arc<Profile> {
        self.spawn(name.into(), Weak::new(), Arc::new(config))
    }

    pub(crate) fn spawn(
        &self,
        name: String,
        parent: Weak<Profile>,
        config: Arc<Config>,
    ) -> Arc<Profile> {
        Profile::new(name, parent, self, config)
    }

    /// Template installed on a profile created from this builder.
    pub(crate) const fn for_children(&self) -> Self {
        Self {
            composite: false,
            ..*self
        }
    }
}

fn non_zero_threads(threads: usize) -> usize {
    if threads == 0 {
        tracing::error!("number of threads must be > 0, setting value to 1");
        1
    } else {
        threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log;

    #[test]
    fn defaults_to_single_threaded_leaf() {
        let builder = Builder::new();
        assert!(!builder.is_composite());
        assert!(!builder.retains_samples());
        assert_eq!(builder.thread_count(8), 1);
    }

    #[test]
    fn threads_are_clamped_to_cores() {
        let builder = Builder::new();
        assert_eq!(builder.threads(3).thread_count(4), 3);
        assert_eq!(builder.threads(16).thread_count(4), 4);
        assert_eq!(builder.threads(0).thread_count(4), 1);
    }

    #[test]
    fn unchecked_threads_skip_ceiling() {
        let builder = Builder::new();
        assert_eq!(builder.threads_unchecked(8).thread_count(2), 8);
        assert_eq!(builder.threads_unchecked(0).thread_count(2), 1);
    }

    #[test]
    fn zero_threads_logs_error() {
        let (builder, logs) = test_log::capture(|| Builder::new().threads(0));

        assert_eq!(builder.thread_count(4), 1);
        assert!(logs.contains("ERROR"), "{logs}");
        assert!(logs.contains("number of threads must be > 0"), "{logs}");
    }

    #[test]
    fn multi_threaded_uses_all_cores() {
        let builder = Builder::new().multi_threaded();
        assert_eq!(builder.thread_count(6), 6);
        assert_eq!(builder.thread_count(2), 2);
        assert_eq!(builder.single_threaded().thread_count(6), 1);
    }

    #[test]
    fn children_reset_composition_only() {
        let builder = Builder::new().composite(true).retain_samples(true).threads(5);
        let child = builder.for_children();

        assert!(!child.is_composite());
        assert!(child.retains_samples());
        assert_eq!(child.thread_count(8), 5);
        assert!(builder.is_composite());
    }

    #[test]
    fn build_creates_detached_profile() {
        let profile = Builder::new().composite(true).build("standalone");
        assert_eq!(profile.name(), "standalone");
        assert!(profile.is_composite());
        assert!(profile.parent().is_none());
    }

    #[test]
    fn build_with_config_resolves_threads_against_it() {
        let config = Config::new().available_cores(3).default_segment("main");
        let profile = Builder::new().threads(64).build_with_config("solo", config);

        assert_eq!(profile.threads(), 3);
        assert_eq!(profile.config().default_segment, "main");
    }
}
