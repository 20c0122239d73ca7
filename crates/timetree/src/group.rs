//! Named containers of top-level profiles.

use std::sync::{Arc, Weak};

use crate::builder::Builder;
use crate::config::Config;
use crate::profile::Profile;
use crate::snapshot::GroupSnapshot;
use crate::timer::Timer;

/// A named collection of profiles whose statistics are compared together.
///
/// A group is backed by a composite root profile, so it aggregates its
/// profiles exactly like a composite profile aggregates its children.
#[derive(Debug)]
pub struct Group {
    root: Arc<Profile>,
}

impl Group {
    pub(crate) fn new(name: String, config: Arc<Config>) -> Self {
        let root = Builder::new().composite(true).spawn(name, Weak::new(), config);
        Self { root }
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.root.name()
    }

    /// Profile named `name`, created with the group builder if missing.
    pub fn profile(&self, name: &str) -> Arc<Profile> {
        self.root.child(name)
    }

    /// Profile named `name`, created with `builder` if missing.
    pub fn profile_with(&self, name: &str, builder: &Builder) -> Arc<Profile> {
        self.root.child_with(name, builder)
    }

    /// Existing profile named `name`, without creating it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Profile>> {
        self.root.get(name)
    }

    /// Profiles sorted by name.
    #[must_use]
    pub fn profiles(&self) -> Vec<Arc<Profile>> {
        self.root.children()
    }

    /// Template used for new profiles.
    #[must_use]
    pub fn builder(&self) -> Builder {
        self.root.builder()
    }

    /// Replace the template used for new profiles.
    pub fn set_builder(&self, builder: Builder) {
        self.root.set_builder(builder);
    }

    /// Start a timer on the profile named after the default segment.
    pub fn start_timer(&self) -> Timer {
        let default = self.root.config().default_segment.as_str();
        self.profile(default).start_timer()
    }

    /// Recompute stale statistics and copy them out.
    #[must_use]
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot::from(self.root.snapshot())
    }

    /// Print the group's statistics tables to stdout.
    pub fn print(&self) {
        println!("{}", self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;

    use super::*;

    fn group(name: &str) -> Group {
        Group::new(name.to_string(), Arc::new(Config::default()))
    }

    #[test]
    fn profiles_are_leaves_by_default() {
        let g = group("io");
        let p = g.profile("read");

        assert!(!p.is_composite());
        assert!(Arc::ptr_eq(&p, &g.profile("read")));
        assert_eq!(p.full_name(), "io -> read");
    }

    #[test]
    fn group_builder_configures_profiles() {
        let g = group("io");
        g.set_builder(g.builder().composite(true).retain_samples(true));

        let p = g.profile("read");
        assert!(p.is_composite());
        assert!(p.child("small").retains_samples());
        assert!(!p.child("small").is_composite());
    }

    #[test]
    fn start_timer_uses_default_profile() {
        let g = group("io");
        g.start_timer().stop();

        let snapshot = g.snapshot();
        assert_eq!(snapshot.profiles.len(), 1);
        assert_eq!(snapshot.profiles[0].name, "base");
        assert_eq!(snapshot.stats.samples, 1);
    }

    #[test]
    fn snapshot_aggregates_profiles() {
        let g = group("io");
        g.profile("read").record(Duration::from_millis(30));
        g.profile("write").record(Duration::from_millis(10));

        let snapshot = g.snapshot();
        assert_eq!(snapshot.stats.total_time, Duration::from_millis(40));
        let read = snapshot.profile("read").unwrap();
        assert_relative_eq!(read.stats.timeslice, 0.75);
    }
}
