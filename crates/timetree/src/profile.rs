//! Nodes of the profile tree.
//!
//! A [`Profile`] is either a leaf, which accumulates samples, or composite,
//! which owns named children and aggregates over them. Parents own their
//! children through `Arc`; children point back with a `Weak` that is only used
//! to build names and to invalidate ancestors.
//!
//! # Locking
//!
//! Every node guards its state with its own `RwLock`. Writers (sample
//! registration, child creation, composite conversion) hold at most one node
//! lock at a time. Ancestor invalidation takes no locks at all: it clears the
//! atomic `valid` flag of every ancestor while the registering leaf is still
//! locked. The update pass is the only operation holding several locks, and it
//! always acquires them parent before child.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::builder::Builder;
use crate::config::Config;
use crate::sample::Sample;
use crate::snapshot::ProfileSnapshot;
use crate::stats::Stats;
use crate::timer::Timer;

/// Separator used by [`Profile::full_name`].
const NAME_SEPARATOR: &str = " -> ";

/// A named node of the measurement tree.
pub struct Profile {
    name: String,
    parent: Weak<Profile>,
    config: Arc<Config>,
    /// Whether `state.stats` is current. Cleared by descendants, set by the
    /// update pass.
    valid: AtomicBool,
    state: RwLock<State>,
}

struct State {
    builder: Builder,
    threads: usize,
    retain_samples: bool,
    stats: Stats,
    body: Body,
}

enum Body {
    /// Retained samples; always empty for memoryless leaves.
    Leaf(Vec<Sample>),
    Composite(HashMap<String, Arc<Profile>>),
}

impl State {
    const fn is_composite(&self) -> bool {
        matches!(self.body, Body::Composite(_))
    }

    /// Turn a leaf into an empty composite node, discarding its samples.
    ///
    /// Returns `false` if the node already was composite.
    fn convert_to_composite(&mut self) -> bool {
        if self.is_composite() {
            return false;
        }
        self.body = Body::Composite(HashMap::new());
        self.stats = Stats::default();
        true
    }

    /// Add a sample to a leaf. Returns `true` if the cached stats went stale.
    fn record(&mut self, sample: Sample) -> bool {
        match &mut self.body {
            Body::Leaf(samples) if self.retain_samples => {
                samples.push(sample);
                true
            }
            Body::Leaf(_) => {
                self.stats.record(sample.duration(), self.threads);
                false
            }
            Body::Composite(_) => unreachable!("samples are only recorded on leaves"),
        }
    }
}

impl Profile {
    pub(crate) fn new(
        name: String,
        parent: Weak<Self>,
        builder: &Builder,
        config: Arc<Config>,
    ) -> Arc<Self> {
        let body = if builder.is_composite() {
            Body::Composite(HashMap::new())
        } else {
            Body::Leaf(Vec::new())
        };
        let threads = builder.thread_count(config.available_cores);

        Arc::new(Self {
            name,
            parent,
            config,
            valid: AtomicBool::new(true),
            state: RwLock::new(State {
                builder: builder.for_children(),
                threads,
                retain_samples: builder.retains_samples(),
                stats: Stats::default(),
                body,
            }),
        })
    }

    /// Name of this profile.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names from the root down to this profile, joined by `" -> "`.
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut names = vec![self.name.clone()];
        let mut next = self.parent.upgrade();
        while let Some(node) = next {
            names.push(node.name.clone());
            next = node.parent.upgrade();
        }
        names.reverse();
        names.join(NAME_SEPARATOR)
    }

    /// Parent node, `None` for group roots and standalone profiles.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.upgrade()
    }

    /// Configuration this profile was created under.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether this profile aggregates children.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.state.read().is_composite()
    }

    /// Concurrency divisor used for the effective time.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.state.read().threads
    }

    /// Whether raw samples are kept.
    #[must_use]
    pub fn retains_samples(&self) -> bool {
        self.state.read().retain_samples
    }

    /// Retained samples of a leaf. Empty for memoryless or composite profiles.
    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        match &self.state.read().body {
            Body::Leaf(samples) => samples.clone(),
            Body::Composite(_) => Vec::new(),
        }
    }

    /// Existing child named `name`, without creating it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Self>> {
        match &self.state.read().body {
            Body::Composite(children) => children.get(name).cloned(),
            Body::Leaf(_) => None,
        }
    }

    /// Children sorted by name. Empty for leaves.
    #[must_use]
    pub fn children(&self) -> Vec<Arc<Self>> {
        let mut children: Vec<Arc<Self>> = match &self.state.read().body {
            Body::Composite(children) => children.values().cloned().collect(),
            Body::Leaf(_) => Vec::new(),
        };
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
    }

    /// Child named `name`, created with this profile's builder if missing.
    ///
    /// Creating a child on a leaf makes it composite and discards its samples.
    pub fn child(self: &Arc<Self>, name: &str) -> Arc<Self> {
        if let Some(child) = self.get(name) {
            return child;
        }

        let builder = self.state.read().builder;
        self.adopt(self.spawn_child(name, &builder))
    }

    /// Child named `name`, created with `builder` if missing.
    ///
    /// An existing child is returned unchanged and `builder` is ignored.
    pub fn child_with(self: &Arc<Self>, name: &str, builder: &Builder) -> Arc<Self> {
        self.adopt(self.spawn_child(name, builder))
    }

    /// Candidate child sharing this profile's configuration.
    fn spawn_child(self: &Arc<Self>, name: &str, builder: &Builder) -> Arc<Self> {
        builder.spawn(name.to_string(), Arc::downgrade(self), Arc::clone(&self.config))
    }

    /// Insert `candidate` as a child unless the name is taken; first one wins.
    fn adopt(&self, candidate: Arc<Self>) -> Arc<Self> {
        let mut state = self.state.write();

        if state.convert_to_composite() {
            tracing::warn!(
                profile = %self.full_name(),
                "making profile composite, previous samples will be lost"
            );
            self.reset_after_conversion();
        }

        let Body::Composite(children) = &mut state.body else {
            unreachable!("profile was just made composite");
        };

        match children.entry(candidate.name.clone()) {
            Entry::Occupied(existing) => {
                tracing::warn!(
                    profile = %candidate.full_name(),
                    "attempt to redeclare profile detected"
                );
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => {
                tracing::debug!(profile = %candidate.full_name(), "profile created");
                Arc::clone(slot.insert(candidate))
            }
        }
    }

    /// Convert a leaf into a composite profile. Samples recorded so far are
    /// discarded. Does nothing if the profile already is composite.
    pub fn make_composite(&self) -> &Self {
        let mut state = self.state.write();
        if state.convert_to_composite() {
            self.reset_after_conversion();
        }
        self
    }

    /// The fresh composite stats are current, but every ancestor lost the
    /// discarded samples from its sums.
    fn reset_after_conversion(&self) {
        self.valid.store(true, Ordering::Release);
        self.invalidate_ancestors();
    }

    /// Template used for new children.
    ///
    /// A leaf is made composite first, losing its samples.
    pub fn builder(&self) -> Builder {
        {
            let state = self.state.read();
            if state.is_composite() {
                return state.builder;
            }
        }

        let mut state = self.state.write();
        if state.convert_to_composite() {
            tracing::warn!(
                profile = %self.full_name(),
                "requested builder of non composite profile, previous samples will be lost"
            );
            self.reset_after_conversion();
        }
        state.builder
    }

    /// Replace the template used for new children.
    pub fn set_builder(&self, builder: Builder) {
        self.state.write().builder = builder;
    }

    /// Start a timer bound to this profile.
    pub fn start_timer(self: &Arc<Self>) -> Timer {
        Timer::start(Arc::clone(self))
    }

    /// Time `f` and record it under the default segment.
    pub fn measure<R>(self: &Arc<Self>, f: impl FnOnce() -> R) -> R {
        let timer = self.start_timer();
        let result = f();
        timer.stop();
        result
    }

    /// Record an already measured duration under the default segment.
    pub fn record(self: &Arc<Self>, duration: Duration) {
        self.register(&[self.config.default_segment.as_str()], Sample::from_duration(duration));
    }

    /// Record an already measured duration under a condition path.
    pub fn record_as<S: AsRef<str>>(self: &Arc<Self>, path: &[S], duration: Duration) {
        self.register(path, Sample::from_duration(duration));
    }

    /// Resolve `path` below this profile, creating nodes as needed, and
    /// register `sample` on the leaf it ends at.
    pub(crate) fn register<S: AsRef<str>>(self: &Arc<Self>, path: &[S], sample: Sample) {
        match path {
            [] => self.register(&[self.config.default_segment.as_str()], sample),
            [last] => self.register_last(last.as_ref(), sample),
            [first, rest @ ..] => self.child(first.as_ref()).register(rest, sample),
        }
    }

    fn register_last(self: &Arc<Self>, segment: &str, sample: Sample) {
        let default = self.config.default_segment.as_str();
        let mut state = self.state.write();

        if !state.is_composite() {
            if segment == default {
                if state.record(sample) {
                    self.valid.store(false, Ordering::Release);
                }
                // Must complete before the leaf lock is released.
                self.invalidate_ancestors();
                return;
            }

            tracing::warn!(
                profile = %self.full_name(),
                "making profile composite, previous samples will be lost"
            );
            state.convert_to_composite();
            self.reset_after_conversion();
        }

        drop(state);
        self.child(segment).register(&[default], sample);
    }

    fn invalidate_ancestors(&self) {
        let mut next = self.parent.upgrade();
        while let Some(node) = next {
            node.valid.store(false, Ordering::Release);
            next = node.parent.upgrade();
        }
    }

    /// Recompute stale statistics in this subtree and copy them out.
    #[must_use]
    pub fn snapshot(&self) -> ProfileSnapshot {
        self.refresh()
    }

    /// Current statistics of this profile, refreshed if stale.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.refresh().stats
    }

    /// Print this profile's statistics tables to stdout.
    pub fn print(&self) {
        println!("{}", self.snapshot());
    }

    /// Post-order update pass. Locks this node, then each child in turn.
    fn refresh(&self) -> ProfileSnapshot {
        let mut guard = self.state.write();
        let stale = !self.valid.swap(true, Ordering::AcqRel);
        let state = &mut *guard;

        let children = match &state.body {
            Body::Leaf(samples) => {
                if stale {
                    if state.retain_samples {
                        state.stats.recompute_from_samples(samples, state.threads);
                    } else {
                        tracing::error!(
                            profile = %self.full_name(),
                            "invalid statistics state: memoryless leaf statistics should always be valid"
                        );
                    }
                }
                Vec::new()
            }
            Body::Composite(children) => {
                let mut snapshots: Vec<ProfileSnapshot> =
                    children.values().map(|child| child.refresh()).collect();

                // A child may have recorded after releasing its lock above; sum
                // what was copied so the snapshot stays self-consistent. The
                // flag stays cleared in that case and the next pass redoes it.
                let invalidated = !self.valid.load(Ordering::Acquire);
                if stale || invalidated {
                    state
                        .stats
                        .recompute_from_children(snapshots.iter().map(|s| &s.stats));
                    for child in children.values() {
                        child.state.write().stats.set_shares(&state.stats);
                    }
                }

                for snapshot in &mut snapshots {
                    snapshot.stats.set_shares(&state.stats);
                }
                snapshots.sort_by(|a, b| a.name.cmp(&b.name));
                snapshots
            }
        };

        ProfileSnapshot {
            name: self.name.clone(),
            path: self.full_name(),
            composite: state.is_composite(),
            retains_samples: state.retain_samples,
            threads: state.threads,
            stats: state.stats,
            children,
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("valid", &self.valid.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
