//! Hierarchical runtime profiling.
//!
//! Timers are started and stopped against named profiles organized in a tree,
//! and aggregate statistics (total time, effective time, mean, sample count,
//! share of the parent) are maintained at every level.
//!
//! Statistics are organized in groups. Each group contains profiles, and a
//! composite profile contains sub-profiles:
//!
//! ```text
//! Group 1
//!  ├ Profile 1.1
//!  └ Profile 1.2
//!     ├ Sub-Profile 1.2.1
//!     └ Sub-Profile 1.2.2
//! ```
//!
//! Recording only touches the leaf and flags its ancestors as stale. Stale
//! aggregates are recomputed bottom-up the next time a snapshot is taken.
//!
//! # Feature Flags
//!
//! - `profiling` (default): [`profile_scope!`] records timings. When disabled the
//!   macro expands to nothing.
//!
//! # Usage
//!
//! ```
//! use timetree::Registry;
//!
//! let registry = Registry::new();
//! let group = registry.group("io");
//! group.set_builder(group.builder().composite(true));
//!
//! let timer = group.profile("read").start_timer();
//! // ... read something
//! timer.stop_as(["cache-miss"]);
//!
//! let snapshot = group.snapshot();
//! assert_eq!(snapshot.stats.samples, 1);
//! println!("{snapshot}");
//! ```
//!
//! The free functions ([`group`], [`profile`], [`snapshot`], [`print`]) work
//! on a process-wide registry. Call [`init`] first to configure it.

mod builder;
mod config;
mod error;
mod group;
mod macros;
mod profile;
mod registry;
mod report;
mod sample;
mod snapshot;
mod stats;
#[cfg(test)]
mod test_log;
mod timer;

pub use builder::Builder;
pub use config::{host_cores, Config, DEFAULT_SEGMENT, ENV_CORES, ENV_DEFAULT_SEGMENT};
pub use error::{Result, TimetreeError};
pub use group::Group;
pub use macros::ScopeTimer;
pub use profile::Profile;
pub use registry::{global, group, init, print, profile, snapshot, Registry};
pub use sample::Sample;
pub use snapshot::{GroupSnapshot, ProfileSnapshot, RegistrySnapshot};
pub use stats::Stats;
pub use timer::Timer;
