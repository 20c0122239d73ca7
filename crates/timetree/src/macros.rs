//! Scope timers and profiling macros.

use std::sync::Arc;

use crate::profile::Profile;
use crate::timer::Timer;

/// RAII guard that stops its timer on drop.
#[derive(Debug)]
pub struct ScopeTimer {
    timer: Option<Timer>,
    path: Vec<String>,
}

impl ScopeTimer {
    /// Start timing; the sample is recorded under the default segment.
    #[inline]
    #[must_use]
    pub fn new(profile: &Arc<Profile>) -> Self {
        Self {
            timer: Some(profile.start_timer()),
            path: Vec::new(),
        }
    }

    /// Start timing; the sample is recorded under `path`.
    #[inline]
    #[must_use]
    pub fn with_path<I, S>(profile: &Arc<Profile>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            timer: Some(profile.start_timer()),
            path: path.into_iter().map(Into::into).collect(),
        }
    }
}

impl Drop for ScopeTimer {
    #[inline]
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_as(std::mem::take(&mut self.path));
        }
    }
}

/// Time the rest of the enclosing scope against a profile.
///
/// When the `profiling` feature is disabled, this macro expands to nothing.
///
/// # Examples
///
/// ```ignore
/// use timetree::profile_scope;
///
/// fn load(profile: &std::sync::Arc<timetree::Profile>, cached: bool) {
///     if cached {
///         profile_scope!(profile, "cache");
///         // ... fast path
///     } else {
///         profile_scope!(profile);
///         // ... slow path
///     }
/// } // timing recorded here
/// ```
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_scope {
    ($profile:expr) => {
        let _guard = $crate::ScopeTimer::new(&$profile);
    };
    ($profile:expr, $($segment:expr),+ $(,)?) => {
        let _guard = $crate::ScopeTimer::with_path(&$profile, [$($segment),+]);
    };
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($profile:expr) => {};
    ($profile:expr, $($segment:expr),+ $(,)?) => {};
}
