//! Running timers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::profile::Profile;
use crate::sample::Sample;

/// A running measurement bound to one profile.
///
/// Stopping consumes the timer, so a measurement is registered exactly once.
#[derive(Debug)]
#[must_use = "a timer records nothing until it is stopped"]
pub struct Timer {
    profile: Arc<Profile>,
    start: Instant,
}

impl Timer {
    pub(crate) fn start(profile: Arc<Profile>) -> Self {
        Self {
            profile,
            start: Instant::now(),
        }
    }

    /// Profile the timer was started on.
    #[must_use]
    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    /// Instant the timer was started.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.start
    }

    /// Time since the timer was started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop and record under the default segment.
    pub fn stop(self) {
        let sample = Sample::new(self.start, Instant::now());
        let default = self.profile.config().default_segment.as_str();
        self.profile.register(&[default], sample);
    }

    /// Stop and record under a condition path below the timer's profile.
    ///
    /// ```
    /// let profile = timetree::Builder::new().build("p1");
    /// let timer = profile.start_timer();
    /// timer.stop_as(["foo", "bar"]);
    ///
    /// let bar = profile.get("foo").unwrap().get("bar").unwrap();
    /// assert_eq!(bar.stats().samples, 1);
    /// ```
    ///
    /// The sample lands in `p1 -> foo -> bar` if `bar` is a leaf, or in
    /// `p1 -> foo -> bar -> base` if `bar` is composite. An empty path is the
    /// same as [`Timer::stop`].
    pub fn stop_as<I, S>(self, path: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let end = Instant::now();
        let path: Vec<S> = path.into_iter().collect();
        self.profile.register(&path, Sample::new(self.start, end));
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::builder::Builder;

    #[test]
    fn stop_records_elapsed_time() {
        let profile = Builder::new().build("sleepy");
        let timer = profile.start_timer();
        thread::sleep(Duration::from_millis(2));
        timer.stop();

        let stats = profile.stats();
        assert_eq!(stats.samples, 1);
        assert!(stats.total_time >= Duration::from_millis(2));
    }

    #[test]
    fn stop_as_builds_path() {
        let profile = Builder::new().build("p");
        profile.start_timer().stop_as(["a", "b"]);
        profile.start_timer().stop_as(vec!["a".to_string(), "c".to_string()]);

        let a = profile.get("a").unwrap();
        assert!(a.is_composite());
        assert_eq!(a.children().len(), 2);
        assert_eq!(profile.stats().samples, 2);
    }

    #[test]
    fn empty_path_matches_stop() {
        let profile = Builder::new().build("p");
        profile.start_timer().stop_as(Vec::<&str>::new());

        assert!(!profile.is_composite());
        assert_eq!(profile.stats().samples, 1);
    }

    #[test]
    fn running_timer_reports_its_state() {
        let profile = Builder::new().build("p");
        let timer = profile.start_timer();
        thread::sleep(Duration::from_millis(1));

        assert!(Arc::ptr_eq(timer.profile(), &profile));
        assert!(timer.started_at() <= Instant::now());
        let elapsed = timer.elapsed();
        assert!(elapsed >= Duration::from_millis(1));
        assert_eq!(profile.stats().samples, 0);

        timer.stop();
        assert!(profile.stats().total_time >= elapsed);
    }
}
