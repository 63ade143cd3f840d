//! Lazy, filterable view over build history.
//!
//! A `RunList` never copies runs. It holds a restartable source (a factory
//! producing a fresh newest-first iterator on every call) and each
//! transformation wraps that source in another lazy layer. Every read
//! operation starts a new pass, so a list can be iterated any number of
//! times.
//!
//! Transformations consume the list and return the narrowed one:
//!
//! ```
//! use runlist::domain::{Build, BuildResult, Project};
//! use runlist::RunList;
//!
//! let app = Project::new(
//!     "app",
//!     vec![
//!         Build::new("", 1, 1_000).with_result(BuildResult::Success),
//!         Build::new("", 2, 2_000).with_result(BuildResult::Failure),
//!     ],
//! );
//! let failures = RunList::from_job(&app).failure_only();
//! assert_eq!(failures.len(), 1);
//! ```

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{BuildResult, Item, Job, Run, Runs, View};
use crate::error::{Result, RunListError};
use crate::iterators::{Limit, MergeSorted};

/// Restartable producer of a run iterator
type Source<'a, R> = Rc<dyn Fn() -> Runs<'a, R> + 'a>;

/// Minimum entries `new_builds` keeps regardless of age
pub const NEW_BUILDS_MIN: usize = 10;

/// Age beyond which `new_builds` drops entries past the minimum
pub const NEW_BUILDS_MAX_AGE_DAYS: i64 = 7;

/// Window used to decide which builds are "new" enough for a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
    /// Always keep at least this many builds, however old
    pub min_builds: usize,
    /// Beyond `min_builds`, keep only builds younger than this
    pub max_age: Duration,
}

impl Default for FeedWindow {
    fn default() -> Self {
        Self {
            min_builds: NEW_BUILDS_MIN,
            max_age: Duration::days(NEW_BUILDS_MAX_AGE_DAYS),
        }
    }
}

/// Build history in descending start-time order
pub struct RunList<'a, R> {
    base: Source<'a, R>,
    // (size, first build), filled by the first full traversal
    summary: OnceCell<(usize, Option<&'a R>)>,
}

impl<'a, R: Run + 'a> RunList<'a, R> {
    /// Empty history
    pub fn new() -> Self {
        Self::from_source(|| Box::new(std::iter::empty()))
    }

    fn from_source<F>(source: F) -> Self
    where
        F: Fn() -> Runs<'a, R> + 'a,
    {
        Self {
            base: Rc::new(source),
            summary: OnceCell::new(),
        }
    }

    /// History of a single job
    pub fn from_job<J>(job: &'a J) -> Self
    where
        J: Job<Run = R>,
    {
        log::debug!("Building run list for job '{}'", job.name());
        Self::from_source(move || job.builds())
    }

    /// Histories of several jobs merged by start time.
    ///
    /// Runs with equal timestamps come out in the order their jobs were given.
    pub fn from_jobs<I, J>(jobs: I) -> Self
    where
        I: IntoIterator<Item = &'a J>,
        J: Job<Run = R> + 'a,
    {
        let jobs: Vec<&'a J> = jobs.into_iter().collect();
        log::debug!("Building run list merging {} jobs", jobs.len());
        Self::from_source(move || {
            let sources = jobs.iter().map(|&job| job.builds()).collect();
            Box::new(MergeSorted::new(sources))
        })
    }

    /// Merged history of every job reachable from a view's items
    pub fn from_view<V>(view: &'a V) -> Self
    where
        V: View,
        <V::Item as Item>::Job: Job<Run = R> + 'a,
    {
        let jobs: Vec<&'a <V::Item as Item>::Job> = view
            .items()
            .into_iter()
            .flat_map(|item| item.all_jobs())
            .collect();
        log::debug!("View '{}' contributes {} jobs", view.name(), jobs.len());
        Self::from_jobs(jobs)
    }

    /// Wrap an explicit collection of runs, kept in the given order
    pub fn from_runs<I>(runs: I) -> Self
    where
        I: IntoIterator<Item = &'a R>,
    {
        let runs: Rc<[&'a R]> = runs.into_iter().collect();
        Self::from_source(move || {
            let runs = Rc::clone(&runs);
            Box::new((0..runs.len()).map(move |i| runs[i]))
        })
    }

    /// Start a fresh pass over the history
    pub fn iter(&self) -> Runs<'a, R> {
        (self.base)()
    }

    fn summary(&self) -> (usize, Option<&'a R>) {
        *self.summary.get_or_init(|| {
            let mut size = 0;
            let mut first = None;
            for run in self.iter() {
                first = Some(run);
                size += 1;
            }
            (size, first)
        })
    }

    /// Number of runs. Traverses the whole history once, then is cached.
    pub fn len(&self) -> usize {
        self.summary().0
    }

    /// Returns true if the history has no runs. Pulls at most one run.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Run at `index` in iteration order.
    ///
    /// Walks the history from the start on every call; prefer [`iter`](Self::iter).
    pub fn get(&self, index: usize) -> Result<&'a R> {
        self.iter()
            .nth(index)
            .ok_or(RunListError::IndexOutOfRange { index })
    }

    /// Position of the first run equal to `run`
    pub fn index_of(&self, run: &R) -> Option<usize>
    where
        R: PartialEq,
    {
        self.iter().position(|r| r == run)
    }

    /// Position of the last run equal to `run`
    pub fn last_index_of(&self, run: &R) -> Option<usize>
    where
        R: PartialEq,
    {
        self.iter()
            .enumerate()
            .filter(|(_, r)| *r == run)
            .map(|(index, _)| index)
            .last()
    }

    /// The earliest run: the last one in iteration order.
    ///
    /// Computed together with [`len`](Self::len) and cached with it.
    pub fn first_build(&self) -> Option<&'a R> {
        self.summary().1
    }

    /// The most recent run: the first one in iteration order
    pub fn last_build(&self) -> Option<&'a R> {
        self.iter().next()
    }

    /// Keep only runs matching `predicate`
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&R) -> bool + 'a,
    {
        let predicate = Rc::new(predicate);
        let nested = self.base;
        Self::from_source(move || {
            let predicate = Rc::clone(&predicate);
            Box::new(nested().filter(move |r| predicate(*r)))
        })
    }

    /// Keep the leading streak of runs matching `predicate`.
    ///
    /// `predicate` gets the number of runs already kept and the candidate.
    /// Iteration ends at the first rejected run, so
    /// `filter([1,2,3,4], odd) == [1,3]` but `limit([1,2,3,4], odd) == [1]`.
    pub fn limit<P>(self, predicate: P) -> Self
    where
        P: Fn(usize, &R) -> bool + 'a,
    {
        let predicate = Rc::new(predicate);
        let nested = self.base;
        Self::from_source(move || {
            let predicate = Rc::clone(&predicate);
            Box::new(Limit::new(nested(), move |index, r: &&'a R| predicate(index, *r)))
        })
    }

    /// Keep runs that did not succeed, including runs still in progress
    pub fn failure_only(self) -> Self {
        self.filter(|r| r.result() != Some(BuildResult::Success))
    }

    /// Keep runs that recorded executing on `node`
    pub fn node(self, node: impl Into<String>) -> Self {
        let node = node.into();
        self.filter(move |r| r.built_on() == Some(node.as_str()))
    }

    /// Keep runs that are worse than the run before them
    pub fn regression_only(self) -> Self {
        self.filter(|r| r.is_regression())
    }

    /// Keep runs started in `[start, end)`, both in epoch milliseconds.
    ///
    /// Runs at or after `end` are skipped; iteration stops at the first run
    /// before `start`, since every later run is older still.
    pub fn by_timestamp(self, start: i64, end: i64) -> Self {
        self.filter(move |r| r.timestamp_ms() < end)
            .limit(move |_, r| start <= r.timestamp_ms())
    }

    /// Recent completed runs for feeds, using the default window
    pub fn new_builds(self) -> Self {
        self.new_builds_at(Utc::now())
    }

    /// [`new_builds`](Self::new_builds) evaluated at `now`
    pub fn new_builds_at(self, now: DateTime<Utc>) -> Self {
        self.new_builds_within(FeedWindow::default(), now)
    }

    /// Drop runs still in progress, then keep the first `window.min_builds`
    /// runs unconditionally and after that only runs younger than
    /// `window.max_age`.
    pub fn new_builds_within(self, window: FeedWindow, now: DateTime<Utc>) -> Self {
        // a window reaching past chrono's range accepts every run
        let cutoff = match now.checked_sub_signed(window.max_age) {
            Some(t) => t.timestamp_millis(),
            None if window.max_age > Duration::zero() => i64::MIN,
            None => i64::MAX,
        };
        let min_builds = window.min_builds;
        // in-progress runs still change, so they can't be published
        self.filter(|r| !r.is_building())
            .limit(move |index, r| index < min_builds || r.timestamp_ms() >= cutoff)
    }
}

impl<'a, R: Run + 'a> Default for RunList<'a, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for RunList<'_, R> {
    fn clone(&self) -> Self {
        Self {
            base: Rc::clone(&self.base),
            summary: self.summary.clone(),
        }
    }
}

impl<R> fmt::Debug for RunList<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunList")
            .field("cached_len", &self.summary.get().map(|(size, _)| *size))
            .finish_non_exhaustive()
    }
}

impl<'a, 'b, R: Run + 'a> IntoIterator for &'b RunList<'a, R> {
    type Item = &'a R;
    type IntoIter = Runs<'a, R>;

    fn into_iter(self) -> Runs<'a, R> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Build, BuildResult::*, Folder, ListView, Project};
    use std::cell::Cell;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn numbers(list: &RunList<'_, Build>) -> Vec<u32> {
        list.iter().map(|b| b.number).collect()
    }

    fn stamps(list: &RunList<'_, Build>) -> Vec<i64> {
        list.iter().map(|b| b.timestamp_ms()).collect()
    }

    fn project_at(name: &str, timestamps: &[i64]) -> Project {
        let builds = timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| Build::new("", i as u32 + 1, ts).with_result(Success))
            .collect();
        Project::new(name, builds)
    }

    /// Job that counts how many passes were started over it
    struct CountingJob {
        builds: Vec<Build>,
        passes: Cell<usize>,
    }

    impl Job for CountingJob {
        type Run = Build;

        fn name(&self) -> &str {
            "counting"
        }

        fn builds(&self) -> Runs<'_, Build> {
            self.passes.set(self.passes.get() + 1);
            Box::new(self.builds.iter())
        }
    }

    /// Job whose history explodes after its first build
    struct FragileJob {
        head: Build,
    }

    impl Job for FragileJob {
        type Run = Build;

        fn name(&self) -> &str {
            "fragile"
        }

        fn builds(&self) -> Runs<'_, Build> {
            Box::new(std::iter::once(&self.head).chain(std::iter::from_fn(|| panic!("history over-read"))))
        }
    }

    #[test]
    fn test_empty_list() {
        let list: RunList<'_, Build> = RunList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.first_build().is_none());
        assert!(list.last_build().is_none());
        assert!(matches!(list.get(0), Err(RunListError::IndexOutOfRange { index: 0 })));
    }

    #[test]
    fn test_single_job_order() {
        let app = project_at("app", &[10, 30, 20]);
        let list = RunList::from_job(&app);
        assert_eq!(stamps(&list), vec![30, 20, 10]);
        assert_eq!(numbers(&list), vec![2, 3, 1]);
    }

    #[test]
    fn test_merged_jobs_are_globally_descending() {
        let a = project_at("a", &[100, 70, 40, 10]);
        let b = project_at("b", &[90, 80, 20]);
        let c = project_at("c", &[]);
        let list = RunList::from_jobs([&a, &b, &c]);

        let merged = stamps(&list);
        assert_eq!(merged, vec![100, 90, 80, 70, 40, 20, 10]);
        assert!(merged.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(list.len(), a.len() + b.len() + c.len());
    }

    #[test]
    fn test_merge_ties_are_deterministic() {
        let a = project_at("a", &[50]);
        let b = project_at("b", &[50]);
        let list = RunList::from_jobs([&a, &b]);
        let jobs: Vec<&str> = list.iter().map(|r| r.job.as_str()).collect();
        assert_eq!(jobs, vec!["a", "b"]);
        let again: Vec<&str> = list.iter().map(|r| r.job.as_str()).collect();
        assert_eq!(jobs, again);
    }

    #[test]
    fn test_from_view_merges_nested_jobs() {
        let view = ListView::new(
            "all",
            vec![
                project_at("app", &[30, 10]).into(),
                Folder::new("libs", vec![project_at("core", &[20]).into()]).into(),
            ],
        );
        let list = RunList::from_view(&view);
        let jobs: Vec<&str> = list.iter().map(|r| r.job.as_str()).collect();
        assert_eq!(jobs, vec!["app", "core", "app"]);
    }

    #[test]
    fn test_from_runs_keeps_given_order() {
        let runs = [Build::new("x", 1, 5), Build::new("x", 2, 50), Build::new("x", 3, 1)];
        let list = RunList::from_runs(&runs);
        assert_eq!(numbers(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_filter_versus_limit() {
        let app = project_at("app", &[4, 3, 2, 1]);
        let odd = |r: &Build| r.timestamp_ms() % 2 == 1;

        // newest first: 4, 3, 2, 1
        let filtered = RunList::from_job(&app).filter(odd);
        assert_eq!(stamps(&filtered), vec![3, 1]);

        let limited = RunList::from_job(&app).limit(move |_, r| odd(r));
        assert!(limited.is_empty());

        let runs: Vec<Build> = [1, 2, 3, 4].iter().map(|&ts| Build::new("x", 0, ts)).collect();
        let filtered = RunList::from_runs(&runs).filter(odd);
        assert_eq!(stamps(&filtered), vec![1, 3]);
        let limited = RunList::from_runs(&runs).limit(move |_, r| odd(r));
        assert_eq!(stamps(&limited), vec![1]);
    }

    #[test]
    fn test_limit_receives_kept_count() {
        let app = project_at("app", &[6, 5, 4, 3, 2, 1]);
        let list = RunList::from_job(&app).limit(|index, _| index < 4);
        assert_eq!(stamps(&list), vec![6, 5, 4, 3]);
        // restarting begins counting from zero again
        assert_eq!(list.len(), 4);
        assert_eq!(stamps(&list), vec![6, 5, 4, 3]);
    }

    #[test]
    fn test_is_empty_pulls_one_run() {
        let job = FragileJob {
            head: Build::new("fragile", 1, 1),
        };
        let list = RunList::from_job(&job);
        assert!(!list.is_empty());
        assert_eq!(list.last_build().map(|b| b.number), Some(1));
    }

    #[test]
    fn test_len_is_cached() {
        let job = CountingJob {
            builds: project_at("c", &[3, 2, 1]).builds().cloned().collect(),
            passes: Cell::new(0),
        };
        let list = RunList::from_job(&job);
        assert_eq!(list.len(), 3);
        assert_eq!(list.len(), 3);
        assert_eq!(list.first_build().map(|b| b.timestamp_ms()), Some(1));
        assert_eq!(job.passes.get(), 1);
    }

    #[test]
    fn test_first_build_matches_iteration_end() {
        let a = project_at("a", &[100, 40]);
        let b = project_at("b", &[70, 10]);
        let list = RunList::from_jobs([&a, &b]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.first_build(), list.iter().last());
        assert_eq!(list.last_build(), list.iter().next());
        assert_eq!(list.last_build().map(|r| r.timestamp_ms()), Some(100));
        assert_eq!(list.first_build().map(|r| r.timestamp_ms()), Some(10));
    }

    #[test]
    fn test_transform_invalidates_cached_len() {
        let app = project_at("app", &[5, 4, 3, 2, 1]);
        let list = RunList::from_job(&app);
        assert_eq!(list.len(), 5);
        let list = list.filter(|r| r.timestamp_ms() > 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list.first_build().map(|r| r.timestamp_ms()), Some(3));
    }

    #[test]
    fn test_get_and_index_of() {
        let app = project_at("app", &[30, 20, 10, 20]);
        let list = RunList::from_job(&app);

        let second = list.get(1).unwrap();
        assert_eq!(second.timestamp_ms(), 20);
        assert!(matches!(list.get(4), Err(RunListError::IndexOutOfRange { index: 4 })));

        assert_eq!(list.index_of(second), Some(1));
        assert_eq!(list.last_index_of(second), Some(1));

        let stranger = Build::new("elsewhere", 99, 0);
        assert_eq!(list.index_of(&stranger), None);
        assert_eq!(list.last_index_of(&stranger), None);
    }

    #[test]
    fn test_last_index_of_duplicates() {
        let run = Build::new("x", 1, 10);
        let other = Build::new("x", 2, 10);
        let list = RunList::from_runs([&run, &other, &run, &other]);
        assert_eq!(list.index_of(&run), Some(0));
        assert_eq!(list.last_index_of(&run), Some(2));
        assert_eq!(list.last_index_of(&other), Some(3));
    }

    #[test]
    fn test_failure_only_keeps_in_progress() {
        let app = Project::new(
            "app",
            vec![
                Build::new("", 1, 1).with_result(Success),
                Build::new("", 2, 2).with_result(Failure),
                Build::new("", 3, 3).with_result(Unstable),
                Build::new("", 4, 4),
            ],
        );
        let list = RunList::from_job(&app).failure_only();
        assert_eq!(numbers(&list), vec![4, 3, 2]);
    }

    #[test]
    fn test_node_filter() {
        let app = Project::new(
            "app",
            vec![
                Build::new("", 1, 1).with_result(Success).on("linux"),
                Build::new("", 2, 2).with_result(Success).on("mac"),
                Build::new("", 3, 3).with_result(Success),
                Build::new("", 4, 4).with_result(Success).on("linux"),
            ],
        );
        assert_eq!(numbers(&RunList::from_job(&app).node("linux")), vec![4, 1]);
        assert!(RunList::from_job(&app).node("windows").is_empty());
    }

    #[test]
    fn test_regression_only() {
        let app = Project::new(
            "app",
            vec![
                Build::new("", 1, 1).with_result(Success),
                Build::new("", 2, 2).with_result(Failure),
                Build::new("", 3, 3).with_result(Failure),
                Build::new("", 4, 4).with_result(Success),
                Build::new("", 5, 5).with_result(Unstable),
            ],
        );
        let list = RunList::from_job(&app).regression_only();
        assert_eq!(numbers(&list), vec![5, 2]);
    }

    #[test]
    fn test_by_timestamp_window() {
        let app = project_at("app", &[100, 90, 80, 70, 60]);
        let list = RunList::from_job(&app).by_timestamp(70, 95);
        assert_eq!(stamps(&list), vec![90, 80, 70]);
    }

    #[test]
    fn test_by_timestamp_stops_below_start() {
        let job = CountingJob {
            builds: project_at("c", &[50, 40, 30]).builds().cloned().collect(),
            passes: Cell::new(0),
        };
        let list = RunList::from_job(&job).by_timestamp(100, 200);
        assert!(list.is_empty());
        assert_eq!(RunList::from_job(&job).by_timestamp(0, 41).len(), 2);
    }

    #[test]
    fn test_new_builds_keeps_minimum_of_old_builds() {
        let now = Utc::now();
        let old = now.timestamp_millis() - 30 * DAY_MS;
        let timestamps: Vec<i64> = (0..15).map(|i| old - i * 1000).collect();
        let app = project_at("app", &timestamps);

        let list = RunList::from_job(&app).new_builds_at(now);
        assert_eq!(list.len(), 10);
        assert_eq!(stamps(&list), timestamps[..10].to_vec());
    }

    #[test]
    fn test_new_builds_tops_up_recent_with_old() {
        let now = Utc::now();
        let recent_base = now.timestamp_millis() - DAY_MS;
        let old_base = now.timestamp_millis() - 20 * DAY_MS;
        let mut timestamps: Vec<i64> = (0..3).map(|i| recent_base - i * 1000).collect();
        timestamps.extend((0..12).map(|i| old_base - i * 1000));
        let app = project_at("app", &timestamps);

        let list = RunList::from_job(&app).new_builds_at(now);
        let kept = stamps(&list);
        assert_eq!(kept.len(), 10);
        assert!(timestamps[..3].iter().all(|ts| kept.contains(ts)));
    }

    #[test]
    fn test_new_builds_keeps_all_recent_beyond_minimum() {
        let now = Utc::now();
        let base = now.timestamp_millis() - DAY_MS;
        let timestamps: Vec<i64> = (0..14).map(|i| base - i * 1000).collect();
        let app = project_at("app", &timestamps);
        assert_eq!(RunList::from_job(&app).new_builds_at(now).len(), 14);
    }

    #[test]
    fn test_new_builds_skips_in_progress() {
        let now = Utc::now();
        let ts = now.timestamp_millis();
        let app = Project::new(
            "app",
            vec![
                Build::new("", 1, ts - 3000).with_result(Success),
                Build::new("", 2, ts - 2000).with_result(Failure),
                Build::new("", 3, ts - 1000),
            ],
        );
        let list = RunList::from_job(&app).new_builds_at(now);
        assert_eq!(numbers(&list), vec![2, 1]);
        assert!(list.iter().all(|b| !b.is_building()));
    }

    #[test]
    fn test_new_builds_within_custom_window() {
        let now = Utc::now();
        let base = now.timestamp_millis();
        let app = project_at("app", &[base - DAY_MS, base - 3 * DAY_MS, base - 5 * DAY_MS]);
        let window = FeedWindow {
            min_builds: 1,
            max_age: Duration::days(2),
        };
        assert_eq!(RunList::from_job(&app).new_builds_within(window, now).len(), 1);
    }

    #[test]
    fn test_new_builds_within_window_past_calendar_range() {
        let now = Utc::now();
        let base = now.timestamp_millis();
        let timestamps: Vec<i64> = (0..12).map(|i| base - i * 365 * DAY_MS).collect();
        let app = project_at("app", &timestamps);

        let window = FeedWindow {
            min_builds: 10,
            max_age: Duration::days(100_000_000),
        };
        assert_eq!(RunList::from_job(&app).new_builds_within(window, now).len(), 12);

        let window = FeedWindow {
            min_builds: 10,
            max_age: Duration::days(-100_000_000),
        };
        assert_eq!(RunList::from_job(&app).new_builds_within(window, now).len(), 10);
    }

    #[test]
    fn test_list_is_restartable() {
        let a = project_at("a", &[3, 1]);
        let b = project_at("b", &[2]);
        let list = RunList::from_jobs([&a, &b]).filter(|r| r.timestamp_ms() != 2);
        let first_pass = stamps(&list);
        let second_pass: Vec<i64> = (&list).into_iter().map(|r| r.timestamp_ms()).collect();
        assert_eq!(first_pass, vec![3, 1]);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_clone_shares_source() {
        let app = project_at("app", &[2, 1]);
        let list = RunList::from_job(&app);
        let narrowed = list.clone().limit(|index, _| index < 1);
        assert_eq!(list.len(), 2);
        assert_eq!(narrowed.len(), 1);
        assert!(format!("{:?}", list).contains("cached_len: Some(2)"));
    }
}
