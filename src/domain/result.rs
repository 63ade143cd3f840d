//! Build result and status summary types.
//!
//! A build's result is only known once it finishes; until then it is `None`.
//! The status summary compares a build with the builds before it and decides
//! whether it is a regression.

use serde::{Deserialize, Serialize};

/// Final result of a completed build, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
    /// Build completed without problems
    Success,
    /// Build completed but some checks (usually tests) failed
    Unstable,
    /// Build failed
    Failure,
    /// Build was skipped, typically because an upstream build failed
    NotBuilt,
    /// Build was interrupted
    Aborted,
}

impl BuildResult {
    /// Returns true if this result is strictly worse than `other`
    pub fn is_worse_than(&self, other: BuildResult) -> bool {
        *self > other
    }

    /// Returns true if this result is strictly better than `other`
    pub fn is_better_than(&self, other: BuildResult) -> bool {
        *self < other
    }

    /// Lowercase label used in CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unstable => "unstable",
            Self::Failure => "failure",
            Self::NotBuilt => "not built",
            Self::Aborted => "aborted",
        }
    }
}

/// How a build compares to the builds that ran before it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStatusSummary {
    /// True if this build made things worse than the previous build
    pub is_worse: bool,
    /// Human readable description, e.g. "broken since this build"
    pub message: String,
}

impl BuildStatusSummary {
    pub fn new(is_worse: bool, message: impl Into<String>) -> Self {
        Self {
            is_worse,
            message: message.into(),
        }
    }

    /// Summarize `current` given the older builds of the same job.
    ///
    /// `older` yields `(number, result)` pairs, most recent first. A `None`
    /// result is a build still in progress.
    pub fn summarize<I>(current: Option<BuildResult>, older: I) -> Self
    where
        I: IntoIterator<Item = (u32, Option<BuildResult>)>,
    {
        let older: Vec<_> = older.into_iter().collect();
        let mut history = StatusHistory::default();
        for (number, result) in older.into_iter().rev() {
            history.record(number, result);
        }
        history.summarize(current)
    }
}

/// Running state of a job's history, fed oldest build first.
///
/// Lets a whole history be summarized in one pass instead of walking the
/// older builds again for every build.
#[derive(Debug, Clone, Default)]
pub struct StatusHistory {
    /// The most recently recorded build
    previous: Option<(u32, Option<BuildResult>)>,
    /// A completed build that did not fail has been recorded
    anchored: bool,
    /// Oldest failure recorded since the last completed non-failure
    streak_start: Option<u32>,
}

impl StatusHistory {
    /// Summarize a build that follows everything recorded so far
    pub fn summarize(&self, current: Option<BuildResult>) -> BuildStatusSummary {
        match current {
            None => BuildStatusSummary::new(false, "in progress"),
            Some(BuildResult::Success) => match self.previous {
                None | Some((_, Some(BuildResult::Success))) => BuildStatusSummary::new(false, "stable"),
                Some(_) => BuildStatusSummary::new(false, "back to normal"),
            },
            Some(BuildResult::Failure) => match (self.anchored, self.streak_start) {
                (false, _) => BuildStatusSummary::new(false, "broken for a long time"),
                (true, None) => BuildStatusSummary::new(true, "broken since this build"),
                (true, Some(n)) => BuildStatusSummary::new(false, format!("broken since build #{}", n)),
            },
            Some(BuildResult::Unstable) => match self.previous {
                Some((_, Some(BuildResult::Success))) => BuildStatusSummary::new(true, "unstable"),
                _ => BuildStatusSummary::new(false, "still unstable"),
            },
            Some(BuildResult::NotBuilt) => BuildStatusSummary::new(false, "not built"),
            Some(BuildResult::Aborted) => BuildStatusSummary::new(false, "aborted"),
        }
    }

    /// Record the next newer build
    pub fn record(&mut self, number: u32, result: Option<BuildResult>) {
        match result {
            // in-progress builds never start or end a failing streak
            None => {}
            Some(BuildResult::Failure) => {
                if self.streak_start.is_none() {
                    self.streak_start = Some(number);
                }
            }
            Some(_) => {
                self.anchored = true;
                self.streak_start = None;
            }
        }
        self.previous = Some((number, result));
    }
}
