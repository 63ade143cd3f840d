//! Jobs: owners of an ordered build history.

use std::cmp::Reverse;

use super::build::Build;
use super::result::StatusHistory;
use super::run::{Run, Runs};

/// A recurring unit of work that accumulates runs.
///
/// `builds` must yield runs most recent first and must be callable any
/// number of times; every call starts a fresh pass over the history.
pub trait Job {
    type Run: Run;

    fn name(&self) -> &str;

    fn builds(&self) -> Runs<'_, Self::Run>;
}

/// In-memory job holding its builds newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    name: String,
    builds: Vec<Build>,
}

impl Project {
    /// Create a project from builds in any order.
    ///
    /// Builds are sorted most recent first, builds without a job name are
    /// assigned this project's name, and each build's status summary is
    /// computed against the builds before it.
    pub fn new(name: impl Into<String>, mut builds: Vec<Build>) -> Self {
        let name = name.into();
        builds.sort_by_key(|b| Reverse((b.timestamp_ms(), b.number)));

        // summaries only depend on older builds, so walk oldest first
        let mut history = StatusHistory::default();
        for build in builds.iter_mut().rev() {
            if build.job.is_empty() {
                build.job = name.clone();
            }
            build.summary = history.summarize(build.result);
            history.record(build.number, build.result);
        }

        log::debug!("Project '{}' holds {} builds", name, builds.len());
        Self { name, builds }
    }

    /// Number of builds recorded
    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    /// Build with the given number, if any
    pub fn build(&self, number: u32) -> Option<&Build> {
        self.builds.iter().find(|b| b.number == number)
    }

    /// The earliest build still recorded
    pub fn first_build(&self) -> Option<&Build> {
        self.builds.last()
    }

    /// The most recent build
    pub fn last_build(&self) -> Option<&Build> {
        self.builds.first()
    }
}

impl Job for Project {
    type Run = Build;

    fn name(&self) -> &str {
        &self.name
    }

    fn builds(&self) -> Runs<'_, Build> {
        Box::new(self.builds.iter())
    }
}
