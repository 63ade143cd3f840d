//! The run record seam.
//!
//! Anything that can appear in a build history implements [`Run`]. Records are
//! owned by their job; history views only ever hold `&R`.

use super::result::BuildResult;

/// Boxed iterator over borrowed run records, most recent first
pub type Runs<'a, R> = Box<dyn Iterator<Item = &'a R> + 'a>;

/// One execution record of a job
pub trait Run {
    /// Start time in milliseconds since the Unix epoch
    fn timestamp_ms(&self) -> i64;

    /// Final result, or `None` while the run is still in progress
    fn result(&self) -> Option<BuildResult>;

    /// Returns true if the run has not finished yet
    fn is_building(&self) -> bool {
        self.result().is_none()
    }

    /// Node the run executed on.
    ///
    /// Kinds of runs that do not record an execution location return `None`.
    fn built_on(&self) -> Option<&str> {
        None
    }

    /// Returns true if this run is worse than the run before it
    fn is_regression(&self) -> bool;
}
