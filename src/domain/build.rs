//! Build record - the concrete run type used by in-memory jobs and the
//! JSONL history loader.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{BuildResult, BuildStatusSummary};
use super::run::Run;

/// A single build of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    //=== Identity ===
    /// Name of the job this build belongs to
    #[serde(default)]
    pub job: String,

    /// Build number, unique within the job
    pub number: u32,

    //=== Execution ===
    /// When the build started
    pub timestamp: DateTime<Utc>,

    /// How long the build took (0 while in progress)
    #[serde(default)]
    pub duration_ms: u64,

    /// Final result; absent while the build is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<BuildResult>,

    /// Node the build executed on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_on: Option<String>,

    //=== Derived ===
    /// Comparison with the previous build, filled in by the owning job
    #[serde(skip)]
    pub summary: BuildStatusSummary,
}

impl Build {
    /// Create an in-progress build started at `timestamp_ms`.
    ///
    /// A timestamp outside chrono's representable range is clamped to the
    /// epoch and logged.
    pub fn new(job: impl Into<String>, number: u32, timestamp_ms: i64) -> Self {
        let job = job.into();
        let timestamp = DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_else(|| {
            log::warn!(
                "Build {} #{} has out-of-range timestamp {}ms, using the epoch",
                job,
                number,
                timestamp_ms
            );
            DateTime::<Utc>::default()
        });
        Self {
            job,
            number,
            timestamp,
            duration_ms: 0,
            result: None,
            built_on: None,
            summary: BuildStatusSummary::default(),
        }
    }

    /// Mark the build as finished with `result`
    pub fn with_result(mut self, result: BuildResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Record the node the build ran on
    pub fn on(mut self, node: impl Into<String>) -> Self {
        self.built_on = Some(node.into());
        self
    }

    /// Display name, e.g. "app #42"
    pub fn display_name(&self) -> String {
        format!("{} #{}", self.job, self.number)
    }
}

impl Run for Build {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    fn result(&self) -> Option<BuildResult> {
        self.result
    }

    fn built_on(&self) -> Option<&str> {
        self.built_on.as_deref()
    }

    fn is_regression(&self) -> bool {
        self.summary.is_worse
    }
}
