//! runlist - lazily merged, filterable views over CI build history
//!
//! A [`RunList`] presents the builds of one job, or of many jobs merged by
//! start time, newest first. Filters and streak limits compose lazily and
//! never copy the underlying records.

pub mod domain;
pub mod error;
pub mod iterators;
pub mod run_list;
pub mod storage;

pub use error::{Result, RunListError};
pub use run_list::{FeedWindow, RunList};
