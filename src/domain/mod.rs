//! Domain types for runlist
//!
//! - Run: the record seam every history entry implements
//! - Build: the concrete build record
//! - BuildResult / BuildStatusSummary: outcomes and regression detection
//! - Job / Project: owners of an ordered build history
//! - Item / View / Folder / ListView: groupings of jobs

pub mod build;
pub mod job;
pub mod result;
pub mod run;
pub mod view;

pub use build::Build;
pub use job::{Job, Project};
pub use result::{BuildResult, BuildStatusSummary, StatusHistory};
pub use run::{Run, Runs};
pub use view::{Folder, Item, ListView, TopLevelItem, View};
