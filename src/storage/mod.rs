//! Read-only access to build history snapshots on disk.

mod jsonl;

pub use jsonl::{JsonlHistory, HISTORY_EXTENSION};
