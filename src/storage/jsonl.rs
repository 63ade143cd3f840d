//! JSONL history snapshots.
//!
//! A history directory holds one `<job>.jsonl` file per job, one build record
//! per line. Everything is loaded up front into in-memory projects; nothing
//! is ever written back.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::domain::{Build, Item, ListView, Project, TopLevelItem, View};
use crate::error::{Result, RunListError};

/// File extension of per-job history files.
pub const HISTORY_EXTENSION: &str = "jsonl";

/// Build history loaded from a directory of JSONL files.
#[derive(Debug)]
pub struct JsonlHistory {
    base_path: PathBuf,
    view: ListView,
}

impl JsonlHistory {
    /// Load every job history under `base_path`, in file name order.
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        if !base_path.is_dir() {
            return Err(RunListError::HistoryNotFound(base_path));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&base_path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == HISTORY_EXTENSION));
        paths.sort();

        let mut items: Vec<TopLevelItem> = Vec::with_capacity(paths.len());
        for path in &paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("Skipping history file with non UTF-8 name: {}", path.display());
                continue;
            };
            items.push(Self::load_job(path, name)?.into());
        }

        let view_name = base_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("history")
            .to_string();
        log::info!("Loaded {} job histories from {}", items.len(), base_path.display());

        Ok(Self {
            view: ListView::new(view_name, items),
            base_path,
        })
    }

    /// Parse one job's history file.
    fn load_job(path: &Path, name: &str) -> Result<Project> {
        let reader = BufReader::new(File::open(path)?);
        let mut builds = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let build: Build = serde_json::from_str(&line)?;
            if !build.job.is_empty() && build.job != name {
                return Err(RunListError::InvalidRecord(format!(
                    "{}:{}: build belongs to job '{}'",
                    path.display(),
                    line_no + 1,
                    build.job
                )));
            }
            builds.push(build);
        }
        log::debug!("Read {} builds for job '{}'", builds.len(), name);
        Ok(Project::new(name, builds))
    }

    /// Directory the history was loaded from.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// All loaded jobs as a single view.
    pub fn view(&self) -> &ListView {
        &self.view
    }

    /// Every job, in file name order.
    pub fn jobs(&self) -> Vec<&Project> {
        self.view
            .items()
            .into_iter()
            .flat_map(|item| item.all_jobs())
            .collect()
    }

    /// Look up a job by name.
    pub fn job(&self, name: &str) -> Option<&Project> {
        self.view.job(name)
    }

    /// Resolve job names, failing on the first unknown one.
    ///
    /// An empty selection means every job.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Project>> {
        if names.is_empty() {
            return Ok(self.jobs());
        }
        names
            .iter()
            .map(|name| self.job(name).ok_or_else(|| RunListError::JobNotFound(name.clone())))
            .collect()
    }
}
