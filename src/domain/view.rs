//! Grouping containers: items, folders and views.
//!
//! A view lists top-level items; each item knows every job it contains. A
//! project is an item containing only itself, a folder contains the jobs of
//! all its nested items.

use super::job::{Job, Project};

/// Something that contains jobs
pub trait Item {
    type Job: Job;

    fn name(&self) -> &str;

    /// Every job within this item, recursively
    fn all_jobs(&self) -> Vec<&Self::Job>;
}

/// A named selection of items
pub trait View {
    type Item: Item;

    fn name(&self) -> &str;

    fn items(&self) -> Vec<&Self::Item>;
}

impl Item for Project {
    type Job = Project;

    fn name(&self) -> &str {
        Job::name(self)
    }

    fn all_jobs(&self) -> Vec<&Project> {
        vec![self]
    }
}

/// Item that can appear at the top of a view or inside a folder
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem {
    Project(Project),
    Folder(Folder),
}

impl Item for TopLevelItem {
    type Job = Project;

    fn name(&self) -> &str {
        match self {
            Self::Project(p) => Item::name(p),
            Self::Folder(f) => f.name(),
        }
    }

    fn all_jobs(&self) -> Vec<&Project> {
        match self {
            Self::Project(p) => p.all_jobs(),
            Self::Folder(f) => f.all_jobs(),
        }
    }
}

impl From<Project> for TopLevelItem {
    fn from(project: Project) -> Self {
        Self::Project(project)
    }
}

impl From<Folder> for TopLevelItem {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

/// Container of nested items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Folder {
    name: String,
    items: Vec<TopLevelItem>,
}

impl Folder {
    pub fn new(name: impl Into<String>, items: Vec<TopLevelItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    pub fn items(&self) -> &[TopLevelItem] {
        &self.items
    }
}

impl Item for Folder {
    type Job = Project;

    fn name(&self) -> &str {
        &self.name
    }

    fn all_jobs(&self) -> Vec<&Project> {
        self.items.iter().flat_map(|item| item.all_jobs()).collect()
    }
}

/// View over an explicit list of items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListView {
    name: String,
    items: Vec<TopLevelItem>,
}

impl ListView {
    pub fn new(name: impl Into<String>, items: Vec<TopLevelItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Look up a job anywhere in the view by name
    pub fn job(&self, name: &str) -> Option<&Project> {
        self.items
            .iter()
            .flat_map(|item| item.all_jobs())
            .find(|job| Job::name(*job) == name)
    }
}

impl View for ListView {
    type Item = TopLevelItem;

    fn name(&self) -> &str {
        &self.name
    }

    fn items(&self) -> Vec<&TopLevelItem> {
        self.items.iter().collect()
    }
}
