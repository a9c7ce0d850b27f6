//! Package index lookups (PyPI JSON API).

mod pypi;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

pub use pypi::PyPiIndex;

/// Project document returned by `GET {index}/{name}/json`.
///
/// Only the fields release selection needs are read; everything else in
/// the document is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub info: Option<ProjectInfo>,
    #[serde(default)]
    pub releases: BTreeMap<String, Vec<ReleaseFile>>,
}

impl ProjectData {
    /// The project's homepage according to the index, if any.
    pub fn project_url(&self) -> Option<&str> {
        self.info
            .as_ref()
            .and_then(|info| info.project_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub project_url: Option<String>,
}

/// One uploaded artifact (wheel or sdist) of a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseFile {
    #[serde(default)]
    pub yanked: Option<bool>,
    #[serde(default)]
    pub requires_python: Option<String>,
}

impl ReleaseFile {
    pub fn is_yanked(&self) -> bool {
        self.yanked.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLookup {
    Found(ProjectData),
    /// The index does not know the project (HTTP 404).
    NotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Fetch the project document for `name`.
    ///
    /// An unknown project is `Ok(IndexLookup::NotFound)`; every other
    /// failure is an error.
    async fn fetch_project(&self, name: &str) -> Result<IndexLookup>;
}
