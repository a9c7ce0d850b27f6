//! Sources of installed distributions and host application modules.
//!
//! The pipeline only sees the two traits defined here; [`SitePackages`]
//! is the implementation that reads `*.dist-info` directories from disk.

mod core_metadata;
mod site_packages;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use core_metadata::{CoreMetadata, parse_record};
pub use site_packages::SitePackages;

/// An installed distribution as found on disk, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDistribution {
    pub name: Option<String>,
    pub version: String,
    pub summary: Option<String>,
    pub home_page: Option<String>,
    /// `Project-URL` values, e.g. `"Homepage, https://example.com"`.
    pub project_urls: Vec<String>,
    /// `Requires-Dist` values, unparsed.
    pub requires_dist: Vec<String>,
    /// Paths shipped by the distribution, relative to site-packages.
    pub files: Vec<String>,
    /// Content of `direct_url.json`, if present.
    pub direct_url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait DistributionSource: Send + Sync {
    /// Enumerate every installed distribution.
    fn distributions(&self) -> Result<Vec<RawDistribution>>;
}

/// A loaded module of the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostModule {
    /// Module identifier, e.g. `"package_monitor"`.
    pub name: String,
    /// Path of the module's `__init__.py`.
    pub file: String,
}

pub trait ModuleProvider {
    fn modules(&self) -> Vec<HostModule>;
}

/// Host modules known up front (from settings).
#[derive(Debug, Clone, Default)]
pub struct StaticModules(pub Vec<HostModule>);

impl ModuleProvider for StaticModules {
    fn modules(&self) -> Vec<HostModule> {
        self.0.clone()
    }
}
