//! Determining the latest installable release of every tracked package.

mod select;

use futures_util::{StreamExt, stream};
use log::{debug, info, warn};
use pep440_rs::Version;
use std::collections::BTreeMap;

pub use select::select_latest;

use crate::environment::MarkerValues;
use crate::index::{IndexLookup, PackageIndex};
use crate::package::version::is_outdated;
use crate::package::{
    Catalog, Consolidated, ConsolidatedRequirement, DistributionRecord, SpecifierSet,
};

/// Outcome of one index lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Empty when no release could be determined.
    pub latest_version: String,
    pub homepage_url: Option<String>,
}

/// A tracked package together with its resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub record: DistributionRecord,
    pub latest_version: String,
    pub homepage_url: String,
    pub is_outdated: Option<bool>,
}

impl ResolvedPackage {
    pub fn new(record: DistributionRecord, resolution: Resolution) -> Self {
        let homepage_url = resolution
            .homepage_url
            .unwrap_or_else(|| record.homepage_url.clone());
        let is_outdated = is_outdated(&record.current_version, &resolution.latest_version);
        Self {
            record,
            latest_version: resolution.latest_version,
            homepage_url,
            is_outdated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// At most this many lookups in flight.
    Concurrent(usize),
    Sequential,
}

pub struct ReleaseResolver<'a> {
    index: &'a dyn PackageIndex,
    python: Option<Version>,
}

impl<'a> ReleaseResolver<'a> {
    pub fn new(index: &'a dyn PackageIndex, markers: &MarkerValues) -> Self {
        let python = markers.python_full_version();
        if python.is_none() {
            warn!("Python version unknown, Requires-Python will not be checked");
        }
        Self { index, python }
    }

    /// Resolve one package. Failures are logged and yield an empty
    /// `latest_version`.
    #[tracing::instrument(skip_all, fields(package = %record.name))]
    pub async fn resolve(
        &self,
        record: &DistributionRecord,
        constraint: Option<&ConsolidatedRequirement>,
    ) -> Resolution {
        let project = match self.index.fetch_project(&record.name).await {
            Ok(IndexLookup::Found(project)) => project,
            Ok(IndexLookup::NotFound) => {
                info!("Package {} not found on the index", record.name);
                return Resolution::default();
            }
            Err(e) => {
                warn!("Failed to look up {}: {:#}", record.name, e);
                return Resolution::default();
            }
        };

        let empty = SpecifierSet::new();
        let specifiers = constraint.map(|c| &c.specifiers).unwrap_or(&empty);

        let latest = select_latest(
            &record.name,
            &record.current_version,
            specifiers,
            &project,
            self.python.as_ref(),
        );

        let latest_version = match latest {
            Some(version) => {
                debug!("{}: latest {}", record.name, version);
                version
            }
            None => {
                warn!(
                    "No release of {} satisfies {:?}",
                    record.name,
                    specifiers.to_string()
                );
                String::new()
            }
        };

        Resolution {
            latest_version,
            homepage_url: project.project_url().map(str::to_string),
        }
    }

    /// Resolve every package in `tracked`. The result does not depend on
    /// `mode`.
    #[tracing::instrument(skip_all, fields(packages = tracked.len()))]
    pub async fn resolve_all(
        &self,
        tracked: &Catalog,
        consolidated: &Consolidated,
        mode: ExecutionMode,
    ) -> BTreeMap<String, ResolvedPackage> {
        let lookups = tracked.iter().map(move |(key, record)| async move {
            let resolution = self.resolve(record, consolidated.get(key)).await;
            (key.clone(), ResolvedPackage::new(record.clone(), resolution))
        });

        match mode {
            ExecutionMode::Concurrent(max_workers) => {
                stream::iter(lookups)
                    .buffer_unordered(max_workers.max(1))
                    .collect()
                    .await
            }
            ExecutionMode::Sequential => {
                stream::iter(lookups)
                    .then(|lookup| lookup)
                    .collect()
                    .await
            }
        }
    }
}
