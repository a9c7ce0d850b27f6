//! Refresh action - rebuilds the stored package set from scratch.
//!
//! This action coordinates:
//! - Discovering installed distributions and building the catalog
//! - Consolidating requirements across the full inventory
//! - Resolving the latest release of every tracked package
//! - Mirroring the results into the store

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::collections::BTreeMap;

use crate::config::Settings;
use crate::discovery::{DistributionSource, ModuleProvider};
use crate::environment::Interpreter;
use crate::index::PackageIndex;
use crate::package::{CatalogBuilder, Consolidator, MetadataExtractor, PackageFilter};
use crate::resolver::{ExecutionMode, ReleaseResolver};
use crate::runtime::Runtime;
use crate::store::{JsonStore, StoredDistribution};

/// Outcome of one refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Installed distributions found
    pub discovered: usize,
    /// Packages stored by this refresh
    pub refreshed: usize,
    /// Stored packages with a newer release available
    pub outdated: usize,
    /// Stored packages deleted because they are no longer tracked
    pub removed: usize,
}

pub struct RefreshAction<'a, R: Runtime> {
    runtime: &'a R,
    settings: &'a Settings,
    interpreter: &'a Interpreter,
    source: &'a dyn DistributionSource,
    modules: &'a dyn ModuleProvider,
    index: &'a dyn PackageIndex,
    store: &'a JsonStore<'a, R>,
}

impl<'a, R: Runtime> RefreshAction<'a, R> {
    pub fn new(
        runtime: &'a R,
        settings: &'a Settings,
        interpreter: &'a Interpreter,
        source: &'a dyn DistributionSource,
        modules: &'a dyn ModuleProvider,
        index: &'a dyn PackageIndex,
        store: &'a JsonStore<'a, R>,
    ) -> Self {
        Self {
            runtime,
            settings,
            interpreter,
            source,
            modules,
            index,
            store,
        }
    }

    fn mode(&self) -> ExecutionMode {
        if self.settings.sequential {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Concurrent(self.settings.max_workers)
        }
    }

    /// Run the whole pipeline. The store is only written once every package
    /// has been resolved.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<RefreshReport> {
        let modules = self.modules.modules();
        let extractor =
            MetadataExtractor::new(self.runtime, &self.interpreter.sys_path, &modules);
        let inventory = CatalogBuilder::new(extractor).build(self.source)?;

        let tracked = inventory.tracked(&PackageFilter::from_settings(self.settings));
        info!(
            "Tracking {} of {} installed distributions",
            tracked.len(),
            inventory.len()
        );

        let consolidated = Consolidator::new(
            &self.interpreter.markers,
            &self.settings.custom_requirements,
        )
        .consolidate(&inventory, &tracked);

        let resolved = ReleaseResolver::new(self.index, &self.interpreter.markers)
            .resolve_all(&tracked, &consolidated, self.mode())
            .await;

        // Dependents' homepages: index URL for resolved packages, local
        // metadata for the rest
        let mut homepages: BTreeMap<String, String> = inventory
            .iter()
            .map(|(key, record)| (key.clone(), record.homepage_url.clone()))
            .collect();
        for (key, package) in &resolved {
            homepages.insert(key.clone(), package.homepage_url.clone());
        }

        let now = Utc::now();
        let fresh: Vec<StoredDistribution> = resolved
            .iter()
            .map(|(key, package)| {
                StoredDistribution::from_resolved(package, consolidated.get(key), &homepages, now)
            })
            .collect();
        let outdated = fresh.iter().filter(|d| d.is_outdated == Some(true)).count();

        let summary = self.store.sync(fresh)?;
        info!(
            "Refreshed {} packages ({} outdated, {} removed)",
            summary.upserted, outdated, summary.removed
        );

        Ok(RefreshReport {
            discovered: inventory.len(),
            refreshed: summary.upserted,
            outdated,
            removed: summary.removed,
        })
    }
}
