use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::{CoreMetadata, DistributionSource, RawDistribution, parse_record};
use crate::runtime::Runtime;

/// Reads installed distributions from `*.dist-info` directories.
pub struct SitePackages<'a, R: Runtime> {
    runtime: &'a R,
    directories: Vec<PathBuf>,
}

impl<'a, R: Runtime> SitePackages<'a, R> {
    pub fn new(runtime: &'a R, directories: Vec<PathBuf>) -> Self {
        Self {
            runtime,
            directories,
        }
    }

    fn scan_directory(&self, dir: &Path, found: &mut Vec<RawDistribution>) -> Result<()> {
        if !self.runtime.is_dir(dir) {
            warn!("Site-packages directory {:?} does not exist, skipping", dir);
            return Ok(());
        }

        let entries = self
            .runtime
            .read_dir(dir)
            .with_context(|| format!("Failed to list {:?}", dir))?;

        for entry in entries {
            let is_dist_info = entry
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".dist-info"));
            if !is_dist_info || !self.runtime.is_dir(&entry) {
                continue;
            }

            match self.read_dist_info(&entry) {
                Ok(dist) => found.push(dist),
                Err(e) => warn!("Skipping {:?}: {:#}", entry, e),
            }
        }

        Ok(())
    }

    fn read_dist_info(&self, dist_info: &Path) -> Result<RawDistribution> {
        let metadata_path = dist_info.join("METADATA");
        let content = self
            .runtime
            .read_to_string(&metadata_path)
            .with_context(|| format!("Failed to read {:?}", metadata_path))?;
        let metadata = CoreMetadata::parse(&content);

        let files = self
            .read_optional(&dist_info.join("RECORD"))
            .map(|record| parse_record(&record))
            .unwrap_or_default();

        let direct_url = self.read_optional(&dist_info.join("direct_url.json"));

        Ok(RawDistribution {
            name: metadata.get("Name").map(str::to_string),
            version: metadata.get("Version").unwrap_or_default().to_string(),
            summary: metadata.get("Summary").map(str::to_string),
            home_page: metadata.get("Home-page").map(str::to_string),
            project_urls: metadata.get_all("Project-URL"),
            requires_dist: metadata.get_all("Requires-Dist"),
            files,
            direct_url,
        })
    }

    fn read_optional(&self, path: &Path) -> Option<String> {
        if !self.runtime.is_file(path) {
            return None;
        }
        match self.runtime.read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Ignoring unreadable {:?}: {:#}", path, e);
                None
            }
        }
    }
}

impl<R: Runtime> DistributionSource for SitePackages<'_, R> {
    #[tracing::instrument(skip(self))]
    fn distributions(&self) -> Result<Vec<RawDistribution>> {
        let mut found = Vec::new();
        for dir in &self.directories {
            debug!("Scanning {:?}", dir);
            self.scan_directory(dir, &mut found)?;
        }
        debug!("Found {} installed distributions", found.len());
        Ok(found)
    }
}
