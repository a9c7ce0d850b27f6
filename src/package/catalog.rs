//! The set of installed distributions, keyed by canonical name.

use anyhow::Result;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

use super::metadata::{DistributionRecord, MetadataExtractor};
use super::name::canonicalize_name;
use crate::config::Settings;
use crate::discovery::DistributionSource;
use crate::runtime::Runtime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: BTreeMap<String, DistributionRecord>,
}

impl Catalog {
    /// Insert a record unless its canonical name is already present.
    /// Returns whether it was inserted.
    pub fn insert(&mut self, record: DistributionRecord) -> bool {
        let key = record.canonical_name();
        if let Some(existing) = self.records.get(&key) {
            warn!(
                "Duplicate distribution {} {} ignored, keeping {} {}",
                record.name, record.current_version, existing.name, existing.current_version
            );
            return false;
        }
        self.records.insert(key, record);
        true
    }

    pub fn get(&self, canonical_name: &str) -> Option<&DistributionRecord> {
        self.records.get(canonical_name)
    }

    pub fn contains(&self, canonical_name: &str) -> bool {
        self.records.contains_key(canonical_name)
    }

    /// Records in canonical-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DistributionRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The subset of records `filter` tracks.
    pub fn tracked(&self, filter: &PackageFilter) -> Catalog {
        let records = self
            .records
            .iter()
            .filter(|(_, record)| filter.tracks(record))
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        Catalog { records }
    }
}

impl FromIterator<DistributionRecord> for Catalog {
    fn from_iter<T: IntoIterator<Item = DistributionRecord>>(iter: T) -> Self {
        let mut catalog = Catalog::default();
        for record in iter {
            catalog.insert(record);
        }
        catalog
    }
}

/// Selection rules from settings, applied both when choosing which
/// distributions to track and when choosing which stored ones to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFilter {
    pub show_all: bool,
    pub show_editable: bool,
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl PackageFilter {
    pub fn new(
        show_all: bool,
        show_editable: bool,
        include: &[String],
        exclude: &[String],
    ) -> Self {
        Self {
            show_all,
            show_editable,
            include: include.iter().map(|n| canonicalize_name(n)).collect(),
            exclude: exclude.iter().map(|n| canonicalize_name(n)).collect(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.show_all_packages,
            settings.show_editable_packages,
            &settings.include_packages,
            &settings.exclude_packages,
        )
    }

    /// Filter that lets everything through.
    pub fn everything() -> Self {
        Self::new(true, true, &[], &[])
    }

    /// Whether a distribution is tracked at all.
    ///
    /// With `show_all` every distribution is tracked and the visibility rules
    /// apply only when reporting.
    pub fn tracks(&self, record: &DistributionRecord) -> bool {
        self.show_all
            || self.is_visible(
                &record.name,
                !record.owning_modules.is_empty(),
                record.is_editable,
            )
    }

    /// Whether a package is shown to the user.
    pub fn is_visible(&self, name: &str, has_apps: bool, is_editable: bool) -> bool {
        let name = canonicalize_name(name);
        let selected = self.show_all || has_apps || self.include.contains(&name);
        selected && !self.exclude.contains(&name) && (self.show_editable || !is_editable)
    }
}

/// Builds the full inventory of installed distributions.
pub struct CatalogBuilder<'a, R: Runtime> {
    extractor: MetadataExtractor<'a, R>,
}

impl<'a, R: Runtime> CatalogBuilder<'a, R> {
    pub fn new(extractor: MetadataExtractor<'a, R>) -> Self {
        Self { extractor }
    }

    /// Every named distribution the source reports.
    #[tracing::instrument(skip(self, source))]
    pub fn build(&self, source: &dyn DistributionSource) -> Result<Catalog> {
        let raws = source.distributions()?;
        let total = raws.len();

        let catalog: Catalog = raws
            .iter()
            .filter_map(|raw| {
                let record = self.extractor.extract(raw);
                if record.is_none() {
                    debug!("Skipping distribution without a name ({:?})", raw.version);
                }
                record
            })
            .collect();

        debug!("Catalog holds {} of {} distributions", catalog.len(), total);
        Ok(catalog)
    }
}
