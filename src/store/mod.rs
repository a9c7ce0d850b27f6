//! Persisted refresh results.
//!
//! Each refresh replaces the stored set wholesale ([`StateFile::mirror`]);
//! only `latest_notified_version` survives from one refresh to the next.

mod json;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use json::JsonStore;

use crate::package::{ConsolidatedRequirement, canonicalize_name};
use crate::resolver::ResolvedPackage;

/// A package constraining a stored distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedBy {
    pub name: String,
    pub homepage_url: String,
    /// Specifiers it imposes, e.g. `["<2.0.0"]`.
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDistribution {
    pub name: String,
    pub description: String,
    /// Host modules shipped by this distribution.
    pub apps: Vec<String>,
    pub used_by: Vec<UsedBy>,
    pub installed_version: String,
    /// Empty when unknown.
    pub latest_version: String,
    pub is_outdated: Option<bool>,
    pub is_editable: bool,
    pub website_url: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub latest_notified_version: Option<String>,
}

impl StoredDistribution {
    /// Build the stored form of `package`.
    ///
    /// `homepages` maps canonical names to homepage URLs and is used to
    /// fill in the homepage of each dependent.
    pub fn from_resolved(
        package: &ResolvedPackage,
        constraint: Option<&ConsolidatedRequirement>,
        homepages: &BTreeMap<String, String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let record = &package.record;

        let mut apps: Vec<String> = record.owning_modules.iter().cloned().collect();
        apps.sort_by_key(|app| app.to_lowercase());

        let mut used_by: Vec<UsedBy> = constraint
            .map(|c| {
                c.dependents
                    .iter()
                    .map(|(key, dependent)| UsedBy {
                        name: dependent.name.clone(),
                        homepage_url: homepages.get(key).cloned().unwrap_or_default(),
                        requirements: dependent.specifiers.to_strings(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        used_by.sort_by_key(|u| u.name.to_lowercase());

        Self {
            name: record.name.clone(),
            description: record.summary.clone(),
            apps,
            used_by,
            installed_version: record.current_version.clone(),
            latest_version: package.latest_version.clone(),
            is_outdated: package.is_outdated,
            is_editable: record.is_editable,
            website_url: package.homepage_url.clone(),
            updated_at,
            latest_notified_version: None,
        }
    }

    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub upserted: usize,
    pub removed: usize,
}

/// Everything the store holds, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub distributions: BTreeMap<String, StoredDistribution>,
}

impl StateFile {
    /// Replace the stored set with `fresh`: every entry is upserted and
    /// every stored entry absent from `fresh` is deleted.
    pub fn mirror(&mut self, fresh: Vec<StoredDistribution>) -> SyncSummary {
        let mut previous = std::mem::take(&mut self.distributions);
        let upserted = fresh.len();

        for mut dist in fresh {
            let key = dist.canonical_name();
            if let Some(old) = previous.remove(&key) {
                dist.latest_notified_version = old.latest_notified_version;
            }
            self.distributions.insert(key, dist);
        }

        SyncSummary {
            upserted,
            removed: previous.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    /// Stored entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &StoredDistribution> {
        self.distributions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StoredDistribution> {
        self.distributions.values_mut()
    }
}
