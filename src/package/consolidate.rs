//! Merging every applicable requirement on a tracked package into one
//! specifier set.

use log::{debug, warn};
use pep508_rs::MarkerEnvironment;
use std::collections::BTreeMap;

use super::catalog::Catalog;
use super::requirement::Requirement;
use super::version::SpecifierSet;
use crate::environment::MarkerValues;

/// A package that constrains a tracked package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    /// Display name of the dependent distribution.
    pub name: String,
    pub specifiers: SpecifierSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidatedRequirement {
    /// Every applicable specifier on the target, ANDed.
    pub specifiers: SpecifierSet,
    /// Keyed by the dependent's canonical name.
    pub dependents: BTreeMap<String, Dependent>,
}

pub type Consolidated = BTreeMap<String, ConsolidatedRequirement>;

pub struct Consolidator {
    env: Option<MarkerEnvironment>,
    custom: Vec<Requirement>,
}

impl Consolidator {
    /// `custom_requirements` that fail to parse are logged and ignored.
    ///
    /// When `markers` cannot form a complete environment, only requirements
    /// without a marker apply.
    pub fn new(markers: &MarkerValues, custom_requirements: &[String]) -> Self {
        let env = markers.to_environment();
        if env.is_none() {
            warn!("Python version unknown, conditional requirements are ignored");
        }

        let custom = custom_requirements
            .iter()
            .filter_map(|raw| match raw.parse::<Requirement>() {
                Ok(req) => Some(req),
                Err(e) => {
                    warn!("Ignoring custom requirement {:?}: {}", raw, e);
                    None
                }
            })
            .collect();
        Self { env, custom }
    }

    fn applies(&self, owner: &str, req: &Requirement) -> bool {
        let applies = req.applies_to(self.env.as_ref());
        if !applies {
            debug!("{}: requirement on {} not applicable", owner, req.name);
        }
        applies
    }

    /// Collect constraints on every package in `tracked`, scanning the
    /// requirements of every package in `inventory`.
    #[tracing::instrument(skip_all)]
    pub fn consolidate(&self, inventory: &Catalog, tracked: &Catalog) -> Consolidated {
        let mut result = Consolidated::new();

        for (dependent_key, record) in inventory.iter() {
            for req in &record.requirements {
                let target = req.canonical_name();
                if !tracked.contains(&target) || !self.applies(&record.name, req) {
                    continue;
                }

                let entry = result.entry(target).or_default();
                entry.specifiers.intersect(&req.specifiers);
                entry
                    .dependents
                    .entry(dependent_key.clone())
                    .or_insert_with(|| Dependent {
                        name: record.name.clone(),
                        specifiers: SpecifierSet::new(),
                    })
                    .specifiers
                    .intersect(&req.specifiers);
            }
        }

        for req in &self.custom {
            let target = req.canonical_name();
            if !tracked.contains(&target) || !self.applies("custom", req) {
                continue;
            }
            result
                .entry(target)
                .or_default()
                .specifiers
                .intersect(&req.specifiers);
        }

        debug!("Consolidated requirements for {} packages", result.len());
        result
    }
}
