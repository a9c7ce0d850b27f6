//! PEP 508 dependency specifications (`Requires-Dist` values).
//!
//! Parsing and marker evaluation are done by `pep508_rs`; a [`Requirement`]
//! keeps the parts the consolidator needs.

use pep508_rs::{MarkerEnvironment, MarkerTree, VersionOrUrl};
use std::str::FromStr;
use thiserror::Error;

use super::version::SpecifierSet;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid requirement {requirement:?}: {reason}")]
pub struct RequirementError {
    pub requirement: String,
    pub reason: String,
}

/// One parsed dependency. URL requirements carry no specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Canonical (PEP 503) name of the target.
    pub name: String,
    pub specifiers: SpecifierSet,
    pub marker: MarkerTree,
}

impl Requirement {
    pub fn canonical_name(&self) -> String {
        self.name.clone()
    }

    /// Whether this requirement applies in `env`, with no extras active.
    ///
    /// Requirements without a marker always apply. When the environment is
    /// unknown, a marker cannot be evaluated and the requirement does not
    /// apply.
    pub fn applies_to(&self, env: Option<&MarkerEnvironment>) -> bool {
        if self.marker.is_true() {
            return true;
        }
        env.is_some_and(|env| self.marker.evaluate(env, &[]))
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = s
            .trim()
            .parse::<pep508_rs::Requirement>()
            .map_err(|e| RequirementError {
                requirement: s.to_string(),
                reason: e.to_string(),
            })?;

        let specifiers = match &parsed.version_or_url {
            Some(VersionOrUrl::VersionSpecifier(specifiers)) => SpecifierSet::from(specifiers),
            Some(VersionOrUrl::Url(_)) | None => SpecifierSet::new(),
        };

        Ok(Requirement {
            name: parsed.name.to_string(),
            specifiers,
            marker: parsed.marker,
        })
    }
}
