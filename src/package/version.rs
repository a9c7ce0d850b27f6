//! PEP 440 helpers.
//!
//! Parsing is delegated to `pep440_rs`; this module adds the policies the
//! monitor needs on top of it: what counts as a canonical version string,
//! when an installed version is a pre-release, and how a list of specifiers
//! is intersected.

use pep440_rs::{Version, VersionSpecifier, VersionSpecifiers};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A version specifier that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version specifier {specifier:?}: {reason}")]
pub struct SpecifierError {
    pub specifier: String,
    pub reason: String,
}

/// Parse a version leniently (surrounding whitespace allowed, any spelling
/// PEP 440 normalizes).
pub fn parse_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Version::from_str(raw).ok()
}

/// Parse a version only if `raw` is already in normalized form.
///
/// `"1.0.0"` and `"2.1rc1"` pass; `"1.0.0-alpha1"`, `"v1.0"` and legacy
/// strings such as `"2004d"` do not.
pub fn parse_canonical(raw: &str) -> Option<Version> {
    let version = Version::from_str(raw).ok()?;
    (version.to_string() == raw).then_some(version)
}

/// Alpha, beta, release candidate or dev release.
pub fn is_prerelease(version: &Version) -> bool {
    version.any_prerelease()
}

/// Whether an installed version string denotes a pre-release.
///
/// Non-canonical strings are never treated as pre-releases.
pub fn is_installed_prerelease(current: &str) -> bool {
    parse_canonical(current).is_some_and(|v| is_prerelease(&v))
}

/// `Some(latest > current)` when both parse, `None` otherwise.
pub fn is_outdated(current: &str, latest: &str) -> Option<bool> {
    let current = parse_version(current)?;
    let latest = parse_version(latest)?;
    Some(current < latest)
}

/// Conjunction of version specifiers (`>=1.0,<2.0`).
///
/// An empty set matches every version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierSet(Vec<VersionSpecifier>);

impl SpecifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionSpecifier> {
        self.0.iter()
    }

    /// True when `version` satisfies every specifier.
    pub fn contains(&self, version: &Version) -> bool {
        self.0.iter().all(|spec| spec.contains(version))
    }

    /// AND another set into this one. Duplicates are kept once.
    pub fn intersect(&mut self, other: &SpecifierSet) {
        for spec in &other.0 {
            if !self.0.contains(spec) {
                self.0.push(spec.clone());
            }
        }
    }

    /// Specifiers rendered one per entry, e.g. `[">=1.0", "<2.0"]`.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl FromStr for SpecifierSet {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::new());
        }

        let mut specifiers = Vec::new();
        for part in s.split(',') {
            // Whitespace is insignificant inside a specifier ("> = 1.0" is not
            // valid, but ">= 1.0" is)
            let compact: String = part.chars().filter(|c| !c.is_whitespace()).collect();
            // Empty parts (">=3.6,") are dropped
            if compact.is_empty() {
                continue;
            }
            let spec = VersionSpecifier::from_str(&compact).map_err(|e| SpecifierError {
                specifier: part.trim().to_string(),
                reason: e.to_string(),
            })?;
            specifiers.push(spec);
        }

        Ok(Self(specifiers))
    }
}

impl From<&VersionSpecifiers> for SpecifierSet {
    fn from(specifiers: &VersionSpecifiers) -> Self {
        Self(specifiers.iter().cloned().collect())
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.to_strings();
        write!(f, "{}", rendered.join(","))
    }
}
