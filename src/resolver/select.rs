use log::debug;
use pep440_rs::Version;

use crate::index::ProjectData;
use crate::package::version::{is_installed_prerelease, is_prerelease, parse_canonical};
use crate::package::SpecifierSet;

/// Pick the greatest release of `project` that may be installed.
///
/// A release is skipped when its last artifact is yanked or excludes
/// `python`, when its version string is not canonical, when it is a
/// pre-release and `current` is not, or when it falls outside `specifiers`.
/// Releases without artifacts stay candidates.
pub fn select_latest(
    name: &str,
    current: &str,
    specifiers: &SpecifierSet,
    project: &ProjectData,
    python: Option<&Version>,
) -> Option<String> {
    let allow_prereleases = is_installed_prerelease(current);
    let mut best: Option<(Version, &str)> = None;

    for (raw, files) in &project.releases {
        if let Some(last) = files.last() {
            if last.is_yanked() {
                continue;
            }
            if !python_compatible(name, raw, last.requires_python.as_deref(), python) {
                continue;
            }
        }

        let Some(version) = parse_canonical(raw) else {
            debug!("{}: skipping non-canonical release {:?}", name, raw);
            continue;
        };
        if is_prerelease(&version) && !allow_prereleases {
            continue;
        }
        if !specifiers.contains(&version) {
            continue;
        }

        if best.as_ref().is_none_or(|(v, _)| version > *v) {
            best = Some((version, raw.as_str()));
        }
    }

    best.map(|(_, raw)| raw.to_string())
}

fn python_compatible(
    name: &str,
    release: &str,
    requires_python: Option<&str>,
    python: Option<&Version>,
) -> bool {
    let Some(requires) = requires_python.map(str::trim).filter(|r| !r.is_empty()) else {
        return true;
    };
    let Some(python) = python else {
        return true;
    };

    match requires.parse::<SpecifierSet>() {
        Ok(set) => set.contains(python),
        Err(e) => {
            debug!("{} {}: skipping release, {}", name, release, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ReleaseFile;
    use std::str::FromStr;

    fn file(yanked: bool, requires_python: Option<&str>) -> ReleaseFile {
        ReleaseFile {
            yanked: Some(yanked),
            requires_python: requires_python.map(str::to_string),
        }
    }

    fn project(releases: &[(&str, Vec<ReleaseFile>)]) -> ProjectData {
        ProjectData {
            info: None,
            releases: releases
                .iter()
                .map(|(v, files)| (v.to_string(), files.clone()))
                .collect(),
        }
    }

    fn py() -> Version {
        Version::from_str("3.11.4").unwrap()
    }

    fn select(current: &str, specs: &str, project: &ProjectData) -> Option<String> {
        let specs: SpecifierSet = specs.parse().unwrap();
        select_latest("pkg", current, &specs, project, Some(&py()))
    }

    #[test]
    fn test_stable_install_ignores_prereleases() {
        let p = project(&[
            ("1.0.0", vec![file(false, None)]),
            ("1.1.0a1", vec![file(false, None)]),
        ]);
        assert_eq!(select("1.0.0", "", &p).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_prerelease_install_considers_prereleases() {
        let p = project(&[
            ("1.0.0a1", vec![file(false, None)]),
            ("1.0.0a2", vec![file(false, None)]),
        ]);
        assert_eq!(select("1.0.0a1", "", &p).as_deref(), Some("1.0.0a2"));
    }

    #[test]
    fn test_non_canonical_prerelease_install_is_not_a_prerelease() {
        let p = project(&[
            ("1.0.0", vec![file(false, None)]),
            ("1.0.1rc1", vec![file(false, None)]),
        ]);
        assert_eq!(select("1.0.0-rc1", "", &p).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_consolidated_specifiers_hold() {
        let p = project(&[
            ("1.5.0", vec![file(false, None)]),
            ("2.1.0", vec![file(false, None)]),
        ]);
        assert_eq!(
            select("1.2.0", "<2.0.0,>1.0.0", &p).as_deref(),
            Some("1.5.0")
        );
    }

    #[test]
    fn test_yanked_judged_by_last_artifact() {
        let p = project(&[
            ("1.0.0", vec![file(false, None)]),
            ("1.1.0", vec![file(false, None), file(true, None)]),
            ("1.2.0", vec![file(true, None), file(false, None)]),
        ]);
        assert_eq!(select("1.0.0", "", &p).as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_requires_python_excludes_release() {
        let p = project(&[
            ("1.0.0", vec![file(false, Some(">=3.7"))]),
            ("2.0.0", vec![file(false, Some(">=3.12"))]),
            ("3.0.0", vec![file(false, Some(">=3.6.*.broken"))]),
        ]);
        assert_eq!(select("1.0.0", "", &p).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_requires_python_with_trailing_comma() {
        let p = project(&[
            ("1.0.0", vec![file(false, Some(">=3.6"))]),
            ("1.1.0", vec![file(false, Some(">=3.6,"))]),
            ("1.2.0", vec![file(false, Some(">=2.7, !=3.0.*,"))]),
        ]);
        assert_eq!(select("1.0.0", "", &p).as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_unknown_python_skips_requires_python_check() {
        let p = project(&[("2.0.0", vec![file(false, Some(">=3.12"))])]);
        let specs = SpecifierSet::new();
        assert_eq!(
            select_latest("pkg", "1.0", &specs, &p, None).as_deref(),
            Some("2.0.0")
        );
    }

    #[test]
    fn test_release_without_artifacts_is_a_candidate() {
        let p = project(&[("1.0.0", vec![file(false, None)]), ("1.1.0", vec![])]);
        assert_eq!(select("1.0.0", "", &p).as_deref(), Some("1.1.0"));
    }

    #[test]
    fn test_non_canonical_releases_are_skipped() {
        let p = project(&[
            ("1.0.0", vec![file(false, None)]),
            ("v2.0", vec![file(false, None)]),
            ("2004d", vec![file(false, None)]),
        ]);
        assert_eq!(select("1.0.0", "", &p).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_pep440_ordering_not_string_ordering() {
        let p = project(&[
            ("1.9.0", vec![file(false, None)]),
            ("1.10.0", vec![file(false, None)]),
        ]);
        assert_eq!(select("1.0", "", &p).as_deref(), Some("1.10.0"));
    }

    #[test]
    fn test_no_survivor() {
        let p = project(&[("2.1.0", vec![file(false, None)])]);
        assert_eq!(select("1.0", "<2", &p), None);
        assert_eq!(select("1.0", "", &project(&[])), None);
    }
}
