//! Normalizing a [`RawDistribution`] into a [`DistributionRecord`].

use log::debug;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::name::canonicalize_name;
use super::requirement::Requirement;
use crate::discovery::{HostModule, RawDistribution};
use crate::runtime::Runtime;

/// An installed distribution, normalized for tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRecord {
    /// Display name as declared in metadata.
    pub name: String,
    pub current_version: String,
    pub is_editable: bool,
    pub summary: String,
    pub homepage_url: String,
    pub requirements: Vec<Requirement>,
    /// Host modules whose `__init__.py` this distribution ships.
    pub owning_modules: BTreeSet<String>,
}

impl DistributionRecord {
    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.name)
    }
}

#[derive(Deserialize)]
struct DirectUrl {
    #[serde(default)]
    dir_info: Option<DirInfo>,
}

#[derive(Deserialize)]
struct DirInfo {
    #[serde(default)]
    editable: Option<bool>,
}

pub struct MetadataExtractor<'a, R: Runtime> {
    runtime: &'a R,
    sys_path: &'a [PathBuf],
    modules: &'a [HostModule],
}

impl<'a, R: Runtime> MetadataExtractor<'a, R> {
    pub fn new(runtime: &'a R, sys_path: &'a [PathBuf], modules: &'a [HostModule]) -> Self {
        Self {
            runtime,
            sys_path,
            modules,
        }
    }

    /// Returns `None` for a distribution without a name.
    pub fn extract(&self, raw: &RawDistribution) -> Option<DistributionRecord> {
        let name = raw.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;

        Some(DistributionRecord {
            name: name.to_string(),
            current_version: raw.version.trim().to_string(),
            is_editable: self.is_editable(name, raw),
            summary: raw.summary.clone().unwrap_or_default(),
            homepage_url: homepage(raw),
            requirements: parse_requirements(name, &raw.requires_dist),
            owning_modules: self.owning_modules(&raw.files),
        })
    }

    fn is_editable(&self, name: &str, raw: &RawDistribution) -> bool {
        let direct = raw
            .direct_url
            .as_deref()
            .and_then(|content| serde_json::from_str::<DirectUrl>(content).ok())
            .and_then(|url| url.dir_info)
            .and_then(|info| info.editable)
            .unwrap_or(false);
        if direct {
            return true;
        }

        let egg_link = format!("{}.egg-link", name);
        self.sys_path
            .iter()
            .any(|entry| self.runtime.is_file(&entry.join(&egg_link)))
    }

    fn owning_modules(&self, files: &[String]) -> BTreeSet<String> {
        let mut owners = BTreeSet::new();
        for file in files {
            let file = file.replace('\\', "/");
            if !file.ends_with("__init__.py") {
                continue;
            }
            let suffix = format!("/{}", file);
            if let Some(module) = self
                .modules
                .iter()
                .find(|m| m.file.replace('\\', "/").ends_with(&suffix))
            {
                owners.insert(module.name.clone());
            }
        }
        owners
    }
}

fn parse_requirements(name: &str, requires_dist: &[String]) -> Vec<Requirement> {
    requires_dist
        .iter()
        .filter_map(|raw| match raw.parse::<Requirement>() {
            Ok(req) => Some(req),
            Err(e) => {
                debug!("{}: ignoring requirement {:?}: {}", name, raw, e);
                None
            }
        })
        .collect()
}

fn homepage(raw: &RawDistribution) -> String {
    if let Some(home) = raw.home_page.as_deref().map(str::trim) {
        if !home.is_empty() && !home.eq_ignore_ascii_case("UNKNOWN") {
            return home.to_string();
        }
    }

    raw.project_urls
        .iter()
        .filter_map(|entry| entry.split_once(','))
        .find(|(label, _)| label.trim().eq_ignore_ascii_case("homepage"))
        .map(|(_, url)| url.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::path::Path;

    fn raw(name: &str) -> RawDistribution {
        RawDistribution {
            name: Some(name.to_string()),
            version: "1.0".to_string(),
            ..Default::default()
        }
    }

    fn no_egg_links() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_file().returning(|_| false);
        runtime
    }

    #[test]
    fn test_extract_skips_nameless_distribution() {
        let runtime = no_egg_links();
        let extractor = MetadataExtractor::new(&runtime, &[], &[]);

        let nameless = RawDistribution {
            name: None,
            ..Default::default()
        };
        assert!(extractor.extract(&nameless).is_none());
        assert!(extractor.extract(&raw("  ")).is_none());
    }

    #[test]
    fn test_extract_drops_unparseable_requirements() {
        let runtime = no_egg_links();
        let extractor = MetadataExtractor::new(&runtime, &[], &[]);

        let mut dist = raw("Django");
        dist.requires_dist = vec![
            "asgiref (<4,>=3.6.0)".into(),
            "broken >=>= 1".into(),
            "sqlparse>=0.3.1".into(),
        ];
        let record = extractor.extract(&dist).unwrap();

        assert_eq!(record.canonical_name(), "django");
        let names: Vec<_> = record.requirements.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["asgiref", "sqlparse"]);
    }

    #[test]
    fn test_editable_from_direct_url() {
        let runtime = no_egg_links();
        let extractor = MetadataExtractor::new(&runtime, &[], &[]);

        let mut dist = raw("mine");
        dist.direct_url = Some(r#"{"url": "file:///src", "dir_info": {"editable": true}}"#.into());
        assert!(extractor.extract(&dist).unwrap().is_editable);

        dist.direct_url = Some(r#"{"url": "file:///src", "dir_info": {}}"#.into());
        assert!(!extractor.extract(&dist).unwrap().is_editable);

        dist.direct_url = Some("not json".into());
        assert!(!extractor.extract(&dist).unwrap().is_editable);
    }

    #[test]
    fn test_editable_from_egg_link() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_is_file()
            .returning(|p| p == Path::new("/dev/src/legacy.egg-link"));
        let sys_path = vec![PathBuf::from("/usr/lib/python3"), PathBuf::from("/dev/src")];
        let extractor = MetadataExtractor::new(&runtime, &sys_path, &[]);

        assert!(extractor.extract(&raw("legacy")).unwrap().is_editable);
        assert!(!extractor.extract(&raw("other")).unwrap().is_editable);
    }

    #[test]
    fn test_owning_modules_by_path_suffix() {
        let runtime = no_egg_links();
        let modules = vec![
            HostModule {
                name: "blog".into(),
                file: "/venv/lib/python3.11/site-packages/blog/__init__.py".into(),
            },
            HostModule {
                name: "shop".into(),
                file: "/srv/app/shop/__init__.py".into(),
            },
            HostModule {
                name: "myblog".into(),
                file: "/srv/app/myblog/__init__.py".into(),
            },
        ];
        let extractor = MetadataExtractor::new(&runtime, &[], &modules);

        let mut dist = raw("django-blog");
        dist.files = vec![
            "blog/__init__.py".into(),
            "blog/models.py".into(),
            "blog/templatetags/__init__.py".into(),
        ];
        let record = extractor.extract(&dist).unwrap();

        assert_eq!(record.owning_modules, BTreeSet::from(["blog".to_string()]));
    }

    #[test]
    fn test_homepage_fallback_to_project_url() {
        let runtime = no_egg_links();
        let extractor = MetadataExtractor::new(&runtime, &[], &[]);

        let mut dist = raw("pkg");
        dist.project_urls = vec![
            "Source, https://github.com/o/pkg".into(),
            "homepage, https://pkg.example".into(),
        ];
        assert_eq!(extractor.extract(&dist).unwrap().homepage_url, "https://pkg.example");

        dist.home_page = Some("https://home.example".into());
        assert_eq!(extractor.extract(&dist).unwrap().homepage_url, "https://home.example");
    }
}
