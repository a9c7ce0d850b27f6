//! Settings loaded from the JSON configuration file.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::discovery::HostModule;
use crate::environment::MarkerValues;
use crate::runtime::Runtime;

pub const APP_DIR: &str = "pkgmon";
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Track every installed distribution rather than only those owning a
    /// host module.
    pub show_all_packages: bool,
    pub include_packages: Vec<String>,
    pub exclude_packages: Vec<String>,
    pub show_editable_packages: bool,

    pub notifications_enabled: bool,
    pub repeat_notifications: bool,

    /// Extra PEP 508 requirements applied on top of installed metadata.
    pub custom_requirements: Vec<String>,

    pub index_url: String,
    pub max_workers: usize,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub sequential: bool,

    pub python: String,
    pub site_packages: Vec<PathBuf>,
    pub sys_path: Vec<PathBuf>,
    pub environment: Option<MarkerValues>,
    pub modules: Vec<HostModule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_all_packages: true,
            include_packages: Vec::new(),
            exclude_packages: Vec::new(),
            show_editable_packages: false,
            notifications_enabled: false,
            repeat_notifications: false,
            custom_requirements: Vec::new(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            max_workers: 30,
            connect_timeout_secs: 5,
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
            sequential: false,
            python: "python3".to_string(),
            site_packages: Vec::new(),
            sys_path: Vec::new(),
            environment: None,
            modules: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when `path`
    /// is `None`.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path(runtime) {
                Some(path) if runtime.exists(&path) => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading configuration from {:?}", path);
        let content = runtime
            .read_to_string(&path)
            .with_context(|| format!("Failed to read configuration {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))
    }

    pub fn default_path<R: Runtime>(runtime: &R) -> Option<PathBuf> {
        runtime
            .config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.show_all_packages);
        assert!(!settings.show_editable_packages);
        assert_eq!(settings.index_url, "https://pypi.org/pypi");
        assert_eq!(settings.max_workers, 30);
        assert_eq!(settings.python, "python3");
        assert!(settings.environment.is_none());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(Path::new("/etc/pkgmon.json")))
            .returning(|_| {
                Ok(r#"{
                    "show_all_packages": false,
                    "exclude_packages": ["pip"],
                    "modules": [{"name": "web", "file": "/app/web/__init__.py"}],
                    "environment": {"python_version": "3.11"}
                }"#
                .to_string())
            });

        let settings = Settings::load(&runtime, Some(Path::new("/etc/pkgmon.json"))).unwrap();

        assert!(!settings.show_all_packages);
        assert_eq!(settings.exclude_packages, vec!["pip"]);
        assert_eq!(settings.modules[0].name, "web");
        assert_eq!(
            settings.environment.unwrap().python_version.as_deref(),
            Some("3.11")
        );
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn test_load_missing_default_file_yields_defaults() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_config_dir()
            .returning(|| Some(PathBuf::from("/home/u/.config")));
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/home/u/.config/pkgmon/config.json")))
            .returning(|_| false);

        let settings = Settings::load(&runtime, None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_explicit_missing_file_is_an_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Err(anyhow::anyhow!("No such file")));

        let err = Settings::load(&runtime, Some(Path::new("/nope.json"))).unwrap_err();
        assert!(err.to_string().contains("/nope.json"));
    }

    #[test]
    fn test_load_invalid_json_is_an_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{ not json".to_string()));

        assert!(Settings::load(&runtime, Some(Path::new("/bad.json"))).is_err());
    }
}
