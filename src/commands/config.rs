use anyhow::{Result, anyhow};
use log::debug;
use std::path::PathBuf;

use crate::{config::Settings, runtime::Runtime, store::JsonStore};

/// Options shared by every subcommand, overriding the configuration file.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub index_url: Option<String>,
    pub python: Option<String>,
    pub site_packages: Vec<PathBuf>,
}

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub settings: Settings,
    pub state_path: PathBuf,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, options: GlobalOptions) -> Result<Self> {
        let mut settings = Settings::load(&runtime, options.config.as_deref())?;

        if let Some(index_url) = options.index_url {
            settings.index_url = index_url;
        }
        if let Some(python) = options.python {
            settings.python = python;
        }
        if !options.site_packages.is_empty() {
            settings.site_packages = options.site_packages;
        }

        let state_path = match options.state {
            Some(path) => path,
            None => JsonStore::default_path(&runtime)
                .ok_or_else(|| anyhow!("Cannot determine the data directory, use --state"))?,
        };
        debug!("Using state file {:?}", state_path);

        Ok(Self {
            runtime,
            settings,
            state_path,
        })
    }

    pub fn store(&self) -> JsonStore<'_, R> {
        JsonStore::new(&self.runtime, self.state_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::Path;

    #[test]
    fn test_cli_overrides_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(Path::new("/etc/pkgmon.json")))
            .returning(|_| {
                Ok(r#"{"index_url": "https://mirror/pypi", "python": "python3.9"}"#.to_string())
            });
        runtime
            .expect_data_dir()
            .returning(|| Some(PathBuf::from("/home/u/.local/share")));

        let config = Config::new(
            runtime,
            GlobalOptions {
                config: Some(PathBuf::from("/etc/pkgmon.json")),
                python: Some("/opt/python".into()),
                site_packages: vec![PathBuf::from("/site")],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.settings.index_url, "https://mirror/pypi");
        assert_eq!(config.settings.python, "/opt/python");
        assert_eq!(config.settings.site_packages, vec![PathBuf::from("/site")]);
        assert_eq!(
            config.state_path,
            PathBuf::from("/home/u/.local/share/pkgmon/state.json")
        );
    }

    #[test]
    fn test_explicit_state_path() {
        let mut runtime = MockRuntime::new();
        runtime.expect_config_dir().returning(|| None);

        let config = Config::new(
            runtime,
            GlobalOptions {
                state: Some(PathBuf::from("/tmp/state.json")),
                index_url: Some("http://localhost/pypi".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.state_path, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.settings.index_url, "http://localhost/pypi");
    }

    #[test]
    fn test_missing_data_dir_is_an_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_config_dir().returning(|| None);
        runtime.expect_data_dir().returning(|| None);

        assert!(Config::new(runtime, GlobalOptions::default()).is_err());
    }
}
