use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use std::path::PathBuf;

use super::MarkerValues;
use crate::config::Settings;
use crate::runtime::Runtime;

/// Script run by the interpreter to report its environment as JSON.
pub const PROBE_SCRIPT: &str = r#"
import json, os, platform, site, sys

def fmt(info):
    version = "{0.major}.{0.minor}.{0.micro}".format(info)
    if info.releaselevel != "final":
        version += info.releaselevel[0] + str(info.serial)
    return version

try:
    site_packages = list(site.getsitepackages())
except AttributeError:
    site_packages = []
user_site = getattr(site, "ENABLE_USER_SITE", False) and site.getusersitepackages()
if user_site:
    site_packages.append(user_site)

print(json.dumps({
    "markers": {
        "implementation_name": sys.implementation.name,
        "implementation_version": fmt(sys.implementation.version),
        "os_name": os.name,
        "platform_machine": platform.machine(),
        "platform_python_implementation": platform.python_implementation(),
        "platform_release": platform.release(),
        "platform_system": platform.system(),
        "platform_version": platform.version(),
        "python_full_version": platform.python_version(),
        "python_version": ".".join(platform.python_version_tuple()[:2]),
        "sys_platform": sys.platform,
    },
    "sys_path": [p for p in sys.path if p],
    "site_packages": site_packages,
}))
"#;

/// The interpreter whose installed packages are monitored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Interpreter {
    pub markers: MarkerValues,
    /// Module search path, scanned for legacy `.egg-link` files.
    pub sys_path: Vec<PathBuf>,
    /// Directories holding `*.dist-info` metadata.
    pub site_packages: Vec<PathBuf>,
}

impl Interpreter {
    /// Build the interpreter description from settings, probing the
    /// configured interpreter only when settings leave something out.
    ///
    /// Configured values always win over probed ones.
    #[tracing::instrument(skip(runtime, settings))]
    pub fn resolve<R: Runtime>(runtime: &R, settings: &Settings) -> Result<Self> {
        let mut interpreter = match (&settings.environment, settings.site_packages.is_empty()) {
            (Some(markers), false) => {
                debug!("Using configured interpreter environment");
                let mut markers = markers.clone();
                markers.merge_missing(MarkerValues::host());
                Interpreter {
                    markers,
                    ..Default::default()
                }
            }
            _ => {
                let mut probed = Self::probe(runtime, &settings.python)?;
                if let Some(configured) = &settings.environment {
                    let mut markers = configured.clone();
                    markers.merge_missing(probed.markers);
                    probed.markers = markers;
                }
                probed
            }
        };

        if !settings.site_packages.is_empty() {
            interpreter.site_packages = settings.site_packages.clone();
        }
        if !settings.sys_path.is_empty() {
            interpreter.sys_path = settings.sys_path.clone();
        }
        if interpreter.sys_path.is_empty() {
            interpreter.sys_path = interpreter.site_packages.clone();
        }

        Ok(interpreter)
    }

    /// Run `python` once and parse the report printed by [`PROBE_SCRIPT`].
    #[tracing::instrument(skip(runtime))]
    pub fn probe<R: Runtime>(runtime: &R, python: &str) -> Result<Self> {
        info!("Probing interpreter {}", python);

        let output = runtime
            .run_command(python, &["-c".to_string(), PROBE_SCRIPT.to_string()])
            .with_context(|| format!("Failed to probe Python interpreter {:?}", python))?;

        serde_json::from_str(output.trim())
            .with_context(|| format!("Unexpected probe output from {:?}", python))
    }
}
