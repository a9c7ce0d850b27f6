//! The Python environment packages are checked against.
//!
//! - [`MarkerValues`] holds the PEP 508 marker variables, possibly
//!   incomplete, and converts them into a `pep508_rs` environment.
//! - [`Interpreter`] bundles them with the interpreter's module search path and
//!   site-packages directories, either taken from settings or probed by
//!   running the interpreter once.

mod probe;

use log::debug;
use pep440_rs::Version;
use pep508_rs::{MarkerEnvironment, MarkerEnvironmentBuilder};
use serde::{Deserialize, Serialize};

pub use probe::{Interpreter, PROBE_SCRIPT};

use crate::package::version::parse_version;

/// Values of the PEP 508 environment marker variables, as configured or
/// probed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerValues {
    pub implementation_name: Option<String>,
    pub implementation_version: Option<String>,
    pub os_name: Option<String>,
    pub platform_machine: Option<String>,
    pub platform_python_implementation: Option<String>,
    pub platform_release: Option<String>,
    pub platform_system: Option<String>,
    pub platform_version: Option<String>,
    pub python_full_version: Option<String>,
    pub python_version: Option<String>,
    pub sys_platform: Option<String>,
}

impl MarkerValues {
    /// The interpreter version used for `Requires-Python` checks: the
    /// `major.minor.micro` release only, so a `3.13.0rc1` interpreter
    /// satisfies `>=3.13`.
    ///
    /// Falls back to `python_version` when the full version is unknown.
    pub fn python_full_version(&self) -> Option<Version> {
        let version = self
            .python_full_version
            .as_deref()
            .or(self.python_version.as_deref())
            .and_then(parse_version)?;
        Some(Version::new(version.release().iter().take(3)))
    }

    /// The environment markers are evaluated against.
    ///
    /// Undefined string variables evaluate as empty strings. Without a
    /// Python version nothing can be evaluated and `None` is returned.
    pub fn to_environment(&self) -> Option<MarkerEnvironment> {
        let python_version = self.python_version.as_deref()?;
        let python_full_version = self.python_full_version.as_deref().unwrap_or(python_version);

        let builder = MarkerEnvironmentBuilder {
            implementation_name: self.implementation_name.as_deref().unwrap_or(""),
            implementation_version: self
                .implementation_version
                .as_deref()
                .unwrap_or(python_full_version),
            os_name: self.os_name.as_deref().unwrap_or(""),
            platform_machine: self.platform_machine.as_deref().unwrap_or(""),
            platform_python_implementation: self
                .platform_python_implementation
                .as_deref()
                .unwrap_or(""),
            platform_release: self.platform_release.as_deref().unwrap_or(""),
            platform_system: self.platform_system.as_deref().unwrap_or(""),
            platform_version: self.platform_version.as_deref().unwrap_or(""),
            python_full_version,
            python_version,
            sys_platform: self.sys_platform.as_deref().unwrap_or(""),
        };

        MarkerEnvironment::try_from(builder)
            .inspect_err(|e| debug!("Cannot evaluate markers: {}", e))
            .ok()
    }

    /// Fill every undefined variable from `other`.
    pub fn merge_missing(&mut self, other: MarkerValues) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.implementation_name, other.implementation_name);
        fill(&mut self.implementation_version, other.implementation_version);
        fill(&mut self.os_name, other.os_name);
        fill(&mut self.platform_machine, other.platform_machine);
        fill(
            &mut self.platform_python_implementation,
            other.platform_python_implementation,
        );
        fill(&mut self.platform_release, other.platform_release);
        fill(&mut self.platform_system, other.platform_system);
        fill(&mut self.platform_version, other.platform_version);
        fill(&mut self.python_full_version, other.python_full_version);
        fill(&mut self.python_version, other.python_version);
        fill(&mut self.sys_platform, other.sys_platform);
    }

    /// Platform variables derivable without an interpreter.
    ///
    /// Python-specific variables stay undefined.
    pub fn host() -> Self {
        let (os_name, sys_platform, platform_system) = match std::env::consts::OS {
            "linux" => ("posix", "linux", "Linux"),
            "macos" => ("posix", "darwin", "Darwin"),
            "windows" => ("nt", "win32", "Windows"),
            "freebsd" => ("posix", "freebsd", "FreeBSD"),
            other => ("posix", other, other),
        };

        let machine = match (std::env::consts::OS, std::env::consts::ARCH) {
            ("macos", "aarch64") => "arm64",
            ("windows", "x86_64") => "AMD64",
            (_, arch) => arch,
        };

        Self {
            os_name: Some(os_name.to_string()),
            sys_platform: Some(sys_platform.to_string()),
            platform_system: Some(platform_system.to_string()),
            platform_machine: Some(machine.to_string()),
            ..Default::default()
        }
    }
}
