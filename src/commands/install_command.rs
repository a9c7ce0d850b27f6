use anyhow::Result;

use crate::{
    application::{install_command as build_install_command, visible},
    package::PackageFilter,
    runtime::Runtime,
};

use super::config::{Config, GlobalOptions};

/// Print a `pip install` line upgrading every visible package.
#[tracing::instrument(skip(runtime, options))]
pub fn install_command<R: Runtime>(runtime: R, options: GlobalOptions) -> Result<()> {
    let config = Config::new(runtime, options)?;
    let state = config.store().load()?;

    let filter = PackageFilter::from_settings(&config.settings);
    println!("{}", build_install_command(&visible(&state, &filter)));
    Ok(())
}
