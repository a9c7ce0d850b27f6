use anyhow::Result;
use log::info;

use crate::{
    application::{ConsoleNotifier, NotifyAction, NotifyOptions, RefreshAction},
    discovery::{SitePackages, StaticModules},
    environment::Interpreter,
    http::HttpClient,
    index::PyPiIndex,
    runtime::Runtime,
};

use super::config::{Config, GlobalOptions};

/// Rebuild the stored package set, then send notifications if enabled.
#[tracing::instrument(skip(runtime, options))]
pub async fn refresh<R: Runtime>(
    runtime: R,
    options: GlobalOptions,
    sequential: bool,
) -> Result<()> {
    let mut config = Config::new(runtime, options)?;
    if sequential {
        config.settings.sequential = true;
    }
    run(&config).await
}

pub async fn run<R: Runtime>(config: &Config<R>) -> Result<()> {
    let settings = &config.settings;

    let interpreter = Interpreter::resolve(&config.runtime, settings)?;
    let source = SitePackages::new(&config.runtime, interpreter.site_packages.clone());
    let modules = StaticModules(settings.modules.clone());
    let index = PyPiIndex::new(HttpClient::from_settings(settings)?, &settings.index_url);
    let store = config.store();

    let report = RefreshAction::new(
        &config.runtime,
        settings,
        &interpreter,
        &source,
        &modules,
        &index,
        &store,
    )
    .run()
    .await?;

    println!(
        "Refreshed {} packages ({} outdated)",
        report.refreshed, report.outdated
    );

    if settings.notifications_enabled {
        let options = NotifyOptions {
            show_editable: settings.show_editable_packages,
            repeat: settings.repeat_notifications,
        };
        let sent = NotifyAction::new(&store, &ConsoleNotifier, options).run()?;
        info!("Sent {} update notifications", sent);
    }

    Ok(())
}
