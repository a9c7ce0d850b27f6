use anyhow::Result;

use crate::{
    application::{ConsoleNotifier, NotifyAction, NotifyOptions},
    runtime::Runtime,
};

use super::config::{Config, GlobalOptions};

/// Send notifications for stored packages with a new release.
#[tracing::instrument(skip(runtime, options))]
pub fn notify<R: Runtime>(runtime: R, options: GlobalOptions, repeat: bool) -> Result<()> {
    let config = Config::new(runtime, options)?;
    let store = config.store();

    let options = NotifyOptions {
        show_editable: config.settings.show_editable_packages,
        repeat: repeat || config.settings.repeat_notifications,
    };
    let sent = NotifyAction::new(&store, &ConsoleNotifier, options).run()?;

    if sent == 0 {
        println!("No new updates.");
    }
    Ok(())
}
