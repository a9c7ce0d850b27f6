//! Update notifications for stored packages.

use anyhow::Result;
use log::{debug, info, warn};
use pep440_rs::Version;

use crate::package::version::parse_version;
use crate::runtime::Runtime;
use crate::store::{JsonStore, StateFile, StoredDistribution};

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> Result<()>;
}

/// Delivers notifications on stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        info!("Notification: {}", title);
        println!("{}\n  {}", title, message);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyOptions {
    pub show_editable: bool,
    /// Notify again even if this latest version was already notified.
    pub repeat: bool,
}

/// The latest version of `dist` if it should be notified about.
fn pending_update(dist: &StoredDistribution, options: NotifyOptions) -> Option<Version> {
    if dist.is_editable && !options.show_editable {
        return None;
    }

    let installed = parse_version(&dist.installed_version)?;
    let latest = parse_version(&dist.latest_version)?;
    if latest <= installed {
        return None;
    }

    if options.repeat {
        return Some(latest);
    }
    match dist.latest_notified_version.as_deref().and_then(parse_version) {
        Some(notified) if notified >= latest => None,
        _ => Some(latest),
    }
}

/// Send a notification for every package with an unnotified update and
/// record what was sent. Returns the number of notifications sent.
pub fn notify_updates(
    state: &mut StateFile,
    notifier: &dyn Notifier,
    options: NotifyOptions,
) -> usize {
    let mut sent = 0;

    for dist in state.iter_mut() {
        let Some(latest) = pending_update(dist, options) else {
            continue;
        };

        let title = format!("Update available: {} {}", dist.name, dist.latest_version);
        let message = format!(
            "There is an update available: {} {} => {}",
            dist.name, dist.installed_version, dist.latest_version
        );
        match notifier.notify(&title, &message) {
            Ok(()) => {
                debug!("Notified {} {}", dist.name, dist.latest_version);
                // Stored normalized: "v2.0-rc1" is recorded as "2.0rc1"
                dist.latest_notified_version = Some(latest.to_string());
                sent += 1;
            }
            Err(e) => warn!("Failed to notify update of {}: {:#}", dist.name, e),
        }
    }

    sent
}

/// Loads the store, sends pending notifications and saves what was sent.
pub struct NotifyAction<'a, R: Runtime> {
    store: &'a JsonStore<'a, R>,
    notifier: &'a dyn Notifier,
    options: NotifyOptions,
}

impl<'a, R: Runtime> NotifyAction<'a, R> {
    pub fn new(
        store: &'a JsonStore<'a, R>,
        notifier: &'a dyn Notifier,
        options: NotifyOptions,
    ) -> Self {
        Self {
            store,
            notifier,
            options,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn run(&self) -> Result<usize> {
        let mut state = self.store.load()?;
        let sent = notify_updates(&mut state, self.notifier, self.options);
        if sent > 0 {
            self.store.save(&state)?;
        }
        Ok(sent)
    }
}
