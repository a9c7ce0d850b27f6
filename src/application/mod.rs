//! Application layer - Use cases that coordinate domain services.
//!
//! This layer contains the application-specific business rules and orchestrates
//! the flow of data between the CLI layer and domain services.

mod notify;
mod refresh;
mod report;

pub use notify::{ConsoleNotifier, NotifyAction, NotifyOptions, Notifier, notify_updates};
pub use refresh::{RefreshAction, RefreshReport};
pub use report::{MAX_COMMAND_LENGTH, install_command, outdated_count, visible};
