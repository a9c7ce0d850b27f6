pub mod config;
mod install_command;
mod list;
mod notify;
mod refresh;

pub use config::GlobalOptions;
pub use install_command::install_command;
pub use list::{ListOptions, list};
pub use notify::notify;
pub use refresh::refresh;
