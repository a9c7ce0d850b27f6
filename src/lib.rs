pub mod application;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod environment;
pub mod http;
pub mod index;
pub mod package;
pub mod resolver;
pub mod runtime;
pub mod store;
