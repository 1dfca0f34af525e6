//! Interactive shell over the command engine.

pub mod adapter;
pub mod commands;
pub mod config;
pub mod error;
pub mod message;
pub mod render;
pub mod shell;

pub use adapter::{CommandAdapter, Reply};
pub use config::{Config, IdentityConfig, OutputFormat, ShellConfig};
pub use error::{AppError, AppResult};
pub use message::Message;
