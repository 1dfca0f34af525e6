//! Common test utilities for integration tests.

#![allow(dead_code)]

use command_shell::{commands, CommandAdapter, IdentityConfig, Message, ShellConfig};

/// Adapter over every built-in module with default settings.
pub fn test_adapter() -> CommandAdapter {
    CommandAdapter::new(&commands::all(), &ShellConfig::default()).unwrap()
}

pub fn identity() -> IdentityConfig {
    IdentityConfig {
        user: "ada".to_string(),
        channel: "lab".to_string(),
    }
}

pub fn message(text: &str) -> Message {
    Message::new(text, &identity())
}
