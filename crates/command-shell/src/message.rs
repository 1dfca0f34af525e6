//! Incoming lines and the source values they carry.

use crate::config::IdentityConfig;
use chrono::{DateTime, Utc};
use command_engine::{Record, SourceValues, Value};

/// One line typed into the shell.
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub user: String,
    pub channel: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(text: impl Into<String>, identity: &IdentityConfig) -> Self {
        Self {
            text: text.into(),
            user: identity.user.clone(),
            channel: identity.channel.clone(),
            timestamp: Utc::now(),
        }
    }

    /// `User`, `Channel` and `Event` values for commands that ask for them.
    pub fn sources(&self) -> SourceValues {
        let event = Record::new("Event")
            .with("user", Value::str(&self.user))
            .with("channel", Value::str(&self.channel))
            .with("timestamp", Value::str(self.timestamp.to_rfc3339()));

        SourceValues::new()
            .with("User", Value::str(&self.user))
            .with("Channel", Value::str(&self.channel))
            .with("Event", Value::Record(event))
    }
}
