//! Shell configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Line handling and output
    #[serde(default)]
    pub shell: ShellConfig,

    /// Who is typing, supplied to commands as source values
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    /// Lines not starting with this are ignored
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub output: OutputFormat,

    /// Keep runs of whitespace instead of collapsing them to one space
    #[serde(default, deserialize_with = "flag")]
    pub preserve_whitespace: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_channel")]
    pub channel: String,
}

/// How replies are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            log_level: default_log_level(),
            output: OutputFormat::default(),
            preserve_whitespace: false,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            channel: default_channel(),
        }
    }
}

fn default_prefix() -> String {
    "!".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_user() -> String {
    "guest".into()
}

fn default_channel() -> String {
    "terminal".into()
}

// Environment values arrive as strings since parsing is disabled.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid boolean '{}'", other))),
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep prefixes such as "+" or "1" as typed.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
