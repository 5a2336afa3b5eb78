//! Configuration management
//!
//! Settings layer underneath the command line: an optional settings file,
//! then `SQSPROV__`-prefixed environment variables
//! (e.g. `SQSPROV__QUEUE__MAX_RECEIVE_COUNT=10`). Flags given on the
//! command line always win.

use serde::Deserialize;
use sqsprov_core::provision::{
    DEFAULT_MAX_RECEIVE_COUNT, DEFAULT_MESSAGE_RETENTION_SECONDS,
    DEFAULT_VISIBILITY_TIMEOUT_SECONDS,
};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub aws: AwsSettings,
}

#[derive(Debug, Deserialize)]
pub struct QueueSettings {
    #[serde(default = "default_visibility_timeout")]
    pub visibility_timeout_seconds: u32,

    #[serde(default = "default_message_retention")]
    pub message_retention_seconds: u32,

    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            visibility_timeout_seconds: default_visibility_timeout(),
            message_retention_seconds: default_message_retention(),
            max_receive_count: default_max_receive_count(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

fn default_visibility_timeout() -> u32 {
    DEFAULT_VISIBILITY_TIMEOUT_SECONDS
}

fn default_message_retention() -> u32 {
    DEFAULT_MESSAGE_RETENTION_SECONDS
}

fn default_max_receive_count() -> u32 {
    DEFAULT_MAX_RECEIVE_COUNT
}

impl Settings {
    /// Load settings from `file` (any format the `config` crate knows, the
    /// extension may be omitted) and the environment. A missing file is fine.
    pub fn load(file: &str) -> anyhow::Result<Self> {
        Self::load_with_env(file, None)
    }

    /// As [`Settings::load`], reading variables from `env` instead of the
    /// process environment when given
    fn load_with_env(file: &str, env: Option<config::Map<String, String>>) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("SQSPROV")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(config.try_deserialize::<Settings>()?)
    }
}
