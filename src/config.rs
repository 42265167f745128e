//! Environment configuration.

use std::env;

pub const WRITE_LOG_ENV_VAR: &str = "LAZYTICKET_WRITE_LOG";
pub const LOG_FILE_ENV_VAR: &str = "LAZYTICKET_LOG";
pub const DEBUG_ENV_VAR: &str = "LAZYTICKET_DEBUG";

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Tee every terminal write into this file.
    pub write_log: Option<String>,
    /// Destination for `tracing` output; logging is off when unset.
    pub log_file: Option<String>,
    pub debug: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt(WRITE_LOG_ENV_VAR),
            log_file: env_string_opt(LOG_FILE_ENV_VAR),
            debug: env_flag(DEBUG_ENV_VAR),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
