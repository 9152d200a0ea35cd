use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    #[serde(default = "default_user_age")]
    pub user_age: u32,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub fallback_to_examples: bool,
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: usize,
    #[serde(default = "default_breaker_reset")]
    pub breaker_reset_seconds: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: default_capacity() }
    }
}

fn default_user_age() -> u32 { skyfinder_core::search::DEFAULT_USER_AGE }
fn default_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_breaker_threshold() -> usize { 5 }
fn default_breaker_reset() -> u64 { 30 }
fn default_max_response_bytes() -> usize { 4 * 1024 * 1024 }
fn default_capacity() -> usize { 1024 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `SKYFINDER__SEARCH__ENDPOINT=http://...`
            .add_source(environment())
            .build()?;

        s.try_deserialize()
    }

    /// Parses configuration from TOML text, with no file or environment layers.
    pub fn from_toml(text: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

/// `__` separates the prefix from the section as well as the section from
/// the key.
fn environment() -> config::Environment {
    config::Environment::with_prefix("SKYFINDER").separator("__")
}
