use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub tables: TableSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_menus_table")]
    pub menus: String,
    #[serde(default = "default_stalls_table")]
    pub stalls: String,
    #[serde(default = "default_profiles_table")]
    pub profiles: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            menus: default_menus_table(),
            stalls: default_stalls_table(),
            profiles: default_profiles_table(),
        }
    }
}

fn default_menus_table() -> String { "menus".to_string() }
fn default_stalls_table() -> String { "stalls".to_string() }
fn default_profiles_table() -> String { "profiles".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Shared L2 tier; without it snapshots are only cached in process
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with STALL_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., STALL__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("STALL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables used by deploy tooling
///
/// `BACKEND_URL`, `BACKEND_API_KEY` and `REDIS_URL` win over file values.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("BACKEND_URL") {
        builder = builder.set_override("backend.url", url)?;
    }
    if let Ok(api_key) = env::var("BACKEND_API_KEY") {
        builder = builder.set_override("backend.api_key", api_key)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}
