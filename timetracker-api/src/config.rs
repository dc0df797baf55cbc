/// Configuration management for the API server
///
/// Values are layered with the `config` crate:
///
/// 1. Built-in defaults (every field except `database.url`)
/// 2. Optional TOML file at `CONFIG_PATH` (default `config.toml`)
/// 3. Environment variables prefixed `TIMETRACKER__`, sections separated
///    by `__`, e.g. `TIMETRACKER__DATABASE__URL`
///
/// A `.env` file is loaded into the environment first when present.
///
/// # Example
///
/// ```no_run
/// use timetracker_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// config.validate()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use timetracker_shared::db::pool::PoolConfig;
use timetracker_shared::models::{session::SESSION_MAX_AGE_SECS, user::Role};
use timetracker_shared::usecase::AuthSettings;

const ENV_PREFIX: &str = "TIMETRACKER";
const ENV_SEPARATOR: &str = "__";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub database: PoolConfig,
    pub redis: RedisUrls,
    pub session: SessionConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Enables HSTS and the `Secure` cookie attribute
    pub production: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            production: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisUrls {
    pub session_url: String,
    pub cache_url: String,
}

impl Default for RedisUrls {
    fn default() -> Self {
        Self {
            session_url: "redis://127.0.0.1:6379/0".to_string(),
            cache_url: "redis://127.0.0.1:6379/1".to_string(),
        }
    }
}

/// Where session tokens are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Redis,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backend: SessionBackend,

    /// Session lifetime in seconds
    pub max_age: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Redis,
            max_age: SESSION_MAX_AGE_SECS as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Entry lifetime in seconds
    pub ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret that must accompany an admin sign-up
    pub admin_token: String,

    /// Role given when sign-up omits one
    pub default_role: Role,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: "secret_token".to_string(),
            default_role: Role::User,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Loads configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value has the wrong
    /// type.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let mut settings = config::Config::builder();
        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .list_separator(",")
                .with_list_parse_key("api.cors_origins")
                .try_parsing(true),
        );

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("database.url is required (set TIMETRACKER__DATABASE__URL)");
        }

        if self.api.port == 0 {
            anyhow::bail!("api.port must be non-zero");
        }

        if self.auth.admin_token.is_empty() {
            anyhow::bail!("auth.admin_token must not be empty");
        }

        if self.session.max_age == 0 {
            anyhow::bail!("session.max_age must be positive");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn session_max_age(&self) -> Duration {
        // chrono rejects durations beyond i64::MAX milliseconds
        let secs = self.session.max_age.min((i64::MAX / 1000) as u64);
        Duration::seconds(secs as i64)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            admin_token: self.auth.admin_token.clone(),
            session_max_age: self.session_max_age(),
        }
    }
}
