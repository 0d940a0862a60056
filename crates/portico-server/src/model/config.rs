//! Configuration management for Portico server
//!
//! Settings are layered from `conf/application.yml` (optional), `PORTICO_*`
//! environment variables (`__` separates nested keys, e.g.
//! `PORTICO_AUTH__SECRET_KEY`) and finally command line flags. The loaded
//! [`Configuration`] is turned into immutable settings structs once, at
//! startup, and those are what the middleware and services receive.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use portico_auth::{AUTHORIZATION_HEADER, AuthSettings, DEFAULT_TOKEN_EXPIRE_SECONDS};
use portico_persistence::StorageMode;

use crate::middleware::rate_limit::TrafficSettings;
use crate::startup::logging::LoggingConfig;

pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5000;
const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";

/// Command line arguments for the server
#[derive(Debug, Default, Parser)]
#[command(name = "portico-server", about = "API gateway control plane")]
pub struct Cli {
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
    /// Storage backend: `memory` or `external_db`
    #[arg(short = 's', long = "storage")]
    pub storage: Option<String>,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Disable the authentication gate
    #[arg(long = "demo")]
    pub demo: bool,
    /// Print a bearer credential for this subject and exit
    #[arg(long = "issue-token", value_name = "SUBJECT")]
    pub issue_token: Option<String>,
}

/// Storage backend settings
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub mode: StorageMode,
    /// Upper bound on any single storage call
    pub timeout: Duration,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            mode: StorageMode::Memory,
            timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
        }
    }
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_cli(&Cli::parse())
    }

    pub fn from_cli(args: &Cli) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder()
            .add_source(File::with_name(&args.config_file).required(false))
            .add_source(
                Environment::with_prefix("PORTICO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(v) = args.port {
            config_builder = config_builder.set_override("server.port", v)?;
        }
        if let Some(v) = &args.storage {
            config_builder = config_builder.set_override("storage.mode", v.as_str())?;
        }
        if let Some(v) = &args.database_url {
            config_builder = config_builder.set_override("db.url", v.as_str())?;
        }
        if args.demo {
            config_builder = config_builder.set_override("auth.enabled", false)?;
        }

        Ok(Self::from_config(config_builder.build()?))
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or("0.0.0.0".to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    pub fn server_context_path(&self) -> String {
        self.config
            .get_string("server.context_path")
            .unwrap_or_default()
    }

    // ========================================================================
    // Auth Configuration
    // ========================================================================

    pub fn auth_enabled(&self) -> bool {
        self.config.get_bool("auth.enabled").unwrap_or(true)
    }

    pub fn token_secret_key(&self) -> String {
        self.config
            .get_string("auth.secret_key")
            .unwrap_or_default()
    }

    pub fn auth_token_expire_seconds(&self) -> u64 {
        self.config
            .get_int("auth.token_expire_seconds")
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_SECONDS) as u64
    }

    pub fn auth_header(&self) -> String {
        self.config
            .get_string("auth.header")
            .unwrap_or(AUTHORIZATION_HEADER.to_string())
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            enabled: self.auth_enabled(),
            secret_key: self.token_secret_key(),
            token_lifetime: Duration::from_secs(self.auth_token_expire_seconds()),
            header: self.auth_header(),
        }
    }

    // ========================================================================
    // Traffic Shaping Configuration
    // ========================================================================

    pub fn traffic_settings(&self) -> TrafficSettings {
        let defaults = TrafficSettings::default();
        let seconds = |key: &str, default: Duration| {
            self.config
                .get_int(key)
                .ok()
                .filter(|v| *v > 0)
                .map(|v| Duration::from_secs(v as u64))
                .unwrap_or(default)
        };
        let millis = |key: &str| {
            self.config
                .get_int(key)
                .ok()
                .filter(|v| *v >= 0)
                .map(|v| Duration::from_millis(v as u64))
        };

        TrafficSettings {
            enabled: self
                .config
                .get_bool("traffic.enabled")
                .unwrap_or(defaults.enabled),
            window: seconds("traffic.window_seconds", defaults.window),
            delay_after: self
                .config
                .get_int("traffic.delay_after")
                .ok()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.delay_after),
            delay_increment: millis("traffic.delay_ms").unwrap_or(defaults.delay_increment),
            max_delay: millis("traffic.max_delay_ms"),
        }
    }

    // ========================================================================
    // Storage Configuration
    // ========================================================================

    pub fn storage_mode(&self) -> Result<StorageMode, ConfigError> {
        match self.config.get_string("storage.mode") {
            Ok(mode) => mode.parse().map_err(ConfigError::Message),
            Err(ConfigError::NotFound(_)) => Ok(StorageMode::default()),
            Err(e) => Err(e),
        }
    }

    pub fn storage_settings(&self) -> Result<StorageSettings, ConfigError> {
        Ok(StorageSettings {
            mode: self.storage_mode()?,
            timeout: Duration::from_millis(
                self.config
                    .get_int("storage.timeout_ms")
                    .ok()
                    .filter(|v| *v > 0)
                    .map(|v| v as u64)
                    .unwrap_or(DEFAULT_STORAGE_TIMEOUT_MS),
            ),
        })
    }

    pub async fn database_connection(
        &self,
    ) -> std::result::Result<DatabaseConnection, Box<dyn std::error::Error>> {
        let max_connections = self
            .config
            .get_int("db.pool.max_connections")
            .unwrap_or(100) as u32;
        let min_connections = self
            .config
            .get_int("db.pool.min_connections")
            .unwrap_or(1) as u32;
        let connect_timeout = self
            .config
            .get_int("db.pool.connect_timeout")
            .unwrap_or(30) as u64;
        let acquire_timeout = self
            .config
            .get_int("db.pool.acquire_timeout")
            .unwrap_or(8) as u64;
        let idle_timeout = self.config.get_int("db.pool.idle_timeout").unwrap_or(10) as u64;
        let max_lifetime = self.config.get_int("db.pool.max_lifetime").unwrap_or(1800) as u64;
        let sqlx_logging = self.config.get_bool("db.pool.sqlx_logging").unwrap_or(false);

        let url = self.config.get_string("db.url")?;

        let mut opt = ConnectOptions::new(url);

        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .acquire_timeout(Duration::from_secs(acquire_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .sqlx_logging(sqlx_logging);

        Ok(Database::connect(opt).await?)
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        let log_dir = self
            .config
            .get_string("logs.path")
            .ok()
            .or_else(|| std::env::var("PORTICO_LOG_DIR").ok())
            .map(PathBuf::from);

        LoggingConfig::from_config(
            log_dir,
            self.config.get_bool("logs.console").unwrap_or(true),
            self.config.get_bool("logs.file").unwrap_or(true),
            &self
                .config
                .get_string("logs.level")
                .unwrap_or("info".to_string()),
            &self
                .config
                .get_string("logs.rotation")
                .unwrap_or("daily".to_string()),
        )
    }
}
