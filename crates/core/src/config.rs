use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub market: MarketConfig,
    pub gateway: GatewayConfig,
    pub data: DataConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub secret_key: Option<SecretString>,
    pub publishable_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub static_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub market_base_url: Option<String>,
    pub gateway_secret_key: Option<String>,
    pub gateway_publishable_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://outfitter.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://openrouter.ai/api/v1".to_string(),
                model: "meta-llama/llama-3.1-70b-instruct".to_string(),
                timeout_secs: 30,
                max_retries: 2,
            },
            market: MarketConfig { base_url: None, timeout_secs: 15 },
            gateway: GatewayConfig { secret_key: None, publishable_key: None },
            data: DataConfig {
                dir: PathBuf::from("data"),
                static_dir: PathBuf::from("static"),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("outfitter.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
        }

        if let Some(market) = patch.market {
            if let Some(base_url) = market.base_url {
                self.market.base_url = Some(base_url);
            }
            if let Some(timeout_secs) = market.timeout_secs {
                self.market.timeout_secs = timeout_secs;
            }
        }

        if let Some(gateway) = patch.gateway {
            if let Some(gateway_secret_value) = gateway.secret_key {
                self.gateway.secret_key = Some(secret_value(gateway_secret_value));
            }
            if let Some(publishable_key) = gateway.publishable_key {
                self.gateway.publishable_key = Some(publishable_key);
            }
        }

        if let Some(data) = patch.data {
            if let Some(dir) = data.dir {
                self.data.dir = dir;
            }
            if let Some(static_dir) = data.static_dir {
                self.data.static_dir = static_dir;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("OUTFITTER_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("OUTFITTER_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("OUTFITTER_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("OUTFITTER_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("OUTFITTER_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("OUTFITTER_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("OUTFITTER_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("OUTFITTER_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("OUTFITTER_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("OUTFITTER_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("OUTFITTER_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("OUTFITTER_LLM_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("OUTFITTER_MARKET_BASE_URL") {
            self.market.base_url = Some(value);
        }

        if let Some(value) = read_env("OUTFITTER_GATEWAY_SECRET_KEY") {
            self.gateway.secret_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("OUTFITTER_GATEWAY_PUBLISHABLE_KEY") {
            self.gateway.publishable_key = Some(value);
        }

        if let Some(value) = read_env("OUTFITTER_DATA_DIR") {
            self.data.dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("OUTFITTER_STATIC_DIR") {
            self.data.static_dir = PathBuf::from(value);
        }

        if let Some(value) = read_env("OUTFITTER_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("OUTFITTER_SERVER_PORT") {
            self.server.port = parse_u16("OUTFITTER_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("OUTFITTER_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("OUTFITTER_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.database_url {
            self.database.url = url;
        }
        if let Some(api_key_value) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(api_key_value));
        }
        if let Some(base_url) = overrides.llm_base_url {
            self.llm.base_url = base_url;
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }
        if let Some(base_url) = overrides.market_base_url {
            self.market.base_url = Some(base_url);
        }
        if let Some(secret) = overrides.gateway_secret_key {
            self.gateway.secret_key = Some(secret_value(secret));
        }
        if let Some(publishable_key) = overrides.gateway_publishable_key {
            self.gateway.publishable_key = Some(publishable_key);
        }
        if let Some(dir) = overrides.data_dir {
            self.data.dir = dir;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation("database.url must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
        }
        if !self.llm.base_url.starts_with("http") {
            return Err(ConfigError::Validation(format!(
                "llm.base_url must be an http(s) url, got `{}`",
                self.llm.base_url
            )));
        }
        if let Some(base_url) = &self.market.base_url {
            if !base_url.starts_with("http") {
                return Err(ConfigError::Validation(format!(
                    "market.base_url must be an http(s) url, got `{base_url}`"
                )));
            }
        }
        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "unsupported log level `{other}` (expected trace|debug|info|warn|error)"
            ))),
        }
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Some(value) = read_env("OUTFITTER_CONFIG") {
        let path = PathBuf::from(value);
        return path.exists().then_some(path);
    }
    let default = PathBuf::from("outfitter.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    llm: Option<LlmPatch>,
    market: Option<MarketPatch>,
    gateway: Option<GatewayPatch>,
    data: Option<DataPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MarketPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GatewayPatch {
    secret_key: Option<String>,
    publishable_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DataPatch {
    dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    fn load_from_file(contents: &str) -> Result<AppConfig, ConfigError> {
        let mut file = tempfile::NamedTempFile::new().expect("temp config file");
        file.write_all(contents.as_bytes()).expect("write config");
        AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
    }

    #[test]
    fn defaults_are_valid_without_a_config_file() {
        let config = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("/definitely/not/here.toml")),
            ..LoadOptions::default()
        })
        .expect("defaults should load");

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let error = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("/definitely/not/here.toml")),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("must fail");

        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn toml_patch_overlays_defaults() {
        let config = load_from_file(
            r#"
            [database]
            url = "sqlite::memory:"

            [llm]
            api_key = "sk-or-test"
            model = "anthropic/claude-3.5-haiku"

            [server]
            port = 9000

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .expect("patched config");

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.llm.model, "anthropic/claude-3.5-haiku");
        assert_eq!(
            config.llm.api_key.as_ref().map(|key| key.expose_secret().to_string()),
            Some("sk-or-test".to_string())
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.format, LogFormat::Json);
        // untouched sections keep their defaults
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn programmatic_overrides_win_over_file_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config file");
        std::io::Write::write_all(
            &mut file,
            b"[database]\nurl = \"sqlite://from-file.db\"\n",
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                llm_model: Some("stub-model".to_string()),
                ..ConfigOverrides::default()
            },
        })
        .expect("config with overrides");

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.llm.model, "stub-model");
    }

    #[test]
    fn invalid_log_level_fails_validation() {
        let error = load_from_file("[logging]\nlevel = \"verbose\"\n").expect_err("must fail");
        assert!(matches!(error, ConfigError::Validation(_)));
        assert!(error.to_string().contains("unsupported log level"));
    }

    #[test]
    fn market_url_must_be_http() {
        let error =
            load_from_file("[market]\nbase_url = \"ftp://example.com\"\n").expect_err("must fail");
        assert!(error.to_string().contains("market.base_url"));
    }

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().expect("parse"), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
