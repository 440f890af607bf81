//! Server configuration.
//!
//! Defaults reproduce the values the service has always run with: port 9000,
//! a local MongoDB, and `./README.md` as the home page. A TOML file can
//! replace any of them, and a handful of environment variables override the
//! file for container deployments.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub home_page: PathBuf,
    pub shutdown_grace_secs: u64,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 9000)),
            home_page: PathBuf::from("./README.md"),
            shutdown_grace_secs: 30,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout_secs: u64,
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Mongo,
            uri: "mongodb://localhost:27017".into(),
            database: "todo_db".into(),
            collection: "todo".into(),
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load from `path` if given, otherwise start from defaults, then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Apply `TODO_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("TODO_BIND") {
            self.server.bind = bind.parse().map_err(|e| ConfigError::InvalidValue {
                field: "server.bind",
                reason: format!("{e}"),
            })?;
        }
        if let Some(home) = lookup("TODO_HOME_PAGE") {
            self.server.home_page = PathBuf::from(home);
        }
        if let Some(backend) = lookup("TODO_STORE") {
            self.store.backend = backend.parse().map_err(|reason| ConfigError::InvalidValue {
                field: "store.backend",
                reason,
            })?;
        }
        if let Some(uri) = lookup("TODO_MONGO_URI") {
            self.store.uri = uri;
        }
        if let Some(database) = lookup("TODO_MONGO_DB") {
            self.store.database = database;
        }
        if let Some(collection) = lookup("TODO_MONGO_COLLECTION") {
            self.store.collection = collection;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("store.uri", &self.store.uri),
            ("store.database", &self.store.database),
            ("store.collection", &self.store.collection),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "cannot be empty".into(),
                });
            }
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_historic_values() {
        let config = Config::default();
        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.server.home_page, PathBuf::from("./README.md"));
        assert_eq!(config.server.shutdown_grace(), Duration::from_secs(30));
        assert_eq!(config.store.uri, "mongodb://localhost:27017");
        assert_eq!(config.store.backend, StoreBackend::Mongo);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            backend = "memory"
            database = "other"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.database, "other");
        assert_eq!(config.store.collection, "todo");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.bind.port(), 9000);
    }

    #[test]
    fn unknown_backend_in_toml_is_a_parse_error() {
        let result: Result<Config, _> = toml::from_str("[store]\nbackend = \"redis\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            ("TODO_BIND", "127.0.0.1:8080"),
            ("TODO_STORE", "Memory"),
            ("TODO_MONGO_COLLECTION", "todos"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.collection, "todos");
        assert_eq!(config.store.database, "todo_db");
    }

    #[test]
    fn bad_bind_override_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "TODO_BIND").then(|| "nowhere".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "server.bind",
                ..
            }
        ));
    }

    #[test]
    fn empty_collection_fails_validation() {
        let mut config = Config::default();
        config.store.collection = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile(_)));
    }
}
