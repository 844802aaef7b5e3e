use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::database::DatabaseTarget;

/// Environment variables read at startup, mapped onto config keys.
const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("DATABASE_URL", "database_url"),
    ("HOST", "host"),
    ("PORT", "port"),
    ("APP_ENV", "app_env"),
];

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    #[default]
    Development,
    Production,
    Test,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub app_env: AppEnvironment,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

impl ApiConfig {
    /// Load from the optional config file and the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();

        match config_path {
            Some(path) => Self::from_sources(Some((path, true)), &env),
            None => {
                let default_path = get_config_path();
                Self::from_sources(Some((default_path.as_path(), false)), &env)
            }
        }
    }

    /// Defaults, then the TOML file (if any), then environment values.
    pub fn from_sources(
        file: Option<(&Path, bool)>,
        env: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", i64::from(default_port()))?;

        if let Some((path, required)) = file {
            builder = builder.add_source(File::from(path.to_path_buf()).required(required));
        }

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, env.get(var).cloned())?;
        }

        let config: ApiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database_target()?;

        if self.host.trim().is_empty() {
            return Err(ConfigError::Message("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Message("port must be between 1 and 65535".to_string()));
        }

        Ok(())
    }

    /// Accepts `sqlite://<path>` and `sqlite::memory:`.
    pub fn database_target(&self) -> Result<DatabaseTarget, ConfigError> {
        let url = self.database_url.trim();

        if url == "sqlite::memory:" {
            return Ok(DatabaseTarget::Memory);
        }

        match url.strip_prefix("sqlite://") {
            Some(path) if !path.is_empty() => Ok(DatabaseTarget::File(PathBuf::from(path))),
            _ => Err(ConfigError::Message(format!(
                "DATABASE_URL must be sqlite://<path> or sqlite::memory:, got {:?}",
                self.database_url
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnvironment::Production
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("contacts").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
