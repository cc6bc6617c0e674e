use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::domain::Environment;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub metering: MeteringConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Deployment marker. Only `local` allows reseeding and the debug listing.
    pub environment: Environment,

    /// Credential of the admin created on an empty database outside the
    /// local environment. Unset means no admin is created.
    pub bootstrap_admin_credential: Option<String>,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/maas.db".to_string(),
            log_level: "info".to_string(),
            environment: Environment::Production,
            bootstrap_admin_credential: None,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Request header carrying the caller's credential.
    pub credential_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            credential_header: "auth".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteringConfig {
    /// Tokens charged per generated meme.
    pub meme_cost: u32,
}

impl Default for MeteringConfig {
    fn default() -> Self {
        Self { meme_cost: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` files and
    /// environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies `ENV_NAME`, `MAAS_DATABASE_URL`, `MAAS_ADMIN_CREDENTIAL` and
    /// `MAAS_PORT` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("ENV_NAME") {
            self.general.environment = Environment::from(env.as_str());
        }

        if let Some(url) = lookup("MAAS_DATABASE_URL").filter(|u| !u.is_empty()) {
            self.general.database_path = url;
        }

        if let Some(credential) = lookup("MAAS_ADMIN_CREDENTIAL").filter(|c| !c.is_empty()) {
            self.general.bootstrap_admin_credential = Some(credential);
        }

        if let Some(port) = lookup("MAAS_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid MAAS_PORT"),
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("maas").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".maas").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.metering.meme_cost == 0 {
            anyhow::bail!("metering.meme_cost must be greater than 0");
        }

        if self.server.credential_header.trim().is_empty() {
            anyhow::bail!("server.credential_header cannot be empty");
        }

        if let Some(credential) = &self.general.bootstrap_admin_credential
            && (credential.is_empty() || credential.trim() != credential)
        {
            anyhow::bail!(
                "general.bootstrap_admin_credential must be non-empty without surrounding whitespace"
            );
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!(
                "general.min_db_connections ({}) exceeds max_db_connections ({})",
                self.general.min_db_connections,
                self.general.max_db_connections
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.metering.meme_cost, 1);
        assert_eq!(config.server.credential_header, "auth");
        assert_eq!(config.general.environment, Environment::Production);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[metering]"));
        assert!(toml_str.contains("environment = \"production\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"
            environment = "local"

            [metering]
            meme_cost = 3
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(config.general.environment.is_local());
        assert_eq!(config.metering.meme_cost, 3);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ENV_NAME", "local"),
            ("MAAS_DATABASE_URL", "sqlite::memory:"),
            ("MAAS_PORT", "9000"),
            ("MAAS_ADMIN_CREDENTIAL", "let-me-in"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(ToString::to_string));

        assert!(config.general.environment.is_local());
        assert_eq!(config.general.database_path, "sqlite::memory:");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.general.bootstrap_admin_credential.as_deref(),
            Some("let-me-in")
        );
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "MAAS_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.metering.meme_cost = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.credential_header = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.min_db_connections = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.bootstrap_admin_credential = Some(" padded ".to_string());
        assert!(config.validate().is_err());
    }
}
