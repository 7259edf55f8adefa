use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CODESTACK_CONFIG";

/// Upper bound for `security.reset_token_ttl_minutes` (7 days).
pub const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub storage: StorageConfig,

    pub security: SecurityConfig,

    pub mail: MailConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:codestack.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding course attachments as `<id>.pdf`
    pub attachments_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            attachments_path: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    /// Lifetime of a password reset token
    pub reset_token_ttl_minutes: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            reset_token_ttl_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When disabled, outgoing mail is only written to the log.
    pub enabled: bool,

    /// HTTP endpoint of the mail relay that accepts JSON messages.
    pub relay_url: String,

    pub api_key: String,

    pub from_address: String,

    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            relay_url: "http://localhost:8025/api/send".to_string(),
            api_key: String::new(),
            from_address: "no-reply@codestack.local".to_string(),
            timeout_seconds: 10,
        }
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
    pub fn load() -> Result<Self> {
        Self::load_with_override(None)
    }

    /// Loads the first config file found, preferring `CODESTACK_CONFIG`, then
    /// `explicit`, then the well-known locations.
    pub fn load_with_override(explicit: Option<&Path>) -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return Self::load_from_path(&path);
        }

        if let Some(path) = explicit {
            info!("Loading config from: {}", path.display());
            return Self::load_from_path(path);
        }

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

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
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
            paths.push(config_dir.join("codestack").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".codestack").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes the default config to `path` (or `./config.toml`) unless a file is
    /// already there. Returns whether a file was written.
    pub fn create_default_if_missing(path: Option<&Path>) -> Result<bool> {
        let path = path.map_or_else(Self::default_config_path, Path::to_path_buf);
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.general.max_db_connections == 0 {
            anyhow::bail!("max_db_connections must be > 0");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        if !(1..=MAX_RESET_TOKEN_TTL_MINUTES).contains(&self.security.reset_token_ttl_minutes) {
            anyhow::bail!(
                "reset_token_ttl_minutes must be between 1 and {MAX_RESET_TOKEN_TTL_MINUTES}"
            );
        }

        if self.mail.enabled {
            url::Url::parse(&self.mail.relay_url).context("Invalid mail relay URL")?;
            if self.mail.from_address.is_empty() {
                anyhow::bail!("mail.from_address cannot be empty when mail is enabled");
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.database_path, "sqlite:codestack.db");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.attachments_path, "data");
        assert_eq!(config.security.reset_token_ttl_minutes, 30);
        assert!(!config.mail.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[mail]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            port = 9000
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_validate_rejects_bad_relay_url() {
        let mut config = Config::default();
        config.mail.enabled = true;
        config.mail.relay_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_pool_bounds() {
        let mut config = Config::default();
        config.general.min_db_connections = 10;
        config.general.max_db_connections = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_reset_token_ttl() {
        let mut config = Config::default();

        config.security.reset_token_ttl_minutes = 0;
        assert!(config.validate().is_err());

        config.security.reset_token_ttl_minutes = i64::MAX / 2;
        assert!(config.validate().is_err());

        config.security.reset_token_ttl_minutes = MAX_RESET_TOKEN_TTL_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip_on_disk() {
        let path = std::env::temp_dir().join(format!(
            "codestack-config-{}.toml",
            uuid::Uuid::new_v4()
        ));

        let mut config = Config::default();
        config.server.port = 8123;
        config.save_to_path(&path).unwrap();

        assert!(!Config::create_default_if_missing(Some(&path)).unwrap());

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.port, 8123);

        std::fs::remove_file(&path).ok();
    }
}
