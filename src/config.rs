use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub face_recognition: FaceRecognitionConfig,

    pub asset_store: AssetStoreConfig,

    pub attendance: AttendanceConfig,

    pub access: AccessConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Directory used by the local asset store and served under `/uploads`.
    pub uploads_path: String,

    /// Number of tokio worker threads (default: 4)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/facegate.db".to_string(),
            log_level: "info".to_string(),
            uploads_path: "uploads".to_string(),
            worker_threads: 4,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub api_prefix: String,

    pub cors_allowed_origins: Vec<String>,

    /// Upper bound for request bodies, photos included.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            api_prefix: "/api/v1".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens. Must be at least 32 bytes.
    pub jwt_secret: String,

    pub token_ttl_hours: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "your-secret-key-change-in-production-min-32-chars".to_string(),
            token_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 19456 = 19MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 19456,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceRecognitionConfig {
    /// Base URL of the recognition service; `/verify` is appended.
    pub url: String,

    pub timeout_seconds: u64,
}

impl Default for FaceRecognitionConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5001".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetStoreConfig {
    /// When false, photos are written to `general.uploads_path` instead.
    pub enabled: bool,

    pub cloud_name: String,

    pub api_key: String,

    pub api_secret: String,

    pub timeout_seconds: u64,
}

impl Default for AssetStoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    /// Offset used to compute the calendar day of a clock-in.
    /// When unset the server's local time zone is used.
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Restrict task reads and writes to the task owner.
    /// Off by default: any authenticated caller may update or delete any task id.
    pub enforce_task_ownership: bool,

    /// Reject task statuses outside `pending`, `in_progress`, `completed`.
    pub strict_task_status: bool,

    /// When set, embedding routes require a matching `X-Api-Key` header.
    /// Unset means the routes are open to the recognition service without credentials.
    pub embedding_api_key: Option<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            enforce_task_ownership: false,
            strict_task_status: true,
            embedding_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    /// Sent to Loki as the `env` field on every log line.
    pub environment: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            face_recognition: FaceRecognitionConfig::default(),
            asset_store: AssetStoreConfig::default(),
            attendance: AttendanceConfig::default(),
            access: AccessConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
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

    /// Environment wins over the file. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATABASE_URL") {
            self.general.database_url = v;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.general.log_level = v;
        }
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(v) = get("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = get("FACE_RECOGNITION_URL") {
            self.face_recognition.url = v;
        }

        let cloud_name = get("CLOUDINARY_CLOUD_NAME");
        let api_key = get("CLOUDINARY_API_KEY");
        let api_secret = get("CLOUDINARY_API_SECRET");
        if let (Some(cloud_name), Some(api_key), Some(api_secret)) = (cloud_name, api_key, api_secret)
        {
            self.asset_store.enabled = true;
            self.asset_store.cloud_name = cloud_name;
            self.asset_store.api_key = api_key;
            self.asset_store.api_secret = api_secret;
        }
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
            paths.push(config_dir.join("facegate").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".facegate").join("config.toml"));
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
        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!("auth.jwt_secret must be at least 32 bytes");
        }

        if self.auth.token_ttl_hours == 0 {
            anyhow::bail!("auth.token_ttl_hours must be > 0");
        }

        if self.face_recognition.url.trim().is_empty() {
            anyhow::bail!("face_recognition.url cannot be empty");
        }

        if self.face_recognition.timeout_seconds == 0 {
            anyhow::bail!("face_recognition.timeout_seconds must be > 0");
        }

        if self.asset_store.enabled
            && (self.asset_store.cloud_name.is_empty()
                || self.asset_store.api_key.is_empty()
                || self.asset_store.api_secret.is_empty())
        {
            anyhow::bail!("asset_store credentials are required when the asset store is enabled");
        }

        if let Some(offset) = self.attendance.utc_offset_minutes
            && offset.abs() >= 24 * 60
        {
            anyhow::bail!("attendance.utc_offset_minutes must be within +/- 1439");
        }

        if !self.server.api_prefix.starts_with('/') {
            anyhow::bail!("server.api_prefix must start with '/'");
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
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.api_prefix, "/api/v1");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.face_recognition.timeout_seconds, 30);
        assert!(!config.asset_store.enabled);
        assert!(!config.access.enforce_task_ownership);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[face_recognition]"));
        assert!(toml_str.contains("[access]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [face_recognition]
            url = "http://recognizer:5001"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.face_recognition.url, "http://recognizer:5001");
        assert_eq!(config.face_recognition.timeout_seconds, 30);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_observability_environment() {
        assert_eq!(Config::default().observability.environment, "development");

        let config: Config = toml::from_str(
            r#"
            [observability]
            loki_enabled = true
            environment = "staging"
        "#,
        )
        .unwrap();
        assert!(config.observability.loki_enabled);
        assert_eq!(config.observability.environment, "staging");
        assert_eq!(config.observability.loki_url, "http://localhost:3100");
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("PORT", "9090"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef-env"),
            ("FACE_RECOGNITION_URL", "http://face:5001"),
            ("DATABASE_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|k| env.get(k).map(ToString::to_string));

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.face_recognition.url, "http://face:5001");
        assert!(config.auth.jwt_secret.ends_with("-env"));
        assert_eq!(config.general.database_url, "sqlite:data/facegate.db");
        assert!(!config.asset_store.enabled);
    }

    #[test]
    fn cloudinary_env_enables_asset_store() {
        let env: HashMap<&str, &str> = [
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|k| env.get(k).map(ToString::to_string));

        assert!(config.asset_store.enabled);
        assert_eq!(config.asset_store.cloud_name, "demo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_secret_and_missing_credentials() {
        let mut config = Config::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.asset_store.enabled = true;
        assert!(config.validate().is_err());
    }
}
