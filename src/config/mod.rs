use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

/// Stand-in operator id used when `OWNER_ID` is not configured.
pub const DEFAULT_OWNER_ID: Uuid = Uuid::from_u128(0x507f1f77_bcf8_6cd7_9943_9011_0000_0000);

const DEV_SESSION_SECRET: &str = "development-session-secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// bcrypt hash of the shared dashboard password
    pub password_hash: Option<String>,
    pub session_secret: String,
    pub session_max_age_secs: i64,
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
    /// Principal that owns organisations and hostels created through the dashboard
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub api_base: String,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub default_folder: String,
    /// Body limit for `POST /api/upload`; images arrive base64-encoded in JSON
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("HOSTEL_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                _ => StoreBackend::Postgres,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("APP_PASSWORD_HASH") {
            if !v.trim().is_empty() {
                self.security.password_hash = Some(v.trim().to_string());
            }
        }
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_MAX_AGE_SECS") {
            self.security.session_max_age_secs = v.parse().unwrap_or(self.security.session_max_age_secs);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("OWNER_ID") {
            match v.parse() {
                Ok(id) => self.security.owner_id = id,
                Err(_) => tracing::warn!("OWNER_ID is not a valid UUID, keeping {}", self.security.owner_id),
            }
        }

        // Media overrides
        if let Ok(v) = env::var("CLOUDINARY_API_BASE") {
            self.media.api_base = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.media.cloud_name = Some(v);
        }
        if let Ok(v) = env::var("CLOUDINARY_API_KEY") {
            self.media.api_key = Some(v);
        }
        if let Ok(v) = env::var("CLOUDINARY_API_SECRET") {
            self.media.api_secret = Some(v);
        }
        if let Ok(v) = env::var("MEDIA_DEFAULT_FOLDER") {
            self.media.default_folder = v;
        }
        if let Ok(v) = env::var("MEDIA_MAX_UPLOAD_BYTES") {
            self.media.max_upload_bytes = v.parse().unwrap_or(self.media.max_upload_bytes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                password_hash: None,
                session_secret: DEV_SESSION_SECRET.to_string(),
                session_max_age_secs: 60 * 60 * 24, // 1 day
                secure_cookies: false,
                cors_origins: vec!["http://localhost:3000".to_string()],
                owner_id: DEFAULT_OWNER_ID,
            },
            media: MediaConfig::default(),
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.secure_cookies = true;
        config.security.cors_origins = vec![];
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.secure_cookies = true;
        config.security.cors_origins = vec![];
        config
    }

    /// True when the session secret is still the built-in development value
    pub fn uses_default_session_secret(&self) -> bool {
        self.security.session_secret == DEV_SESSION_SECRET
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudinary.com".to_string(),
            cloud_name: None,
            api_key: None,
            api_secret: None,
            default_folder: "hostels".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_cookies_are_not_secure() {
        let config = AppConfig::development();
        assert!(!config.security.secure_cookies);
        assert_eq!(config.security.session_max_age_secs, 86_400);
        assert_eq!(config.media.default_folder, "hostels");
        assert_eq!(config.media.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn production_cookies_are_secure() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.security.secure_cookies);
        assert!(config.uses_default_session_secret());
    }
}
