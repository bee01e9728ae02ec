use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::notifications::vapid::{VapidCredentials, VapidError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    ReadFile { path: String, source: std::io::Error },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    ParseFile { path: String, source: toml::de::Error },
    #[error("Failed to load config from environment: {0}")]
    Environment(#[from] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Invalid VAPID keys: {0}")]
    InvalidVapidKeys(#[from] VapidError),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Used as the title of every push notification.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    pub vapid_public_key: Option<String>,
    pub vapid_private_key: Option<String>,
    #[serde(default = "default_vapid_subject")]
    pub vapid_subject: String,

    /// bcrypt hash of the shared admin password (see `pairplan hash-password`).
    pub admin_password_hash: Option<String>,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    pub cors_origin: Option<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_addr: Option<String>,
    app_name: Option<String>,
    vapid_public_key: Option<String>,
    vapid_private_key: Option<String>,
    vapid_subject: Option<String>,
    admin_password_hash: Option<String>,
    log_dir: Option<String>,
    cors_origin: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_app_name() -> String {
    "Pairplan".to_string()
}

fn default_vapid_subject() -> String {
    "mailto:admin@localhost".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = match config_path {
            Some(path_str) if Path::new(path_str).exists() => {
                let contents = fs::read_to_string(path_str).map_err(|source| ConfigError::ReadFile {
                    path: path_str.to_string(),
                    source,
                })?;
                toml::from_str(&contents).map_err(|source| ConfigError::ParseFile {
                    path: path_str.to_string(),
                    source,
                })?
            }
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    fn merge(env: PartialServerConfig, file: PartialServerConfig) -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            database_url: non_blank(env.database_url.or(file.database_url))
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: non_blank(env.jwt_secret.or(file.jwt_secret))
                .ok_or(ConfigError::Missing("JWT_SECRET"))?,
            listen_addr: env.listen_addr.or(file.listen_addr).unwrap_or_else(default_listen_addr),
            app_name: non_blank(env.app_name.or(file.app_name)).unwrap_or_else(default_app_name),
            vapid_public_key: non_blank(env.vapid_public_key.or(file.vapid_public_key)),
            vapid_private_key: non_blank(env.vapid_private_key.or(file.vapid_private_key)),
            vapid_subject: non_blank(env.vapid_subject.or(file.vapid_subject))
                .unwrap_or_else(default_vapid_subject),
            admin_password_hash: non_blank(env.admin_password_hash.or(file.admin_password_hash)),
            log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
            cors_origin: non_blank(env.cors_origin.or(file.cors_origin)),
        })
    }

    /// The signing credentials for web push, `None` when either key is not configured.
    pub fn vapid_credentials(&self) -> Result<Option<VapidCredentials>, ConfigError> {
        match (&self.vapid_public_key, &self.vapid_private_key) {
            (Some(public_key), Some(private_key)) => Ok(Some(VapidCredentials::new(
                public_key,
                private_key,
                &self.vapid_subject,
            )?)),
            _ => Ok(None),
        }
    }
}
