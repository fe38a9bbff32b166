//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Configuration management for the clinic service
//!
//! This module provides configuration structures and validation for
//! the clinic service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "PETCLINIC";

/// Secret used when none is configured. Only fit for local development.
pub const DEVELOPMENT_JWT_SECRET: &str = "petclinic-development-secret-change-me";

/// Clinic service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: StorageBackendType,

    /// SQLite configuration
    pub sqlite: SqliteConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Memory,
            sqlite: SqliteConfig::default(),
        }
    }
}

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum StorageBackendType {
    /// In-memory storage, lost on exit
    Memory,

    /// SQLite database file
    Sqlite,
}

impl std::fmt::Display for StorageBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendType::Memory => write!(f, "memory"),
            StorageBackendType::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// SQLite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database path
    pub database_path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub connection_timeout_secs: u64,

    /// Create the database file when it does not exist
    pub create_if_missing: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("petclinic.db"),
            max_connections: 5,
            connection_timeout_secs: 30,
            create_if_missing: true,
        }
    }
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API host
    pub host: String,

    /// API port
    pub port: u16,

    /// Path prefix of every resource route. Empty or `/` mounts at the root.
    pub base_path: String,

    /// Maximum request body size in bytes
    pub max_request_size: usize,

    /// Enable CORS
    pub enable_cors: bool,

    /// Allowed origins, `*` for any
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            base_path: "/api".to_string(),
            max_request_size: 1024 * 1024,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ApiConfig {
    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base path without a trailing slash, `None` when routes mount at the root
    pub fn normalized_base_path(&self) -> Option<String> {
        let trimmed = self.base_path.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else if trimmed.starts_with('/') {
            Some(trimmed.to_string())
        } else {
            Some(format!("/{}", trimmed))
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Require a bearer token on resource routes
    pub enable_auth: bool,

    /// HS256 signing secret
    pub jwt_secret: String,

    /// Expected `iss` claim
    pub jwt_issuer: String,

    /// Expected `aud` claim
    pub jwt_audience: String,

    /// Lifetime of minted tokens
    pub token_ttl_secs: u64,

    /// Clock skew tolerated on `exp` and `nbf`
    pub leeway_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_auth: true,
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            jwt_issuer: "petclinic".to_string(),
            jwt_audience: "petclinic-api".to_string(),
            token_ttl_secs: 3600,
            leeway_secs: 30,
        }
    }
}

impl SecurityConfig {
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Enable metrics
    pub enable_metrics: bool,

    /// Log level, overridden by `RUST_LOG`
    pub log_level: String,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// JSON format
    Json,

    /// Text format
    Text,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Text => write!(f, "text"),
        }
    }
}

impl ClinicConfig {
    /// Load configuration from file, with environment overrides
    pub fn from_file(path: &PathBuf) -> Result<Self, config::ConfigError> {
        Self::from_sources(Some(path), ENV_PREFIX).map_err(|e| match e {
            config::ConfigError::NotFound(key) => config::ConfigError::NotFound(format!(
                "{} (in config file: {})",
                key,
                path.display()
            )),
            config::ConfigError::FileParse { uri, cause } => config::ConfigError::FileParse {
                uri: Some(format!(
                    "{} (config file: {})",
                    uri.as_deref().unwrap_or("unknown"),
                    path.display()
                )),
                cause,
            },
            _ => e,
        })
    }

    /// Load configuration from multiple sources with precedence
    pub fn from_sources(
        config_file: Option<&PathBuf>,
        env_prefix: &str,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add defaults first
        builder = builder.add_source(config::File::from_str(
            &Self::generate_example(),
            config::FileFormat::Toml,
        ));

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("api.cors_origins"),
        );

        let settings = builder.build()?;
        settings.try_deserialize()
    }

    /// Load configuration with defaults
    pub fn load_with_defaults() -> Result<Self, config::ConfigError> {
        let config_paths = [
            PathBuf::from("config/petclinic.toml"),
            PathBuf::from("petclinic.toml"),
            PathBuf::from("config/petclinic.yaml"),
            PathBuf::from("petclinic.yaml"),
            PathBuf::from("config/petclinic.json"),
            PathBuf::from("petclinic.json"),
        ];

        for path in &config_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Self::from_sources(None, ENV_PREFIX)
    }

    /// Generate example configuration
    pub fn generate_example() -> String {
        format!(
            r#"# Pet clinic configuration example
# This file shows all available configuration options

[storage]
# Storage backend type: Memory, Sqlite
backend = "Memory"

[storage.sqlite]
database_path = "petclinic.db"
max_connections = 5
connection_timeout_secs = 30
create_if_missing = true

[api]
host = "127.0.0.1"
port = 8000
base_path = "/api"
max_request_size = 1048576  # 1MB
enable_cors = true
cors_origins = ["*"]

[security]
enable_auth = true
jwt_secret = "{}"
jwt_issuer = "petclinic"
jwt_audience = "petclinic-api"
token_ttl_secs = 3600
leeway_secs = 30

[monitoring]
enable_metrics = true
log_level = "info"
log_format = "Text"  # Text, Json
"#,
            DEVELOPMENT_JWT_SECRET
        )
    }

    /// Get configuration documentation
    pub fn get_documentation() -> String {
        r#"# Pet Clinic Configuration Documentation

## Overview
The clinic service can be configured using TOML, YAML, or JSON files, as well as environment variables.

## Configuration Sources (in order of precedence)
1. Environment variables (prefixed with PETCLINIC__)
2. Configuration file
3. Default values

## Storage
- `storage.backend`: `Memory` (default) or `Sqlite`
- `storage.sqlite.database_path`: database file, default `petclinic.db`
- `storage.sqlite.max_connections`: pool size, default 5
- `storage.sqlite.connection_timeout_secs`: pool acquire timeout, default 30
- `storage.sqlite.create_if_missing`: create the file on first start, default true

## API
- `api.host`, `api.port`: listen address, default `127.0.0.1:8000`
- `api.base_path`: prefix of resource routes, default `/api`; empty or `/` mounts at the root
- `api.max_request_size`: maximum body size in bytes, default 1MB
- `api.enable_cors`, `api.cors_origins`: CORS policy, default any origin

## Security
- `security.enable_auth`: require `Authorization: Bearer <token>` on resource routes, default true
- `security.jwt_secret`: HS256 secret; the built-in default is for development only
- `security.jwt_issuer`, `security.jwt_audience`: expected `iss` and `aud` claims
- `security.token_ttl_secs`: lifetime of tokens minted by `petclinic token`
- `security.leeway_secs`: tolerated clock skew

## Monitoring
- `monitoring.enable_metrics`: record request and entity metrics
- `monitoring.log_level`: `trace`, `debug`, `info`, `warn` or `error`; `RUST_LOG` wins
- `monitoring.log_format`: `Text` or `Json`

## Environment Variables
Nested keys are separated by a double underscore:

```bash
export PETCLINIC__API__PORT=9000
export PETCLINIC__STORAGE__BACKEND=Sqlite
export PETCLINIC__SECURITY__JWT_SECRET=a-long-random-secret
```
"#
        .to_string()
    }

    /// Validate configuration with detailed error reporting
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        self.validate_storage(&mut errors);
        self.validate_api(&mut errors);
        self.validate_security(&mut errors);
        self.validate_monitoring(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Configuration validation failed with {} error(s):\n{}",
                errors.len(),
                errors.join("\n")
            ))
        }
    }

    /// Validate storage configuration
    fn validate_storage(&self, errors: &mut Vec<String>) {
        if self.storage.backend != StorageBackendType::Sqlite {
            return;
        }
        let sqlite = &self.storage.sqlite;

        if sqlite.database_path.as_os_str().is_empty() {
            errors.push("storage.sqlite.database_path: cannot be empty".to_string());
        }

        if sqlite.max_connections == 0 {
            errors.push("storage.sqlite.max_connections: must be greater than 0".to_string());
        }

        if sqlite.connection_timeout_secs == 0 {
            errors
                .push("storage.sqlite.connection_timeout_secs: must be greater than 0".to_string());
        }
    }

    /// Validate API configuration
    fn validate_api(&self, errors: &mut Vec<String>) {
        if self.api.host.is_empty() {
            errors.push("api.host: cannot be empty".to_string());
        }

        if self.api.port == 0 {
            errors.push("api.port: must be greater than 0".to_string());
        }

        if !self.api.base_path.is_empty() && !self.api.base_path.starts_with('/') {
            errors.push("api.base_path: must be empty or start with '/'".to_string());
        }

        if self.api.max_request_size == 0 {
            errors.push("api.max_request_size: must be greater than 0".to_string());
        }

        if self.api.enable_cors && self.api.cors_origins.is_empty() {
            errors.push(
                "api.cors_origins: must contain at least one origin when CORS is enabled"
                    .to_string(),
            );
        }
    }

    /// Validate security configuration
    fn validate_security(&self, errors: &mut Vec<String>) {
        if !self.security.enable_auth {
            return;
        }

        if self.security.jwt_secret.is_empty() {
            errors.push("security.jwt_secret: required when auth is enabled".to_string());
        }

        if self.security.jwt_issuer.is_empty() {
            errors.push("security.jwt_issuer: cannot be empty".to_string());
        }

        if self.security.jwt_audience.is_empty() {
            errors.push("security.jwt_audience: cannot be empty".to_string());
        }

        if self.security.token_ttl_secs == 0 {
            errors.push("security.token_ttl_secs: must be greater than 0".to_string());
        }
    }

    /// Validate monitoring configuration
    fn validate_monitoring(&self, errors: &mut Vec<String>) {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.monitoring.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "monitoring.log_level: must be one of {:?}",
                valid_log_levels
            ));
        }
    }
}
