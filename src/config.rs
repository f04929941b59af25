//! Configuration management for Brand Server

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub extractor: ExtractorConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Path to the pdftotext executable (default: "pdftotext" - uses PATH)
    pub pdftotext_path: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Deadline for a single store call
    pub db_timeout: Duration,
    /// Deadline for extraction plus upsert on the upload route
    pub upload_timeout: Duration,
    pub max_upload_bytes: usize,
}

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            pdftotext_path: "pdftotext".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            db_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(30),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let server_defaults = ServerConfig::default();
        let extractor_defaults = ExtractorConfig::default();
        let limits_defaults = LimitsConfig::default();

        Ok(Config {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or(server_defaults.host),
                port: parse_or(get("SERVER_PORT"), "SERVER_PORT", server_defaults.port)?,
                cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                    .map(|v| split_origins(&v))
                    .unwrap_or(server_defaults.cors_allowed_origins),
            },
            database: DatabaseConfig {
                uri: required("MONGODB_URI")?,
                database: required("MONGODB_DATABASE")?,
                collection: required("MONGODB_COLLECTION")?,
                connect_timeout: secs_or(
                    get("DB_CONNECT_TIMEOUT_SECS"),
                    "DB_CONNECT_TIMEOUT_SECS",
                    10,
                )?,
            },
            extractor: ExtractorConfig {
                pdftotext_path: get("PDFTOTEXT_PATH").unwrap_or(extractor_defaults.pdftotext_path),
                timeout: secs_or(
                    get("PDF_EXTRACT_TIMEOUT_SECS"),
                    "PDF_EXTRACT_TIMEOUT_SECS",
                    extractor_defaults.timeout.as_secs(),
                )?,
            },
            limits: LimitsConfig {
                db_timeout: secs_or(
                    get("DB_TIMEOUT_SECS"),
                    "DB_TIMEOUT_SECS",
                    limits_defaults.db_timeout.as_secs(),
                )?,
                upload_timeout: secs_or(
                    get("UPLOAD_TIMEOUT_SECS"),
                    "UPLOAD_TIMEOUT_SECS",
                    limits_defaults.upload_timeout.as_secs(),
                )?,
                max_upload_bytes: parse_or(
                    get("MAX_UPLOAD_BYTES"),
                    "MAX_UPLOAD_BYTES",
                    limits_defaults.max_upload_bytes,
                )?,
            },
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}

fn secs_or(
    value: Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_or(value.clone(), key, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.unwrap_or_default(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("MONGODB_URI", "mongodb://localhost:27017"),
        ("MONGODB_DATABASE", "orders"),
        ("MONGODB_COLLECTION", "brands"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["http://localhost:3000", "http://localhost:3001"]
        );
        assert_eq!(config.database.collection, "brands");
        assert_eq!(config.extractor.pdftotext_path, "pdftotext");
        assert_eq!(config.extractor.timeout, Duration::from_secs(15));
        assert_eq!(config.limits.db_timeout, Duration::from_secs(5));
        assert_eq!(config.limits.upload_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_required_value() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MONGODB_COLLECTION")));
    }

    #[test]
    fn test_blank_required_value_is_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("MONGODB_URI", "  ");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MONGODB_URI")));
    }

    #[test]
    fn test_overrides_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "9090"));
        pairs.push((
            "CORS_ALLOWED_ORIGINS",
            "https://admin.example.com, https://shop.example.com",
        ));
        pairs.push(("PDF_EXTRACT_TIMEOUT_SECS", "3"));
        pairs.push(("MAX_UPLOAD_BYTES", "1024"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://admin.example.com", "https://shop.example.com"]
        );
        assert_eq!(config.extractor.timeout, Duration::from_secs(3));
        assert_eq!(config.limits.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "eighty"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_PORT", .. }));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DB_TIMEOUT_SECS", "0"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_TIMEOUT_SECS", .. }));
    }
}
