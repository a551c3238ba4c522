//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{LogFormat, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load configuration from an optional TOML file, then apply process
/// environment overrides, then validate.
pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => ServiceConfig::default(),
    };
    apply_env(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment-style overrides using `lookup` as the variable source.
///
/// Recognised variables: `HOST`, `PORT`, `CORS_ORIGINS`, `DATABASE_URL`,
/// `REDIS_URL`, `UPLOADS_DIR`, `AUTH_UPSTREAM_URL`, `LOG_LEVEL`,
/// `LOG_FORMAT`, `METRICS_ADDRESS`.
pub fn apply_env<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.listener.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidVar {
                name: "PORT",
                value: port.clone(),
                reason: e.to_string(),
            }
        })?;
    }
    if let Some(origins) = lookup("CORS_ORIGINS") {
        config.cors.origins = parse_origins(&origins);
    }
    if let Some(url) = lookup("DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(url) = lookup("REDIS_URL") {
        config.cache.url = url;
    }
    if let Some(dir) = lookup("UPLOADS_DIR") {
        config.static_files.dir = dir;
    }
    if let Some(url) = lookup("AUTH_UPSTREAM_URL") {
        config.auth.upstream_url = url;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.observability.log_format = match format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => {
                return Err(ConfigError::InvalidVar {
                    name: "LOG_FORMAT",
                    value: format,
                    reason: "expected \"json\" or \"pretty\"".to_string(),
                })
            }
        };
    }
    if let Some(address) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = address;
        config.observability.metrics_enabled = true;
    }
    Ok(())
}

/// Split a comma-separated origin list; an empty list falls back to `*`.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("PORT", "8080"),
                ("CORS_ORIGINS", "https://a.example, https://b.example,"),
                ("DATABASE_URL", "postgres://db:5432/app"),
                ("REDIS_URL", "redis://cache:6379"),
                ("LOG_FORMAT", "JSON"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.port, 8080);
        assert_eq!(
            config.cors.origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.database.url, "postgres://db:5432/app");
        assert_eq!(config.cache.url, "redis://cache:6379");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = apply_env(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "PORT", .. }));
    }

    #[test]
    fn test_empty_origins_fall_back_to_wildcard() {
        assert_eq!(parse_origins(" , "), vec!["*".to_string()]);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
port = 4000

[cors]
origins = ["https://admin.example"]

[cache]
url = "redis://cache:6380"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.port, 4000);
        assert_eq!(config.cors.origins, vec!["https://admin.example".to_string()]);
        assert_eq!(config.cache.url, "redis://cache:6380");
        assert_eq!(config.cache.max_retries_per_request, 3);
    }

    #[test]
    fn test_load_config_reports_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nurl = \"mysql://nope\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
    }
}
