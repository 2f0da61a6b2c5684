use std::{env, net::SocketAddr};

use mth_srs::{SessionLimits, SrsParams};
use serde::Deserialize;

/// Deployment environment, selects logging format and CORS strictness
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("Invalid parameters: {0}")]
    Params(#[from] envy::Error),
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Absent when the server should run on the in-memory store
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub env: Environment,
    pub allowed_origins: String,
    pub db_max_connections: u32,
    pub review_rate_per_second: u64,
    pub review_rate_burst: u32,
    pub srs_params: SrsParams,
    pub session_limits: SessionLimits,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = match env::var("ENV").ok().as_deref() {
            None | Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "ENV",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            bind_addr: parse_var("BIND_ADDR", "0.0.0.0:3000".parse().ok())?,
            env,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", Some(10))?,
            review_rate_per_second: parse_var("REVIEW_RATE_PER_SECOND", Some(2))?,
            review_rate_burst: parse_var("REVIEW_RATE_BURST", Some(4))?,
            srs_params: envy::prefixed("SRS_").from_env()?,
            session_limits: envy::prefixed("SESSION_").from_env()?,
        })
    }

    /// `ALLOWED_ORIGINS` split on commas
    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: Option<T>) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => default.ok_or(ConfigError::Invalid {
            name,
            value: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_origins(origins: &str) -> ApiConfig {
        ApiConfig {
            database_url: None,
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            env: Environment::Development,
            allowed_origins: origins.to_string(),
            db_max_connections: 10,
            review_rate_per_second: 2,
            review_rate_burst: 4,
            srs_params: SrsParams::default(),
            session_limits: SessionLimits::default(),
        }
    }

    #[test]
    fn test_parsed_allowed_origins() {
        let config = config_with_origins("http://localhost:8080, https://mathisi.app,,");
        assert_eq!(
            config.parsed_allowed_origins(),
            vec!["http://localhost:8080", "https://mathisi.app"]
        );
    }

    #[test]
    fn test_environment_flags() {
        assert!(Environment::Development.is_development());
        assert!(!Environment::Development.is_production());
        assert!(Environment::Production.is_production());
    }
}
