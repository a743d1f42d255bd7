//! Server configuration loaded from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use canvass_access::AccessConfig;
use canvass_db::DbConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db: DbConfig,
    pub access: AccessConfig,
    /// `None` allows any origin, as the mobile client is served from
    /// several hosts.
    pub allowed_origins: Option<Vec<String>>,
}

impl ServerConfig {
    /// Load from process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host: IpAddr = parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = parse_or(&lookup, "PORT", 8081)?;

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: lookup("SURREAL_URL").unwrap_or(db_defaults.url),
            namespace: lookup("SURREAL_NS").unwrap_or(db_defaults.namespace),
            database: lookup("SURREAL_DB").unwrap_or(db_defaults.database),
            username: lookup("SURREAL_USER").unwrap_or(db_defaults.username),
            password: lookup("SURREAL_PASS").unwrap_or(db_defaults.password),
        };

        let access_defaults = AccessConfig::default();
        let access = AccessConfig {
            rate_limit: parse_or(&lookup, "RATE_LIMIT", access_defaults.rate_limit)?,
            rate_window_secs: parse_or(
                &lookup,
                "RATE_WINDOW_SECS",
                access_defaults.rate_window_secs,
            )?,
            store_timeout_ms: parse_or(
                &lookup,
                "STORE_TIMEOUT_MS",
                access_defaults.store_timeout_ms,
            )?,
        };
        if access.store_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "STORE_TIMEOUT_MS".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if access.rate_window().is_none() {
            return Err(ConfigError::InvalidValue {
                key: "RATE_WINDOW_SECS".into(),
                reason: format!("{} seconds is out of range", access.rate_window_secs),
            });
        }

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            });

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            db,
            access,
            allowed_origins,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.into(),
                reason: format!("'{raw}': {e}"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 8081);
        assert_eq!(cfg.access.rate_limit, 10);
        assert_eq!(cfg.access.rate_window_secs, 60);
        assert_eq!(cfg.db.namespace, "canvass");
        assert!(cfg.allowed_origins.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("RATE_LIMIT", "3"),
            ("SURREAL_URL", "db:8000"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.access.rate_limit, 3);
        assert_eq!(cfg.db.url, "db:8000");
        assert_eq!(
            cfg.allowed_origins.unwrap(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = load(&[("STORE_TIMEOUT_MS", "0")]).unwrap_err();
        assert!(err.to_string().contains("STORE_TIMEOUT_MS"));
    }

    #[test]
    fn oversized_rate_window_is_rejected() {
        for raw in ["100000000000000000", "18446744073709551615"] {
            let err = load(&[("RATE_WINDOW_SECS", raw)]).unwrap_err();
            assert!(err.to_string().contains("RATE_WINDOW_SECS"), "{raw}");
        }

        let cfg = load(&[("RATE_WINDOW_SECS", "3600")]).unwrap();
        assert_eq!(cfg.access.rate_window_secs, 3600);
    }
}
