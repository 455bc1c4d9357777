use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub max_board_size: i32,
    pub shutdown_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, applying defaults for
    /// unset keys. Only `JWT_SECRET` is mandatory.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must be set to a non-empty value");
        }

        let config = Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://gomoku.db?mode=rwc".to_string()),
            jwt_secret,
            jwt_ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 120)?,
            max_board_size: parse_or(&lookup, "MAX_BOARD_SIZE", 50)?,
            shutdown_timeout_seconds: parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECONDS", 5)?,
        };

        if config.jwt_ttl_minutes <= 0 {
            bail!("JWT_TTL_MINUTES must be positive");
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn jwt_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.jwt_ttl_minutes)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {value}")),
        None => Ok(default),
    }
}
