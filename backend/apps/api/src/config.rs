//! Server configuration from the environment

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use auth::AuthConfig;
use platform::crypto::from_base64;
use platform::password::HasherConfig;

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:3000/auth/reset-password";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub cleanup_interval: Duration,
    /// Reset links are `{reset_link_base}?token=...`
    pub reset_link_base: String,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_ip: IpAddr = parse_or(&get, "BIND_ADDR", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(&get, "PORT", 8001)?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let password_pepper = get("PASSWORD_PEPPER")
            .map(|b64| from_base64(b64.trim()))
            .transpose()
            .map_err(|e| anyhow!("PASSWORD_PEPPER is not valid base64: {e}"))?;

        let hashing_defaults = HasherConfig::default();
        let password_hashing = HasherConfig {
            memory_kib: parse_or(&get, "PASSWORD_HASH_MEMORY_KIB", hashing_defaults.memory_kib)?,
            iterations: parse_or(&get, "PASSWORD_HASH_ITERATIONS", hashing_defaults.iterations)?,
            parallelism: parse_or(
                &get,
                "PASSWORD_HASH_PARALLELISM",
                hashing_defaults.parallelism,
            )?,
        };

        let auth = AuthConfig {
            persistence_timeout: parse_secs(&get, "PERSISTENCE_TIMEOUT_SECS", 5)?,
            password_hashing,
            password_pepper,
            trust_forwarded_for: parse_or(&get, "TRUST_FORWARDED_FOR", false)?,
            ..AuthConfig::default()
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: SocketAddr::new(bind_ip, port),
            frontend_origins,
            cleanup_interval: parse_secs(&get, "CLEANUP_INTERVAL_SECS", 600)?,
            reset_link_base: get("RESET_LINK_BASE")
                .unwrap_or_else(|| DEFAULT_RESET_LINK_BASE.to_string()),
            auth,
        })
    }

    /// Prefix the reset token is appended to
    pub fn reset_link_prefix(&self) -> String {
        format!("{}?token=", self.reset_link_base)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

/// Non-zero duration in whole seconds
fn parse_secs(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    let secs: u64 = parse_or(get, key, default)?;
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
