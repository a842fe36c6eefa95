use std::{net::SocketAddr, path::PathBuf, time::Duration};

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_API_VERSION: &str = "2020-08-27";
pub const DEFAULT_PORT: u16 = 4242;
pub const DEFAULT_STATIC_DIR: &str = "client";
pub const DEFAULT_MAX_NETWORK_RETRIES: u32 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 80;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set (check .env)")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Identifies this integration to the payment platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "stripe-samples/terminal/server-driven".to_string(),
            version: "0.0.1".to_string(),
            url: "https://github.com/stripe-samples".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: Url,
    pub api_version: String,
    pub max_network_retries: u32,
    pub initial_retry_delay: Duration,
    pub timeout: Duration,
    pub app_info: AppInfo,
}

impl StripeConfig {
    /// Config pointing at `api_base` with defaults for everything else.
    pub fn new(secret_key: impl Into<String>, api_base: Url) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base,
            api_version: DEFAULT_API_VERSION.to_string(),
            max_network_retries: DEFAULT_MAX_NETWORK_RETRIES,
            initial_retry_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            app_info: AppInfo::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub stripe: StripeConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key =
            lookup("STRIPE_SECRET_KEY").ok_or(ConfigError::Missing("STRIPE_SECRET_KEY"))?;
        if secret_key.trim().is_empty() {
            return Err(ConfigError::Empty("STRIPE_SECRET_KEY"));
        }

        let bind_addr = parse_or(
            "BIND_ADDR",
            lookup("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        )?;
        let static_dir = lookup("STATIC_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        let api_base = parse_api_base(
            lookup("STRIPE_API_BASE")
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE),
        )?;

        let mut stripe = StripeConfig::new(secret_key, api_base);
        if let Some(version) = lookup("STRIPE_API_VERSION").filter(|v| !v.trim().is_empty()) {
            stripe.api_version = version;
        }
        stripe.max_network_retries = parse_or(
            "STRIPE_MAX_NETWORK_RETRIES",
            lookup("STRIPE_MAX_NETWORK_RETRIES"),
            DEFAULT_MAX_NETWORK_RETRIES,
        )?;
        let timeout_secs = parse_or(
            "STRIPE_TIMEOUT_SECS",
            lookup("STRIPE_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        stripe.timeout = Duration::from_secs(timeout_secs);

        Ok(Self {
            bind_addr,
            static_dir: PathBuf::from(static_dir),
            stripe,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw.filter(|v| !v.trim().is_empty()) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: "STRIPE_API_BASE",
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            name: "STRIPE_API_BASE",
            reason: format!("expected an absolute http(s) url, got {raw}"),
        });
    }
    Ok(url)
}
