//! Environment configuration
//!
//! Every setting has a local-development default. A variable that is set but
//! cannot be parsed is a startup error rather than a silent fallback.

use anyhow::{ensure, Context, Result};
use std::fmt::Debug;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::rate_limit_manager::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};

#[derive(Debug, Clone)]
pub struct WaitlistConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
    /// Bearer token required by the entries listing; `None` leaves it open
    pub admin_token: Option<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
}

impl WaitlistConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let window_secs: u64 =
            try_load(&lookup, "RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW.as_secs())?;
        ensure!(window_secs > 0, "RATE_LIMIT_WINDOW_SECS must be greater than zero");

        let admin_token = lookup("ADMIN_TOKEN").filter(|t| !t.trim().is_empty());
        if admin_token.is_none() {
            warn!("ADMIN_TOKEN not set, /api/waitlist/entries is open to any caller");
        }

        Ok(Self {
            host: try_load(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: try_load(&lookup, "PORT", 3000)?,
            database_path: try_load(
                &lookup,
                "DATABASE_PATH",
                PathBuf::from("./data/farmtech-waitlist.db"),
            )?,
            static_dir: try_load(&lookup, "STATIC_DIR", PathBuf::from("./public"))?,
            admin_token,
            rate_limit_max_requests: try_load(
                &lookup,
                "RATE_LIMIT_MAX_REQUESTS",
                DEFAULT_MAX_REQUESTS,
            )?,
            rate_limit_window: Duration::from_secs(window_secs),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Debug,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw:?}")),
        None => {
            info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
    }
}
