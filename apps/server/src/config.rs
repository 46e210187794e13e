use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use folioboard_core::constants::{DEFAULT_BATCH_SIZE, DEFAULT_CACHE_TTL, DEFAULT_INTER_BATCH_DELAY};
use folioboard_core::StalenessPolicy;
use folioboard_market_data::DEFAULT_ADAPTER_TIMEOUT;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub preferences_path: PathBuf,
    pub alpha_vantage_api_key: Option<String>,
    pub google_finance_enabled: bool,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub adapter_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub staleness: StalenessPolicy,
    /// JSON array of holdings loaded at startup instead of the built-in set
    pub holdings_seed: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            preferences_path: PathBuf::from("./data/preferences.json"),
            alpha_vantage_api_key: None,
            google_finance_enabled: true,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_INTER_BATCH_DELAY,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_sweep_interval: Duration::from_secs(60),
            staleness: StalenessPolicy::default(),
            holdings_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match env("FB_LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid FB_LISTEN_ADDR '{}'", addr))?,
            None => defaults.listen_addr,
        };
        let cors_allow = env("FB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let google_finance_enabled = env("FB_GOOGLE_FINANCE")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(defaults.google_finance_enabled);

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: millis("FB_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            preferences_path: env("FB_PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_path),
            alpha_vantage_api_key: env("FB_ALPHA_VANTAGE_API_KEY")
                .filter(|k| !k.trim().is_empty()),
            google_finance_enabled,
            batch_size: env("FB_BATCH_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.batch_size),
            batch_delay: millis("FB_BATCH_DELAY_MS", defaults.batch_delay),
            adapter_timeout: millis("FB_ADAPTER_TIMEOUT_MS", defaults.adapter_timeout),
            cache_ttl: secs("FB_CACHE_TTL_SECS", defaults.cache_ttl),
            cache_sweep_interval: secs("FB_CACHE_SWEEP_SECS", defaults.cache_sweep_interval),
            staleness: StalenessPolicy {
                full: secs("FB_STALE_FULL_SECS", defaults.staleness.full),
                partial: secs("FB_STALE_PARTIAL_SECS", defaults.staleness.partial),
                synthetic: secs("FB_STALE_SYNTHETIC_SECS", defaults.staleness.synthetic),
            },
            holdings_seed: env("FB_HOLDINGS_SEED").map(PathBuf::from),
        })
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn millis(name: &str, default: Duration) -> Duration {
    env(name)
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn secs(name: &str, default: Duration) -> Duration {
    env(name)
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
