//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Port used for discovered peers when none (or a reserved one) is configured.
pub const DEFAULT_HEADLESS_SERVICE_PORT: u16 = 4567;

/// Lowest discovery port accepted before falling back to the default.
const MIN_HEADLESS_SERVICE_PORT: u16 = 4000;

/// Discovery refresh interval used when the configured one is zero.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Cache configuration parameters.
///
/// Consumed once by `CacheManager::start`; nothing here changes afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening address for the peer HTTP listener (e.g. `127.0.0.1:8080`)
    pub addr: Option<String>,
    /// Static peer addresses; the listening address is filtered out
    pub peer_addresses: Vec<String>,
    /// Logical service name resolved for dynamic peer discovery
    pub headless_service_name: Option<String>,
    /// Port appended to every discovered peer address
    pub headless_service_port: u16,
    /// TTL sweep interval in seconds, 0 disables the sweep
    pub cleanup_interval: u64,
    /// Peer discovery refresh interval in seconds
    pub watch_interval: u64,
    /// Coalesce concurrent loads of the same key into one loader call
    pub coalesce_loads: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ADDR` - Listening address (default: unset)
    /// - `CACHE_PEERS` - Comma-separated static peers (default: empty)
    /// - `CACHE_HEADLESS_SERVICE` - Service name for discovery (default: unset)
    /// - `CACHE_HEADLESS_PORT` - Discovery port (default: 4567)
    /// - `CACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 0, disabled)
    /// - `CACHE_WATCH_INTERVAL` - Discovery frequency in seconds (default: 1)
    /// - `CACHE_COALESCE_LOADS` - `true` to coalesce concurrent loads (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: non_empty_var("CACHE_ADDR"),
            peer_addresses: non_empty_var("CACHE_PEERS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            headless_service_name: non_empty_var("CACHE_HEADLESS_SERVICE"),
            headless_service_port: env::var("CACHE_HEADLESS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.headless_service_port),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            watch_interval: env::var("CACHE_WATCH_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.watch_interval),
            coalesce_loads: env::var("CACHE_COALESCE_LOADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.coalesce_loads),
        }
    }

    /// Sweep interval, or `None` when the sweep is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.cleanup_interval {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Discovery refresh interval, falling back to one second.
    pub fn discovery_interval(&self) -> Duration {
        match self.watch_interval {
            0 => DEFAULT_WATCH_INTERVAL,
            secs => Duration::from_secs(secs),
        }
    }

    /// Port appended to discovered peers; reserved ports fall back to 4567.
    pub fn discovery_port(&self) -> u16 {
        if self.headless_service_port < MIN_HEADLESS_SERVICE_PORT {
            DEFAULT_HEADLESS_SERVICE_PORT
        } else {
            self.headless_service_port
        }
    }

    /// Listening address in discovery mode.
    ///
    /// Peers dial each other on the discovery port, so the port always comes
    /// from `discovery_port()`; only the host is taken from `addr`.
    pub fn discovery_listen_addr(&self) -> String {
        let host = self
            .addr
            .as_deref()
            .and_then(|addr| addr.rsplit_once(':'))
            .map(|(host, _)| host)
            .filter(|host| !host.is_empty())
            .unwrap_or("0.0.0.0");
        format!("{}:{}", host, self.discovery_port())
    }

    /// Static peers with the local listening address removed.
    pub fn static_peers(&self) -> Vec<String> {
        self.peer_addresses
            .iter()
            .filter(|peer| Some(peer.as_str()) != self.addr.as_deref())
            .cloned()
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: None,
            peer_addresses: Vec::new(),
            headless_service_name: None,
            headless_service_port: DEFAULT_HEADLESS_SERVICE_PORT,
            cleanup_interval: 0,
            watch_interval: 1,
            coalesce_loads: false,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
