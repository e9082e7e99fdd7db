//! Peer Directory
//!
//! Resolves sibling instances from a logical service name (typically a
//! headless service) and filters out this host's own addresses.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tracing::{debug, warn};

// == Peer Resolver ==
/// Source of the current peer set for the discovery worker.
#[async_trait]
pub trait PeerResolver: Send + Sync + 'static {
    /// Returns peer addresses (`host:port`) in resolution order.
    async fn resolve(&self) -> Vec<String>;
}

// == DNS Peer Resolver ==
/// Resolves peers through the system resolver.
#[derive(Debug, Clone)]
pub struct DnsPeerResolver {
    service_name: String,
    port: u16,
}

impl DnsPeerResolver {
    pub fn new(service_name: impl Into<String>, port: u16) -> Self {
        Self {
            service_name: service_name.into(),
            port,
        }
    }
}

#[async_trait]
impl PeerResolver for DnsPeerResolver {
    async fn resolve(&self) -> Vec<String> {
        resolve_peers(&self.service_name, self.port).await
    }
}

/// Resolves `service_name` and returns every non-local address with `port`.
///
/// Resolution failure yields an empty list, which leaves the instance
/// running as a single node.
pub async fn resolve_peers(service_name: &str, port: u16) -> Vec<String> {
    let resolved = match tokio::net::lookup_host((service_name, port)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect::<Vec<_>>(),
        Err(err) => {
            debug!(service = service_name, error = %err, "Peer resolution failed");
            return Vec::new();
        }
    };

    filter_peers(resolved, &local_ips(), port)
}

/// Drops local addresses, appends `port` and removes duplicates, keeping order.
pub fn filter_peers(
    resolved: impl IntoIterator<Item = IpAddr>,
    local: &HashSet<IpAddr>,
    port: u16,
) -> Vec<String> {
    let mut seen = HashSet::new();
    resolved
        .into_iter()
        .filter(|ip| !local.contains(ip))
        .filter(|ip| seen.insert(*ip))
        .map(|ip| SocketAddr::new(ip, port).to_string())
        .collect()
}

/// Addresses of this host's network interfaces, loopback excluded.
pub fn local_ips() -> HashSet<IpAddr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .map(|iface| iface.ip())
            .collect(),
        Err(err) => {
            warn!(error = %err, "Failed to list local interfaces");
            HashSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_filter_removes_local_and_appends_port() {
        let local: HashSet<IpAddr> = [ip("10.0.0.5")].into_iter().collect();
        let peers = filter_peers(
            vec![ip("10.0.0.4"), ip("10.0.0.5"), ip("10.0.0.6")],
            &local,
            4567,
        );
        assert_eq!(peers, vec!["10.0.0.4:4567", "10.0.0.6:4567"]);
    }

    #[test]
    fn test_filter_keeps_resolution_order_and_dedups() {
        let peers = filter_peers(
            vec![ip("10.0.0.9"), ip("10.0.0.1"), ip("10.0.0.9")],
            &HashSet::new(),
            5000,
        );
        assert_eq!(peers, vec!["10.0.0.9:5000", "10.0.0.1:5000"]);
    }

    #[test]
    fn test_filter_formats_ipv6() {
        let peers = filter_peers(vec![IpAddr::V6(Ipv6Addr::LOCALHOST)], &HashSet::new(), 4567);
        assert_eq!(peers, vec!["[::1]:4567"]);
    }

    #[test]
    fn test_local_ips_never_contain_loopback() {
        let local = local_ips();
        assert!(!local.contains(&IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert!(!local.contains(&IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[tokio::test]
    async fn test_resolve_localhost_keeps_loopback() {
        let peers = resolve_peers("localhost", 4567).await;
        assert!(
            peers.iter().any(|p| p == "127.0.0.1:4567" || p == "[::1]:4567"),
            "loopback peers should survive filtering: {peers:?}"
        );
    }

    #[tokio::test]
    async fn test_resolve_failure_is_empty() {
        let peers = resolve_peers("no-such-service.invalid", 4567).await;
        assert!(peers.is_empty());
    }
}
