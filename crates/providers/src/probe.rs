//! TCP connectivity probe.
//!
//! Attempts a single handshake with a well-known host. Name resolution and
//! the handshake share one deadline, so the probe never outlives `timeout`.

use async_trait::async_trait;
use std::time::Duration;
use steward_config::ConnectivityConfig;
use steward_core::ConnectivityProbe;
use tokio::net::TcpStream;
use tracing::debug;

/// Probes reachability with a bounded TCP connect.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self::new(&config.host, config.port)
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn probe(&self, timeout: Duration) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));

        match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => {
                drop(stream);
                debug!(host = %self.host, port = self.port, "Connectivity probe succeeded");
                true
            }
            Ok(Err(e)) => {
                debug!(host = %self.host, port = self.port, error = %e, "Connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(
                    host = %self.host,
                    port = self.port,
                    timeout_ms = timeout.as_millis() as u64,
                    "Connectivity probe timed out"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reachable_listener_is_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new("127.0.0.1", port);
        assert!(probe.probe(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn refused_connection_is_offline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = TcpProbe::new("127.0.0.1", port);
        assert!(!probe.probe(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn unresolvable_host_is_offline_within_bound() {
        let probe = TcpProbe::new("no-such-host.invalid", 53);
        let started = Instant::now();
        assert!(!probe.probe(Duration::from_millis(500)).await);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn unroutable_address_respects_timeout() {
        // TEST-NET-1 is reserved and never answers
        let probe = TcpProbe::new("192.0.2.1", 53);
        let started = Instant::now();
        assert!(!probe.probe(Duration::from_millis(200)).await);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn from_config_uses_host_and_port() {
        let probe = TcpProbe::from_config(&ConnectivityConfig::default());
        assert_eq!(probe.host, "8.8.8.8");
        assert_eq!(probe.port, 53);
    }
}
