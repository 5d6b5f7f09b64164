//! Network reachability checks.
//!
//! The synchronizer asks [`Connectivity::is_online`] before every remote
//! attempt. Implementations must not cache the answer between calls.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{host_and_port, parse_http_url};

/// Synchronous reachability predicate
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity toggled by the application (or a test)
#[derive(Debug)]
pub struct ManualConnectivity {
    online: AtomicBool,
}

impl ManualConnectivity {
    pub const fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for ManualConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ManualConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Reachability probe that opens a TCP connection to the API host
#[derive(Debug, Clone)]
pub struct ProbeConnectivity {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ProbeConnectivity {
    /// Probe the host of an http(s) base URL
    pub fn for_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let (host, port) = parse_http_url(base_url)
            .and_then(|url| host_and_port(&url))
            .ok_or_else(|| {
                Error::InvalidInput(format!("cannot derive probe host from {base_url}"))
            })?;
        Ok(Self {
            host,
            port,
            timeout,
        })
    }
}

impl Connectivity for ProbeConnectivity {
    fn is_online(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(error) => {
                tracing::debug!("Connectivity probe could not resolve {}: {error}", self.host);
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }

        tracing::debug!("Connectivity probe to {}:{} failed", self.host, self.port);
        false
    }
}
