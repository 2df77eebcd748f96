//! Online/offline indicator.
//!
//! Connectivity only controls whether the offline banner is visible; notes
//! never leave the device.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::debug;

/// Network reachability as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// The network is reachable.
    #[default]
    Online,
    /// The network is not reachable.
    Offline,
}

impl Connectivity {
    /// Build from a plain online flag.
    #[must_use]
    pub fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    /// Check whether the status is online.
    #[must_use]
    pub fn is_online(self) -> bool {
        self == Self::Online
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// The banner shown while offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfflineBanner {
    hidden: bool,
}

impl Default for OfflineBanner {
    fn default() -> Self {
        Self { hidden: true }
    }
}

impl OfflineBanner {
    /// Create a banner reflecting `status`.
    #[must_use]
    pub fn for_status(status: Connectivity) -> Self {
        Self {
            hidden: status.is_online(),
        }
    }

    /// Toggle visibility for a new status.
    pub fn update(&mut self, status: Connectivity) {
        self.hidden = status.is_online();
    }

    /// Check whether the banner is hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Check reachability by opening a TCP connection to `addr`.
///
/// Any failure, including a timeout or an unresolvable address, counts as
/// offline. No data is sent.
pub async fn probe(addr: &str, timeout: Duration) -> Connectivity {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Connectivity::Online,
        Ok(Err(e)) => {
            debug!("Connectivity probe to {} failed: {}", addr, e);
            Connectivity::Offline
        }
        Err(_) => {
            debug!("Connectivity probe to {} timed out", addr);
            Connectivity::Offline
        }
    }
}
