// Host endpoints
//
// `/connected_ips` and `/blocked_ips` come in two shapes depending on the
// controller build: rich objects or bare IP strings. Each shape has its
// own method; callers pick the one their panel renders.

use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{BlockedIp, ConnectedIp, HostAttachment, IpRequest};

impl ControllerClient {
    /// `GET /connected_ips` as `[{ip, hostname, lastSeen}]`.
    pub async fn list_connected_ips(&self) -> Result<Vec<ConnectedIp>, Error> {
        self.get("connected_ips").await
    }

    /// `GET /connected_ips` as `["10.0.0.1", ...]`.
    pub async fn list_connected_addresses(&self) -> Result<Vec<String>, Error> {
        self.get("connected_ips").await
    }

    /// `GET /blocked_ips` as `[{ip, reason, blockedAt}]`.
    pub async fn list_blocked_ips(&self) -> Result<Vec<BlockedIp>, Error> {
        self.get("blocked_ips").await
    }

    /// `GET /blocked_ips` as `["10.0.0.1", ...]`.
    pub async fn list_blocked_addresses(&self) -> Result<Vec<String>, Error> {
        self.get("blocked_ips").await
    }

    /// `POST /block_ip` with `{"ip": ...}`. The reply text is not interpreted.
    pub async fn block_ip(&self, ip: &str) -> Result<(), Error> {
        debug!(ip, "blocking host");
        self.post_text("block_ip", &IpRequest { ip }).await?;
        Ok(())
    }

    /// `POST /unblock_ip` with `{"ip": ...}`.
    pub async fn unblock_ip(&self, ip: &str) -> Result<(), Error> {
        debug!(ip, "unblocking host");
        self.post_text("unblock_ip", &IpRequest { ip }).await?;
        Ok(())
    }

    /// `GET /host_to_switch`: where each learned host IP is attached.
    pub async fn host_to_switch(&self) -> Result<Vec<HostAttachment>, Error> {
        self.get("host_to_switch").await
    }
}
