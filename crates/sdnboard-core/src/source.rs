// ── Collection sources ──
//
// One marker type per panel: which endpoint to read, which record shape
// to parse it into, and the label used in the panel's fetch error.

use std::future::Future;

use sdnboard_api::ControllerClient;

use crate::convert::{flatten_switch_ports, flatten_thresholds};
use crate::error::CoreError;
use crate::model::{
    BlockedHost, ConnectedHost, HostAddress, HostAttachment, PortThreshold, Record, ServicePort,
    SwitchPort,
};

/// A remote collection a [`Panel`](crate::Panel) can hold a snapshot of.
pub trait Collection: Send + Sync + 'static {
    type Record: Record;

    /// Noun used in "Failed to fetch <label>. Please try again."
    const LABEL: &'static str;

    fn fetch(
        client: &ControllerClient,
    ) -> impl Future<Output = Result<Vec<Self::Record>, CoreError>> + Send;
}

/// Error text shown on a panel whose last fetch failed.
pub fn fetch_error_message<C: Collection>() -> String {
    format!("Failed to fetch {}. Please try again.", C::LABEL)
}

fn into_records<T, R: From<T>>(rows: Vec<T>) -> Vec<R> {
    rows.into_iter().map(R::from).collect()
}

/// `/connected_ips`, rich rows.
pub struct ConnectedHosts;

impl Collection for ConnectedHosts {
    type Record = ConnectedHost;
    const LABEL: &'static str = "connected IPs";

    async fn fetch(client: &ControllerClient) -> Result<Vec<ConnectedHost>, CoreError> {
        Ok(into_records(client.list_connected_ips().await?))
    }
}

/// `/connected_ips`, bare addresses.
pub struct ConnectedAddresses;

impl Collection for ConnectedAddresses {
    type Record = HostAddress;
    const LABEL: &'static str = "connected IPs";

    async fn fetch(client: &ControllerClient) -> Result<Vec<HostAddress>, CoreError> {
        Ok(into_records(client.list_connected_addresses().await?))
    }
}

/// `/blocked_ips`, rich rows.
pub struct BlockedHosts;

impl Collection for BlockedHosts {
    type Record = BlockedHost;
    const LABEL: &'static str = "blocked IPs";

    async fn fetch(client: &ControllerClient) -> Result<Vec<BlockedHost>, CoreError> {
        Ok(into_records(client.list_blocked_ips().await?))
    }
}

/// `/blocked_ips`, bare addresses.
pub struct BlockedAddresses;

impl Collection for BlockedAddresses {
    type Record = HostAddress;
    const LABEL: &'static str = "blocked IPs";

    async fn fetch(client: &ControllerClient) -> Result<Vec<HostAddress>, CoreError> {
        Ok(into_records(client.list_blocked_addresses().await?))
    }
}

/// `/ports`, flat service-port list.
pub struct ServicePorts;

impl Collection for ServicePorts {
    type Record = ServicePort;
    const LABEL: &'static str = "ports";

    async fn fetch(client: &ControllerClient) -> Result<Vec<ServicePort>, CoreError> {
        Ok(into_records(client.list_service_ports().await?))
    }
}

/// `/ports`, per-switch map.
pub struct SwitchPorts;

impl Collection for SwitchPorts {
    type Record = SwitchPort;
    const LABEL: &'static str = "ports";

    async fn fetch(client: &ControllerClient) -> Result<Vec<SwitchPort>, CoreError> {
        Ok(flatten_switch_ports(client.list_switch_ports().await?))
    }
}

/// `/thresholds`.
pub struct Thresholds;

impl Collection for Thresholds {
    type Record = PortThreshold;
    const LABEL: &'static str = "thresholds";

    async fn fetch(client: &ControllerClient) -> Result<Vec<PortThreshold>, CoreError> {
        Ok(flatten_thresholds(client.list_thresholds().await?))
    }
}

/// `/host_to_switch`.
pub struct HostConnections;

impl Collection for HostConnections {
    type Record = HostAttachment;
    const LABEL: &'static str = "host connections";

    async fn fetch(client: &ControllerClient) -> Result<Vec<HostAttachment>, CoreError> {
        Ok(into_records(client.host_to_switch().await?))
    }
}
