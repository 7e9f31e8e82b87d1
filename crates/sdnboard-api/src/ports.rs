// Port endpoints
//
// `/ports` is either a flat list of service ports or a per-switch map of
// OpenFlow port descriptions with the blocked subset. Blocking uses the
// same two paths with a body matching the shape in use.

use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{
    Dpid, PortInventory, ServicePort, ServicePortRequest, SwitchPortRequest,
};

impl ControllerClient {
    /// `GET /ports` as `[{port, service, protocol, blocked}]`.
    pub async fn list_service_ports(&self) -> Result<Vec<ServicePort>, Error> {
        self.get("ports").await
    }

    /// `GET /ports` as `{"<dpid>": {all_ports, blocked_ports}}`.
    pub async fn list_switch_ports(&self) -> Result<PortInventory, Error> {
        self.get("ports").await
    }

    /// `POST /block_port` with `{"port": ...}`.
    pub async fn block_service_port(&self, port: u16) -> Result<(), Error> {
        debug!(port, "blocking service port");
        self.post_text("block_port", &ServicePortRequest { port })
            .await?;
        Ok(())
    }

    /// `POST /unblock_port` with `{"port": ...}`.
    pub async fn unblock_service_port(&self, port: u16) -> Result<(), Error> {
        debug!(port, "unblocking service port");
        self.post_text("unblock_port", &ServicePortRequest { port })
            .await?;
        Ok(())
    }

    /// `POST /block_port` with `{"dpid": ..., "port_no": ...}`.
    pub async fn block_switch_port(&self, dpid: Dpid, port_no: u32) -> Result<(), Error> {
        debug!(%dpid, port_no, "blocking switch port");
        self.post_text("block_port", &SwitchPortRequest { dpid, port_no })
            .await?;
        Ok(())
    }

    /// `POST /unblock_port` with `{"dpid": ..., "port_no": ...}`.
    pub async fn unblock_switch_port(&self, dpid: Dpid, port_no: u32) -> Result<(), Error> {
        debug!(%dpid, port_no, "unblocking switch port");
        self.post_text("unblock_port", &SwitchPortRequest { dpid, port_no })
            .await?;
        Ok(())
    }
}
