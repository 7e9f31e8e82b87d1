// Topology endpoint

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::TopologyDocument;

impl ControllerClient {
    /// `GET /topology`: switches, attached hosts and inter-switch links.
    pub async fn topology(&self) -> Result<TopologyDocument, Error> {
        self.get("topology").await
    }
}
