// ── Port and threshold records ──

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use sdnboard_api::Dpid;

use super::Record;

/// Identifies one port of one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PortKey {
    pub dpid: Dpid,
    pub port: u32,
}

impl PortKey {
    pub fn new(dpid: impl Into<Dpid>, port: u32) -> Self {
        Self {
            dpid: dpid.into(),
            port,
        }
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dpid, self.port)
    }
}

/// A well-known service port the controller can filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePort {
    pub port: u16,
    pub service: String,
    pub protocol: String,
    pub blocked: bool,
}

impl Record for ServicePort {
    type Key = u16;

    fn key(&self) -> u16 {
        self.port
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.port.to_string()),
            Cow::Borrowed(&self.service),
            Cow::Borrowed(&self.protocol),
        ]
    }
}

/// One physical switch port, flagged when the controller has it down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchPort {
    pub dpid: Dpid,
    pub port_no: u32,
    pub name: String,
    pub hw_addr: String,
    pub blocked: bool,
}

impl Record for SwitchPort {
    type Key = PortKey;

    fn key(&self) -> PortKey {
        PortKey::new(self.dpid, self.port_no)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.dpid.to_string()),
            Cow::Owned(self.port_no.to_string()),
            Cow::Borrowed(&self.name),
            Cow::Borrowed(&self.hw_addr),
        ]
    }
}

/// Traffic threshold currently applied to a switch port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortThreshold {
    pub dpid: Dpid,
    pub port: u32,
    pub threshold: f64,
    pub max_threshold: Option<f64>,
}

impl Record for PortThreshold {
    type Key = PortKey;

    fn key(&self) -> PortKey {
        PortKey::new(self.dpid, self.port)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.dpid.to_string()),
            Cow::Owned(self.port.to_string()),
        ]
    }
}
