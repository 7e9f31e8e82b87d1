// ── Host records ──

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use sdnboard_api::Dpid;

use super::Record;

/// A host the controller has seen traffic from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedHost {
    pub ip: String,
    pub hostname: String,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Record for ConnectedHost {
    type Key = String;

    fn key(&self) -> String {
        self.ip.clone()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.ip), Cow::Borrowed(&self.hostname)]
    }
}

/// A host whose traffic is dropped by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedHost {
    pub ip: String,
    pub reason: String,
    pub blocked_at: Option<DateTime<Utc>>,
}

impl Record for BlockedHost {
    type Key = String;

    fn key(&self) -> String {
        self.ip.clone()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.ip), Cow::Borrowed(&self.reason)]
    }
}

/// Bare IP row, for controllers that serve plain address lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HostAddress(pub String);

impl HostAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Record for HostAddress {
    type Key = String;

    fn key(&self) -> String {
        self.0.clone()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.0)]
    }
}

/// Where a host IP was learned: switch and ingress port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostAttachment {
    pub ip: String,
    pub switch: Dpid,
    pub port: u32,
}

/// The same IP can show up behind several switches, so the whole row is the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentKey {
    pub ip: String,
    pub switch: Dpid,
    pub port: u32,
}

impl fmt::Display for AttachmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.ip, self.switch, self.port)
    }
}

impl Record for HostAttachment {
    type Key = AttachmentKey;

    fn key(&self) -> AttachmentKey {
        AttachmentKey {
            ip: self.ip.clone(),
            switch: self.switch,
            port: self.port,
        }
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.ip),
            Cow::Owned(self.switch.to_string()),
            Cow::Owned(self.port.to_string()),
        ]
    }
}
