// sdnboard-core: Panel state layer between sdnboard-api and consumers (CLI).

pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod model;
pub mod notice;
pub mod panel;
pub mod session;
pub mod source;
pub mod threshold;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AuthMode, ControllerConfig, DashboardLayout, TlsVerification};
pub use dashboard::{Dashboard, NetworkStats};
pub use error::CoreError;
pub use filter::filter;
pub use notice::{ChangeSignal, Notice, NoticeBus, NoticeLevel};
pub use panel::{Action, DispatchOutcome, Panel, PanelStream, Snapshot};
pub use session::{
    Access, Authenticator, ConfiguredAuthenticator, FileSessionStore, LocalAuthenticator,
    MemorySessionStore, RemoteAuthenticator, Route, SessionGate, SessionStore, SessionToken,
};
pub use source::{
    BlockedAddresses, BlockedHosts, Collection, ConnectedAddresses, ConnectedHosts,
    HostConnections, ServicePorts, SwitchPorts, Thresholds,
};
pub use threshold::{ThresholdPanel, parse_threshold, scan_for_error};
pub use topology::{EdgeKind, GraphRenderer, NodeKind, TopologyGraph, TopologyView};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AttachmentKey, BlockedHost, ConnectedHost, HostAddress, HostAttachment, PortKey,
    PortThreshold, Record, ServicePort, SwitchPort,
};

pub use sdnboard_api::Dpid;
