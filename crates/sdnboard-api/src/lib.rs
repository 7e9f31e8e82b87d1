// sdnboard-api: Async Rust client for the SDN controller REST API
//
// One flat JSON-over-HTTP surface: host lists, port inventory, per-port
// thresholds, host attachments and topology. No envelope, no paging.

pub mod auth;
pub mod client;
pub mod error;
pub mod hosts;
pub mod models;
pub mod ports;
pub mod thresholds;
pub mod topology;
pub mod transport;

pub use client::ControllerClient;
pub use error::Error;
pub use models::Dpid;
pub use transport::{TlsMode, TransportConfig};
