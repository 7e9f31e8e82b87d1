// ── Panel record model ──
//
// Every type here is one row of one panel's snapshot. Records are
// immutable once fetched: a refresh replaces the whole collection.

pub mod host;
pub mod port;

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

pub use host::{AttachmentKey, BlockedHost, ConnectedHost, HostAddress, HostAttachment};
pub use port::{PortKey, PortThreshold, ServicePort, SwitchPort};

/// A row of a panel snapshot.
///
/// `Key` identifies the row for pending marks and field errors;
/// `search_fields` feeds the case-insensitive filter.
pub trait Record: Clone + fmt::Debug + Serialize + Send + Sync + 'static {
    type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}
