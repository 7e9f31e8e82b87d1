// ── Panel state controller ──
//
// One `Panel` per dashboard section. It owns a snapshot of one remote
// collection plus the loading flag, panel error, pending keys and
// per-key field errors for that section. Fetches replace the snapshot
// wholesale; mutations go to the controller and are followed by a
// refetch, never by a local edit.

use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use dashmap::{DashMap, DashSet};
use futures_core::Stream;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use sdnboard_api::models::ThresholdUpdate;
use sdnboard_api::{ControllerClient, Dpid};

use crate::error::CoreError;
use crate::model::Record;
use crate::notice::{ChangeSignal, Notice, NoticeBus};
use crate::source::{Collection, fetch_error_message};
use crate::threshold::scan_for_error;

type KeyOf<C> = <<C as Collection>::Record as Record>::Key;

// ── Snapshot ────────────────────────────────────────────────────────

/// Immutable point-in-time copy of a remote collection.
///
/// `version` starts at 0 (never fetched) and is bumped on every
/// successful fetch.
#[derive(Debug)]
pub struct Snapshot<R> {
    records: Arc<Vec<R>>,
    version: u64,
}

impl<R> Snapshot<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    fn replaced(&self, records: Vec<R>) -> Self {
        Self {
            records: Arc::new(records),
            version: self.version + 1,
        }
    }
}

impl<R: Record> Snapshot<R> {
    /// Build a snapshot directly, e.g. for rendering fixtures.
    pub fn from_records(records: Vec<R>) -> Self {
        Self {
            records: Arc::new(records),
            version: 1,
        }
    }

    pub fn find(&self, key: &R::Key) -> Option<&R> {
        self.records.iter().find(|r| &r.key() == key)
    }
}

impl<R> Clone for Snapshot<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            version: self.version,
        }
    }
}

impl<R> Default for Snapshot<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            version: 0,
        }
    }
}

impl<R: Serialize> Serialize for Snapshot<R> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl<'a, R> IntoIterator for &'a Snapshot<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ── Actions ─────────────────────────────────────────────────────────

/// A write against the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    BlockIp { ip: String },
    UnblockIp { ip: String },
    BlockServicePort { port: u16 },
    UnblockServicePort { port: u16 },
    BlockSwitchPort { dpid: Dpid, port_no: u32 },
    UnblockSwitchPort { dpid: Dpid, port_no: u32 },
    SetThreshold { dpid: Dpid, port: u32, threshold: f64 },
}

impl Action {
    /// Send the write. `Ok(Some(msg))` means the controller answered 2xx
    /// but reported a failure in the body.
    async fn execute(&self, client: &ControllerClient) -> Result<Option<String>, CoreError> {
        match self {
            Self::BlockIp { ip } => client.block_ip(ip).await?,
            Self::UnblockIp { ip } => client.unblock_ip(ip).await?,
            Self::BlockServicePort { port } => client.block_service_port(*port).await?,
            Self::UnblockServicePort { port } => client.unblock_service_port(*port).await?,
            Self::BlockSwitchPort { dpid, port_no } => {
                client.block_switch_port(*dpid, *port_no).await?;
            }
            Self::UnblockSwitchPort { dpid, port_no } => {
                client.unblock_switch_port(*dpid, *port_no).await?;
            }
            Self::SetThreshold {
                dpid,
                port,
                threshold,
            } => {
                let messages = client
                    .update_thresholds(&[ThresholdUpdate {
                        switch: *dpid,
                        port: *port,
                        threshold: *threshold,
                    }])
                    .await?;
                return Ok(scan_for_error(&messages).map(ToOwned::to_owned));
            }
        }
        Ok(None)
    }

    /// Threshold failures are also recorded against the row.
    fn records_field_error(&self) -> bool {
        matches!(self, Self::SetThreshold { .. })
    }

    fn success_notice(&self) -> Notice {
        match self {
            Self::BlockIp { ip } => {
                Notice::success("IP Blocked", format!("{ip} has been successfully blocked."))
            }
            Self::UnblockIp { ip } => Notice::success(
                "IP Unblocked",
                format!("{ip} has been successfully unblocked."),
            ),
            Self::BlockServicePort { port } => Notice::success(
                "Port Blocked",
                format!("Port {port} has been successfully blocked."),
            ),
            Self::UnblockServicePort { port } => Notice::success(
                "Port Unblocked",
                format!("Port {port} has been successfully unblocked."),
            ),
            Self::BlockSwitchPort { dpid, port_no } => Notice::success(
                "Port Blocked",
                format!("Port {port_no} on switch {dpid} has been successfully blocked."),
            ),
            Self::UnblockSwitchPort { dpid, port_no } => Notice::success(
                "Port Unblocked",
                format!("Port {port_no} on switch {dpid} has been successfully unblocked."),
            ),
            Self::SetThreshold {
                dpid,
                port,
                threshold,
            } => Notice::success(
                "Threshold Updated",
                format!("Threshold for port {port} on switch {dpid} set to {threshold}."),
            ),
        }
    }

    fn failure_notice(&self, detail: Option<&str>) -> Notice {
        let (title, fallback) = match self {
            Self::BlockIp { .. } => (
                "Failed to block IP",
                "An error occurred while trying to block the IP.",
            ),
            Self::UnblockIp { .. } => (
                "Failed to unblock IP",
                "An error occurred while trying to unblock the IP.",
            ),
            Self::BlockServicePort { .. } | Self::BlockSwitchPort { .. } => (
                "Failed to block port",
                "An error occurred while trying to block the port.",
            ),
            Self::UnblockServicePort { .. } | Self::UnblockSwitchPort { .. } => (
                "Failed to unblock port",
                "An error occurred while trying to unblock the port.",
            ),
            Self::SetThreshold { .. } => (
                "Failed to update threshold",
                "An error occurred while trying to update the threshold.",
            ),
        };
        Notice::failure(title, detail.unwrap_or(fallback))
    }
}

// ── Dispatch outcome ────────────────────────────────────────────────

/// How a [`Panel::dispatch`] call settled.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The controller accepted the write; the panel was refetched.
    Completed,
    /// Input never reached the controller.
    Invalid { message: String },
    /// 2xx answer whose body reported a failure; no refetch.
    Rejected { message: String },
    /// The write failed; the panel was refetched.
    Failed(CoreError),
    /// A mutation for the same key is still in flight; nothing was sent.
    AlreadyPending,
}

impl DispatchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Collapse into a `Result` for callers that only care about success.
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Self::Completed => Ok(()),
            Self::Invalid { message } => Err(CoreError::ValidationFailed { message }),
            Self::Rejected { message } => Err(CoreError::Rejected { message }),
            Self::Failed(e) => Err(e),
            Self::AlreadyPending => Err(CoreError::ValidationFailed {
                message: "another change to this item is still in progress".into(),
            }),
        }
    }
}

// ── Panel ───────────────────────────────────────────────────────────

/// Fetch/mutate/error lifecycle for one remote collection.
pub struct Panel<C: Collection> {
    client: Arc<ControllerClient>,
    snapshot: watch::Sender<Snapshot<C::Record>>,
    /// Number of fetches in flight.
    loading: watch::Sender<usize>,
    error: watch::Sender<Option<String>>,
    pending: DashSet<KeyOf<C>>,
    field_errors: DashMap<KeyOf<C>, String>,
    notices: NoticeBus,
    changes: ChangeSignal,
    _collection: PhantomData<fn() -> C>,
}

impl<C: Collection> Panel<C> {
    /// Create an empty, not-yet-fetched panel.
    pub fn new(client: Arc<ControllerClient>, notices: NoticeBus, changes: ChangeSignal) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::default());
        let (loading, _) = watch::channel(0);
        let (error, _) = watch::channel(None);
        Self {
            client,
            snapshot,
            loading,
            error,
            pending: DashSet::new(),
            field_errors: DashMap::new(),
            notices,
            changes,
            _collection: PhantomData,
        }
    }

    // ── Fetch ────────────────────────────────────────────────────────

    /// Read the collection and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place and the panel
    /// error is set. Overlapping calls are not coordinated: whichever
    /// response lands last is what the panel shows. The panel reports
    /// loading until every overlapping call has settled.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let _loading = InFlight::enter(&self.loading);
        self.error.send_replace(None);

        match C::fetch(&self.client).await {
            Ok(records) => {
                debug!(label = C::LABEL, count = records.len(), "snapshot replaced");
                self.snapshot.send_modify(|snap| *snap = snap.replaced(records));
                Ok(())
            }
            Err(e) => {
                warn!(label = C::LABEL, error = %e, "fetch failed");
                self.error.send_replace(Some(fetch_error_message::<C>()));
                Err(e)
            }
        }
    }

    // ── Mutate ───────────────────────────────────────────────────────

    /// Send `action` for the row identified by `key`, then refetch.
    ///
    /// A key already pending is refused without touching the network.
    /// A threshold rejection reported inside a 2xx body sets the row's
    /// field error and skips the refetch.
    pub async fn dispatch(&self, key: KeyOf<C>, action: Action) -> DispatchOutcome {
        if !self.pending.insert(key.clone()) {
            warn!(%key, "mutation already pending, ignoring");
            return DispatchOutcome::AlreadyPending;
        }

        debug!(%key, ?action, "dispatching");
        let result = action.execute(&self.client).await;
        self.pending.remove(&key);

        let outcome = match result {
            Ok(None) => {
                self.field_errors.remove(&key);
                self.notices.emit(action.success_notice());
                DispatchOutcome::Completed
            }
            Ok(Some(message)) => {
                self.notices.emit(action.failure_notice(Some(&message)));
                self.field_errors.insert(key, message.clone());
                return DispatchOutcome::Rejected { message };
            }
            Err(e) => {
                warn!(%key, error = %e, "mutation failed");
                if action.records_field_error() {
                    self.field_errors.insert(key, e.to_string());
                }
                self.notices.emit(action.failure_notice(None));
                DispatchOutcome::Failed(e)
            }
        };

        // Failure is already recorded as the panel error.
        let _ = self.refresh().await;

        // Signalled after the refetch so listeners see the new snapshot.
        if outcome.is_completed() {
            self.changes.notify();
        }
        outcome
    }

    // ── State access ─────────────────────────────────────────────────

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot<C::Record> {
        self.snapshot.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow() > 0
    }

    /// Panel-level error from the last fetch, if it failed.
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn is_pending(&self, key: &KeyOf<C>) -> bool {
        self.pending.contains(key)
    }

    pub fn field_error(&self, key: &KeyOf<C>) -> Option<String> {
        self.field_errors.get(key).map(|e| e.value().clone())
    }

    /// All current field errors, in no particular order.
    pub fn field_errors(&self) -> Vec<(KeyOf<C>, String)> {
        self.field_errors
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub(crate) fn set_field_error(&self, key: KeyOf<C>, message: impl Into<String>) {
        self.field_errors.insert(key, message.into());
    }

    /// Operator notices emitted by this panel's mutations.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn client(&self) -> &Arc<ControllerClient> {
        &self.client
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> PanelStream<C::Record> {
        PanelStream::new(self.snapshot.subscribe())
    }

    /// Subscribe to the number of fetches in flight; zero means idle.
    pub fn loading_changes(&self) -> watch::Receiver<usize> {
        self.loading.subscribe()
    }
}

/// Counts one fetch in flight for as long as it lives, including when the
/// fetch future is dropped before completing.
struct InFlight<'a> {
    count: &'a watch::Sender<usize>,
}

impl<'a> InFlight<'a> {
    fn enter(count: &'a watch::Sender<usize>) -> Self {
        count.send_modify(|n| *n += 1);
        Self { count }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }
}

// ── IP-keyed panels ─────────────────────────────────────────────────

impl<C> Panel<C>
where
    C: Collection,
    C::Record: Record<Key = String>,
{
    /// Block an address typed by the operator.
    ///
    /// Surrounding whitespace is ignored. Empty input is refused with a
    /// "Missing IP address" field error keyed by the trimmed text.
    pub async fn block_entered(&self, input: &str) -> DispatchOutcome {
        let ip = input.trim();
        if ip.is_empty() {
            let message = "Missing IP address".to_owned();
            self.set_field_error(ip.to_owned(), message.clone());
            return DispatchOutcome::Invalid { message };
        }
        self.dispatch(ip.to_owned(), Action::BlockIp { ip: ip.to_owned() })
            .await
    }
}

// ── Subscription ────────────────────────────────────────────────────

/// A subscription to one panel's snapshot.
///
/// Point-in-time access via `current()`, change notification via
/// `changed()` or by converting to a `Stream`.
pub struct PanelStream<R: Send + Sync + 'static> {
    current: Snapshot<R>,
    receiver: watch::Receiver<Snapshot<R>>,
}

impl<R: Send + Sync + 'static> PanelStream<R> {
    fn new(receiver: watch::Receiver<Snapshot<R>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation time or at the last `changed()`.
    pub fn current(&self) -> &Snapshot<R> {
        &self.current
    }

    /// Wait for the next replacement. `None` once the panel is dropped.
    pub async fn changed(&mut self) -> Option<Snapshot<R>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` yielding the current snapshot first.
    pub fn into_stream(self) -> PanelWatchStream<R> {
        PanelWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a panel's `watch::Receiver`.
pub struct PanelWatchStream<R: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<R>>,
}

impl<R: Send + Sync + 'static> Stream for PanelWatchStream<R> {
    type Item = Snapshot<R>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::HostAddress;

    #[test]
    fn snapshot_replacement_bumps_version() {
        let snap: Snapshot<HostAddress> = Snapshot::default();
        assert_eq!(snap.version(), 0);
        let next = snap.replaced(vec![HostAddress("10.0.0.1".into())]);
        assert_eq!(next.version(), 1);
        assert_eq!(next.len(), 1);
        assert!(snap.is_empty());
    }

    #[test]
    fn find_uses_record_key() {
        let snap = Snapshot::from_records(vec![
            HostAddress("10.0.0.1".into()),
            HostAddress("10.0.0.2".into()),
        ]);
        assert!(snap.find(&"10.0.0.2".to_string()).is_some());
        assert!(snap.find(&"10.0.0.3".to_string()).is_none());
    }

    #[test]
    fn outcome_into_result() {
        assert!(DispatchOutcome::Completed.into_result().is_ok());
        assert!(matches!(
            DispatchOutcome::Rejected {
                message: "Error: x".into()
            }
            .into_result(),
            Err(CoreError::Rejected { .. })
        ));
    }

    #[test]
    fn overlapping_fetches_keep_loading_until_last_settles() {
        let (count, rx) = watch::channel(0_usize);
        let first = InFlight::enter(&count);
        let second = InFlight::enter(&count);
        assert_eq!(*rx.borrow(), 2);

        drop(first);
        assert_eq!(*rx.borrow(), 1);
        drop(second);
        assert_eq!(*rx.borrow(), 0);
    }

    #[test]
    fn failure_notice_prefers_detail() {
        let action = Action::SetThreshold {
            dpid: Dpid(1),
            port: 2,
            threshold: 5.0,
        };
        let n = action.failure_notice(Some("Error: threshold exceeds max"));
        assert_eq!(n.title, "Failed to update threshold");
        assert_eq!(n.description, "Error: threshold exceeds max");

        let n = Action::BlockIp { ip: "x".into() }.failure_notice(None);
        assert_eq!(n.description, "An error occurred while trying to block the IP.");
    }
}
