// ── Dashboard composition ──
//
// Owns one instance of every panel plus the shared notice bus and change
// signal. Cheaply cloneable via `Arc<DashboardInner>`.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use sdnboard_api::ControllerClient;

use crate::config::DashboardLayout;
use crate::notice::{ChangeSignal, Notice, NoticeBus};
use crate::panel::Panel;
use crate::source::{
    BlockedAddresses, BlockedHosts, ConnectedAddresses, ConnectedHosts, HostConnections,
    ServicePorts, SwitchPorts,
};
use crate::threshold::ThresholdPanel;
use crate::topology::TopologyView;

/// Summary counts shown above the panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub connected_count: usize,
    pub blocked_count: usize,
    pub ports_count: usize,
    pub blocked_ports_count: usize,
}

#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    layout: DashboardLayout,
    notices: NoticeBus,
    changes: ChangeSignal,

    connected_addresses: Panel<ConnectedAddresses>,
    blocked_addresses: Panel<BlockedAddresses>,
    switch_ports: Panel<SwitchPorts>,
    thresholds: ThresholdPanel,
    host_connections: Panel<HostConnections>,

    connected_hosts: Panel<ConnectedHosts>,
    blocked_hosts: Panel<BlockedHosts>,
    service_ports: Panel<ServicePorts>,

    topology: TopologyView,
}

impl Dashboard {
    /// Build every panel on a shared client. Nothing is fetched yet.
    pub fn new(client: Arc<ControllerClient>, layout: DashboardLayout) -> Self {
        let notices = NoticeBus::new();
        let changes = ChangeSignal::new();

        let panel = || (Arc::clone(&client), notices.clone(), changes.clone());
        let (c, n, s) = panel();
        let connected_addresses = Panel::new(c, n, s);
        let (c, n, s) = panel();
        let blocked_addresses = Panel::new(c, n, s);
        let (c, n, s) = panel();
        let switch_ports = Panel::new(c, n, s);
        let (c, n, s) = panel();
        let thresholds = ThresholdPanel::new(c, n, s);
        let (c, n, s) = panel();
        let host_connections = Panel::new(c, n, s);
        let (c, n, s) = panel();
        let connected_hosts = Panel::new(c, n, s);
        let (c, n, s) = panel();
        let blocked_hosts = Panel::new(c, n, s);
        let (c, n, s) = panel();
        let service_ports = Panel::new(c, n, s);

        let topology = TopologyView::new(Arc::clone(&client));

        Self {
            inner: Arc::new(DashboardInner {
                layout,
                notices,
                changes,
                connected_addresses,
                blocked_addresses,
                switch_ports,
                thresholds,
                host_connections,
                connected_hosts,
                blocked_hosts,
                service_ports,
                topology,
            }),
        }
    }

    pub fn layout(&self) -> DashboardLayout {
        self.inner.layout
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Fetch every panel of the current layout concurrently.
    ///
    /// Individual failures land in each panel's error; mounting itself
    /// never fails.
    pub async fn mount(&self) {
        let i = &self.inner;
        match i.layout {
            DashboardLayout::Switches => {
                let _ = tokio::join!(
                    i.connected_addresses.refresh(),
                    i.blocked_addresses.refresh(),
                    i.switch_ports.refresh(),
                    i.thresholds.refresh(),
                    i.host_connections.refresh(),
                );
            }
            DashboardLayout::Services => {
                let _ = tokio::join!(
                    i.connected_hosts.refresh(),
                    i.blocked_hosts.refresh(),
                    i.service_ports.refresh(),
                );
            }
        }
        debug!(layout = %i.layout, "dashboard mounted");
    }

    /// Counts from the current snapshots of the layout's panels.
    pub fn stats(&self) -> NetworkStats {
        let i = &self.inner;
        match i.layout {
            DashboardLayout::Switches => {
                let ports = i.switch_ports.snapshot();
                NetworkStats {
                    connected_count: i.connected_addresses.snapshot().len(),
                    blocked_count: i.blocked_addresses.snapshot().len(),
                    ports_count: ports.len(),
                    blocked_ports_count: ports.iter().filter(|p| p.blocked).count(),
                }
            }
            DashboardLayout::Services => {
                let ports = i.service_ports.snapshot();
                NetworkStats {
                    connected_count: i.connected_hosts.snapshot().len(),
                    blocked_count: i.blocked_hosts.snapshot().len(),
                    ports_count: ports.len(),
                    blocked_ports_count: ports.iter().filter(|p| p.blocked).count(),
                }
            }
        }
    }

    /// Keep a `watch` of [`NetworkStats`] current.
    ///
    /// Each change signal refetches the host lists (mutations already
    /// refetch their own panel) and recomputes the counts. The task ends
    /// when `cancel` fires.
    pub fn spawn_stats_task(
        &self,
        cancel: CancellationToken,
    ) -> (watch::Receiver<NetworkStats>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(self.stats());
        // Subscribed before spawning so no change between now and the
        // task's first poll is missed.
        let changes = self.changes().subscribe();
        let dashboard = self.clone();
        let handle = tokio::spawn(stats_task(dashboard, changes, tx, cancel));
        (rx, handle)
    }

    // ── Shared signals ───────────────────────────────────────────────

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    pub fn changes(&self) -> &ChangeSignal {
        &self.inner.changes
    }

    // ── Panels ───────────────────────────────────────────────────────

    pub fn connected_addresses(&self) -> &Panel<ConnectedAddresses> {
        &self.inner.connected_addresses
    }

    pub fn blocked_addresses(&self) -> &Panel<BlockedAddresses> {
        &self.inner.blocked_addresses
    }

    pub fn switch_ports(&self) -> &Panel<SwitchPorts> {
        &self.inner.switch_ports
    }

    pub fn thresholds(&self) -> &ThresholdPanel {
        &self.inner.thresholds
    }

    pub fn host_connections(&self) -> &Panel<HostConnections> {
        &self.inner.host_connections
    }

    pub fn connected_hosts(&self) -> &Panel<ConnectedHosts> {
        &self.inner.connected_hosts
    }

    pub fn blocked_hosts(&self) -> &Panel<BlockedHosts> {
        &self.inner.blocked_hosts
    }

    pub fn service_ports(&self) -> &Panel<ServicePorts> {
        &self.inner.service_ports
    }

    pub fn topology(&self) -> &TopologyView {
        &self.inner.topology
    }

    async fn refresh_hosts(&self) {
        let i = &self.inner;
        match i.layout {
            DashboardLayout::Switches => {
                let _ = tokio::join!(
                    i.connected_addresses.refresh(),
                    i.blocked_addresses.refresh(),
                );
            }
            DashboardLayout::Services => {
                let _ = tokio::join!(i.connected_hosts.refresh(), i.blocked_hosts.refresh());
            }
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn stats_task(
    dashboard: Dashboard,
    mut changes: watch::Receiver<u64>,
    tx: watch::Sender<NetworkStats>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                dashboard.refresh_hosts().await;
                let stats = dashboard.stats();
                debug!(?stats, "stats recomputed");
                tx.send_replace(stats);
            }
        }
    }
}
