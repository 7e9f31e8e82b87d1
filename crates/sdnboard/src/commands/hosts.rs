//! Host command handlers.

use tabled::Tabled;

use sdnboard_core::{
    Action, BlockedHost, ConnectedHost, Dashboard, DashboardLayout, HostAddress, HostAttachment,
};

use crate::cli::{GlobalOpts, HostsArgs, HostsCommand};
use crate::error::{CliError, ErrorContext};
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct AddressRow {
    #[tabled(rename = "IP")]
    ip: String,
}

impl From<&HostAddress> for AddressRow {
    fn from(a: &HostAddress) -> Self {
        Self { ip: a.to_string() }
    }
}

#[derive(Tabled)]
struct ConnectedRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&ConnectedHost> for ConnectedRow {
    fn from(h: &ConnectedHost) -> Self {
        Self {
            ip: h.ip.clone(),
            hostname: h.hostname.clone(),
            last_seen: output::timestamp(h.last_seen.as_ref()),
        }
    }
}

#[derive(Tabled)]
struct BlockedRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Blocked At")]
    blocked_at: String,
}

impl From<&BlockedHost> for BlockedRow {
    fn from(h: &BlockedHost) -> Self {
        Self {
            ip: h.ip.clone(),
            reason: h.reason.clone(),
            blocked_at: output::timestamp(h.blocked_at.as_ref()),
        }
    }
}

#[derive(Tabled)]
struct AttachmentRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Switch")]
    switch: String,
    #[tabled(rename = "Port")]
    port: u32,
}

impl From<&HostAttachment> for AttachmentRow {
    fn from(h: &HostAttachment) -> Self {
        Self {
            ip: h.ip.clone(),
            switch: h.switch.to_string(),
            port: h.port,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: HostsArgs,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
) -> Result<(), CliError> {
    let layout = dashboard.layout();

    match args.command {
        HostsCommand::Connected(search) => {
            let out = match layout {
                DashboardLayout::Switches => {
                    let panel = dashboard.connected_addresses();
                    util::fetch("Fetching connected hosts", global, ctx, panel.refresh()).await?;
                    let rows = util::search(&panel.snapshot(), search.search.as_deref());
                    output::render_list(&global.output, &rows, |r| AddressRow::from(r), |a| {
                        a.to_string()
                    })?
                }
                DashboardLayout::Services => {
                    let panel = dashboard.connected_hosts();
                    util::fetch("Fetching connected hosts", global, ctx, panel.refresh()).await?;
                    let rows = util::search(&panel.snapshot(), search.search.as_deref());
                    output::render_list(&global.output, &rows, |r| ConnectedRow::from(r), |h| {
                        h.ip.clone()
                    })?
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HostsCommand::Blocked(search) => {
            let out = match layout {
                DashboardLayout::Switches => {
                    let panel = dashboard.blocked_addresses();
                    util::fetch("Fetching blocked hosts", global, ctx, panel.refresh()).await?;
                    let rows = util::search(&panel.snapshot(), search.search.as_deref());
                    output::render_list(&global.output, &rows, |r| AddressRow::from(r), |a| {
                        a.to_string()
                    })?
                }
                DashboardLayout::Services => {
                    let panel = dashboard.blocked_hosts();
                    util::fetch("Fetching blocked hosts", global, ctx, panel.refresh()).await?;
                    let rows = util::search(&panel.snapshot(), search.search.as_deref());
                    output::render_list(&global.output, &rows, |r| BlockedRow::from(r), |h| {
                        h.ip.clone()
                    })?
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HostsCommand::Block { ip } => {
            let message = format!("Blocking {}", ip.trim());
            match layout {
                DashboardLayout::Switches => {
                    let panel = dashboard.blocked_addresses();
                    util::mutate(dashboard, &message, global, ctx, panel.block_entered(&ip)).await
                }
                DashboardLayout::Services => {
                    let panel = dashboard.blocked_hosts();
                    util::mutate(dashboard, &message, global, ctx, panel.block_entered(&ip)).await
                }
            }
        }

        HostsCommand::Unblock { ip } => {
            let ip = ip.trim().to_owned();
            let message = format!("Unblocking {ip}");
            let action = Action::UnblockIp { ip: ip.clone() };
            match layout {
                DashboardLayout::Switches => {
                    let panel = dashboard.blocked_addresses();
                    util::mutate(dashboard, &message, global, ctx, panel.dispatch(ip, action))
                        .await
                }
                DashboardLayout::Services => {
                    let panel = dashboard.blocked_hosts();
                    util::mutate(dashboard, &message, global, ctx, panel.dispatch(ip, action))
                        .await
                }
            }
        }

        HostsCommand::Connections(search) => {
            let panel = dashboard.host_connections();
            util::fetch("Fetching host connections", global, ctx, panel.refresh()).await?;
            let rows = util::search(&panel.snapshot(), search.search.as_deref());
            let out = output::render_list(
                &global.output,
                &rows,
                |r| AttachmentRow::from(r),
                |h| format!("{} {} {}", h.ip, h.switch, h.port),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
