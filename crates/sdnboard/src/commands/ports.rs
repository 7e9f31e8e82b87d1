//! Service port and switch port command handlers.

use tabled::Tabled;

use sdnboard_core::{Action, Dashboard, PortKey, ServicePort, SwitchPort};

use crate::cli::{GlobalOpts, PortsArgs, PortsCommand};
use crate::error::{CliError, ErrorContext};
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServicePortRow {
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ServicePortRow {
    fn new(p: &ServicePort, color: bool) -> Self {
        Self {
            port: p.port,
            service: p.service.clone(),
            protocol: p.protocol.clone(),
            status: output::blocked_label(p.blocked, color),
        }
    }
}

#[derive(Tabled)]
struct SwitchPortRow {
    #[tabled(rename = "Switch")]
    dpid: String,
    #[tabled(rename = "Port")]
    port_no: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    hw_addr: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl SwitchPortRow {
    fn new(p: &SwitchPort, color: bool) -> Self {
        Self {
            dpid: p.dpid.to_string(),
            port_no: p.port_no,
            name: p.name.clone(),
            hw_addr: p.hw_addr.clone(),
            status: output::blocked_label(p.blocked, color),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: PortsArgs,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        PortsCommand::List(search) => {
            let panel = dashboard.service_ports();
            util::fetch("Fetching ports", global, ctx, panel.refresh()).await?;
            let rows = util::search(&panel.snapshot(), search.search.as_deref());
            let out = output::render_list(
                &global.output,
                &rows,
                |p| ServicePortRow::new(p, color),
                |p| p.port.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::Block { port } => {
            let panel = dashboard.service_ports();
            let action = Action::BlockServicePort { port };
            let message = format!("Blocking port {port}");
            util::mutate(dashboard, &message, global, ctx, panel.dispatch(port, action)).await
        }

        PortsCommand::Unblock { port } => {
            let panel = dashboard.service_ports();
            let action = Action::UnblockServicePort { port };
            let message = format!("Unblocking port {port}");
            util::mutate(dashboard, &message, global, ctx, panel.dispatch(port, action)).await
        }

        PortsCommand::Switches(search) => {
            let panel = dashboard.switch_ports();
            util::fetch("Fetching switch ports", global, ctx, panel.refresh()).await?;
            let rows = util::search(&panel.snapshot(), search.search.as_deref());
            let out = output::render_list(
                &global.output,
                &rows,
                |p| SwitchPortRow::new(p, color),
                |p| format!("{}:{}", p.dpid, p.port_no),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::BlockSwitch { dpid, port } => {
            let key = PortKey::new(dpid, port);
            let action = Action::BlockSwitchPort {
                dpid: key.dpid,
                port_no: port,
            };
            let message = format!("Blocking port {port} on switch {dpid}");
            let panel = dashboard.switch_ports();
            util::mutate(dashboard, &message, global, ctx, panel.dispatch(key, action)).await
        }

        PortsCommand::UnblockSwitch { dpid, port } => {
            let key = PortKey::new(dpid, port);
            let action = Action::UnblockSwitchPort {
                dpid: key.dpid,
                port_no: port,
            };
            let message = format!("Unblocking port {port} on switch {dpid}");
            let panel = dashboard.switch_ports();
            util::mutate(dashboard, &message, global, ctx, panel.dispatch(key, action)).await
        }
    }
}
