//! Stats command handler.

use sdnboard_core::{Dashboard, DashboardLayout, NetworkStats};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(s: &NetworkStats) -> String {
    [
        format!("Connected hosts:  {}", s.connected_count),
        format!("Blocked hosts:    {}", s.blocked_count),
        format!("Ports:            {}", s.ports_count),
        format!("Blocked ports:    {}", s.blocked_ports_count),
    ]
    .join("\n")
}

/// Fetch errors of the panels the current layout mounts.
fn panel_errors(dashboard: &Dashboard) -> Vec<String> {
    let errors = match dashboard.layout() {
        DashboardLayout::Switches => vec![
            dashboard.connected_addresses().error(),
            dashboard.blocked_addresses().error(),
            dashboard.switch_ports().error(),
            dashboard.thresholds().panel().error(),
            dashboard.host_connections().error(),
        ],
        DashboardLayout::Services => vec![
            dashboard.connected_hosts().error(),
            dashboard.blocked_hosts().error(),
            dashboard.service_ports().error(),
        ],
    };
    errors.into_iter().flatten().collect()
}

pub async fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    output::with_spinner("Loading dashboard", global.quiet, dashboard.mount()).await;

    // Counts still render from whatever panels did load.
    for err in panel_errors(dashboard) {
        if !global.quiet {
            eprintln!("warning: {err}");
        }
    }

    let stats = dashboard.stats();
    let out = output::render_single(&global.output, &stats, detail, |s| {
        format!(
            "{} {} {} {}",
            s.connected_count, s.blocked_count, s.ports_count, s.blocked_ports_count
        )
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
