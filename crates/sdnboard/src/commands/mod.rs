//! Command dispatch: bridges CLI args -> dashboard panels -> output formatting.

pub mod config_cmd;
pub mod hosts;
pub mod ports;
pub mod session;
pub mod stats;
pub mod thresholds;
pub mod topology;
pub mod util;

use sdnboard_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::{CliError, ErrorContext};

/// Dispatch a dashboard-bound command to the appropriate handler.
///
/// The session gate has already granted access by the time this runs.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
) -> Result<(), CliError> {
    match cmd {
        Command::Hosts(args) => hosts::handle(dashboard, args, global, ctx).await,
        Command::Ports(args) => ports::handle(dashboard, args, global, ctx).await,
        Command::Thresholds(args) => thresholds::handle(dashboard, args, global, ctx).await,
        Command::Topology(args) => topology::handle(dashboard, &args, global).await,
        Command::Stats => stats::handle(dashboard, global).await,
        // Session, Config and Completions are handled before dispatch
        Command::Login(_)
        | Command::Logout
        | Command::Status
        | Command::Config(_)
        | Command::Completions(_) => unreachable!(),
    }
}
