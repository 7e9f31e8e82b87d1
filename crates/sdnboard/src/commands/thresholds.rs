//! Threshold command handlers.

use tabled::Tabled;

use sdnboard_core::{Dashboard, PortKey, PortThreshold};

use crate::cli::{GlobalOpts, ThresholdsArgs, ThresholdsCommand};
use crate::error::{CliError, ErrorContext};
use crate::output;

use super::util;

#[derive(Tabled)]
struct ThresholdRow {
    #[tabled(rename = "Switch")]
    dpid: String,
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Threshold")]
    threshold: f64,
    #[tabled(rename = "Max")]
    max: String,
}

impl From<&PortThreshold> for ThresholdRow {
    fn from(t: &PortThreshold) -> Self {
        Self {
            dpid: t.dpid.to_string(),
            port: t.port,
            threshold: t.threshold,
            max: t
                .max_threshold
                .map_or_else(|| "-".into(), |m| m.to_string()),
        }
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    args: ThresholdsArgs,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
) -> Result<(), CliError> {
    let thresholds = dashboard.thresholds();

    match args.command {
        ThresholdsCommand::List(search) => {
            util::fetch("Fetching thresholds", global, ctx, thresholds.refresh()).await?;
            let rows = util::search(&thresholds.panel().snapshot(), search.search.as_deref());
            let out = output::render_list(
                &global.output,
                &rows,
                |t| ThresholdRow::from(t),
                |t| format!("{}:{} {}", t.dpid, t.port, t.threshold),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ThresholdsCommand::Set { dpid, port, value } => {
            let key = PortKey::new(dpid, port);
            let message = format!("Updating threshold for {key}");
            util::mutate(
                dashboard,
                &message,
                global,
                ctx,
                thresholds.update(key, value.trim()),
            )
            .await
            .map_err(|e| match e {
                CliError::Validation { reason, .. } => CliError::Validation {
                    field: "threshold".into(),
                    reason,
                },
                other => other,
            })
        }
    }
}
