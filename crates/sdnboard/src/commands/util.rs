//! Shared helpers for command handlers.

use std::future::Future;

use tokio::sync::broadcast::{self, error::TryRecvError};

use sdnboard_core::{CoreError, Dashboard, DispatchOutcome, Notice, Record, Snapshot};

use crate::cli::GlobalOpts;
use crate::error::{CliError, ErrorContext};
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Run a panel refresh behind a spinner and surface its error.
pub async fn fetch<F>(
    message: &str,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
    refresh: F,
) -> Result<(), CliError>
where
    F: Future<Output = Result<(), CoreError>>,
{
    output::with_spinner(message, global.quiet, refresh)
        .await
        .map_err(|e| CliError::from_core(e, ctx))
}

/// Run a panel mutation and report how it settled.
///
/// Notices are collected from the dashboard bus while the mutation runs
/// and printed only when it completed; failures surface as the error.
pub async fn mutate<F>(
    dashboard: &Dashboard,
    message: &str,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
    action: F,
) -> Result<(), CliError>
where
    F: Future<Output = DispatchOutcome>,
{
    let mut notices = dashboard.notices();
    let outcome = output::with_spinner(message, global.quiet, action).await;

    match outcome {
        DispatchOutcome::Completed => {
            output::print_notices(&drain(&mut notices), global);
            Ok(())
        }
        DispatchOutcome::Invalid { message } => Err(CliError::Validation {
            field: "input".into(),
            reason: message,
        }),
        other => other
            .into_result()
            .map_err(|e| CliError::from_core(e, ctx)),
    }
}

/// Everything queued on a notice receiver right now.
pub fn drain(rx: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(notice) => out.push(notice),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "notice receiver lagged");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return out,
        }
    }
}

/// Owned copies of the snapshot rows matching `--search`.
pub fn search<R: Record>(snapshot: &Snapshot<R>, query: Option<&str>) -> Vec<R> {
    sdnboard_core::filter(snapshot, query.unwrap_or_default())
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sdnboard_core::{HostAddress, NoticeBus};

    use super::*;

    #[test]
    fn drain_collects_queued_notices() {
        let bus = NoticeBus::new();
        let mut rx = bus.subscribe();
        bus.emit(Notice::success("IP Blocked", "10.0.0.5"));
        bus.emit(Notice::failure("Failed to block port", "boom"));

        let got = drain(&mut rx);
        assert_eq!(got.len(), 2);
        assert!(got[1].is_failure());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn search_filters_by_substring() {
        let snap = Snapshot::from_records(vec![
            HostAddress("10.0.0.1".into()),
            HostAddress("192.168.1.9".into()),
        ]);
        assert_eq!(search(&snap, Some("192")).len(), 1);
        assert_eq!(search(&snap, None).len(), 2);
    }
}
