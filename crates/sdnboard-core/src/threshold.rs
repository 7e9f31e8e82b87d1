// ── Threshold editor ──
//
// The thresholds panel plus the per-row draft text the operator edits.
// Drafts are re-seeded from the snapshot after every successful fetch
// and never write into the snapshot themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use sdnboard_api::ControllerClient;

use crate::error::CoreError;
use crate::model::PortKey;
use crate::notice::{ChangeSignal, NoticeBus};
use crate::panel::{Action, DispatchOutcome, Panel};
use crate::source::Thresholds;

pub const INVALID_NUMBER: &str = "Invalid number";

/// Parse operator input as a threshold value.
///
/// Surrounding whitespace is ignored; NaN and infinities are refused.
pub fn parse_threshold(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// First controller message that starts with "error" in any case.
///
/// `POST /threshold` answers 2xx even when an update was refused; the
/// refusal is only visible as a message with this prefix.
pub fn scan_for_error(messages: &[String]) -> Option<&str> {
    messages
        .iter()
        .map(String::as_str)
        .find(|m| m.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("error")))
}

/// Thresholds panel with editable drafts.
pub struct ThresholdPanel {
    panel: Panel<Thresholds>,
    drafts: DashMap<PortKey, String>,
    /// Snapshot version the drafts were last seeded from.
    seeded: AtomicU64,
}

impl ThresholdPanel {
    pub fn new(client: Arc<ControllerClient>, notices: NoticeBus, changes: ChangeSignal) -> Self {
        Self {
            panel: Panel::new(client, notices, changes),
            drafts: DashMap::new(),
            seeded: AtomicU64::new(0),
        }
    }

    /// The underlying panel (snapshot, errors, subscriptions).
    pub fn panel(&self) -> &Panel<Thresholds> {
        &self.panel
    }

    pub async fn refresh(&self) -> Result<(), CoreError> {
        let result = self.panel.refresh().await;
        self.reseed();
        result
    }

    /// Draft text for a row, if the row exists or was edited.
    pub fn draft(&self, key: &PortKey) -> Option<String> {
        self.drafts.get(key).map(|d| d.value().clone())
    }

    /// Replace a row's draft text. No request is sent.
    pub fn edit(&self, key: PortKey, text: impl Into<String>) {
        self.drafts.insert(key, text.into());
    }

    /// Submit the row's current draft.
    pub async fn submit(&self, key: PortKey) -> DispatchOutcome {
        let text = self.draft(&key).unwrap_or_default();
        self.send(key, &text).await
    }

    /// Set the row's draft to `text` and submit it.
    pub async fn update(&self, key: PortKey, text: &str) -> DispatchOutcome {
        self.edit(key, text);
        self.send(key, text).await
    }

    async fn send(&self, key: PortKey, text: &str) -> DispatchOutcome {
        let Some(threshold) = parse_threshold(text) else {
            self.panel.set_field_error(key, INVALID_NUMBER);
            return DispatchOutcome::Invalid {
                message: INVALID_NUMBER.into(),
            };
        };

        let action = Action::SetThreshold {
            dpid: key.dpid,
            port: key.port,
            threshold,
        };
        let outcome = self.panel.dispatch(key, action).await;
        self.reseed();
        outcome
    }

    /// Re-seed drafts when the snapshot is newer than the last seeding.
    fn reseed(&self) {
        let snap = self.panel.snapshot();
        if snap.version() <= self.seeded.load(Ordering::Relaxed) {
            return;
        }
        self.drafts.clear();
        for row in &snap {
            self.drafts
                .insert(PortKey::new(row.dpid, row.port), row.threshold.to_string());
        }
        self.seeded.store(snap.version(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_finite_numbers() {
        assert_eq!(parse_threshold("42"), Some(42.0));
        assert_eq!(parse_threshold(" 0.5 "), Some(0.5));
        assert_eq!(parse_threshold("-3"), Some(-3.0));
    }

    #[test]
    fn parse_refuses_garbage() {
        assert_eq!(parse_threshold("abc"), None);
        assert_eq!(parse_threshold(""), None);
        assert_eq!(parse_threshold("NaN"), None);
        assert_eq!(parse_threshold("inf"), None);
    }

    #[test]
    fn scan_matches_prefix_case_insensitively() {
        let msgs = vec![
            "ok: switch 1 port 2 updated".to_string(),
            "ERROR: port unknown".to_string(),
            "Error: threshold exceeds max".to_string(),
        ];
        assert_eq!(scan_for_error(&msgs), Some("ERROR: port unknown"));
    }

    #[test]
    fn scan_ignores_non_prefix_mentions() {
        let msgs = vec![
            "ok: no error".to_string(),
            "err".to_string(),
            "érror".to_string(),
        ];
        assert_eq!(scan_for_error(&msgs), None);
        assert_eq!(scan_for_error(&[]), None);
    }
}
