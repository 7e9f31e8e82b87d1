// ── Cross-panel notifications ──
//
// Panels share no state. They do emit two kinds of fire-and-forget
// signals: transient notices for the operator, and a data-free change
// signal telling the summary counts to refresh.

use std::sync::Arc;

use serde::Serialize;
use strum::Display;
use tokio::sync::{broadcast, watch};

const NOTICE_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// Transient operator notification. Nothing retains these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.level == NoticeLevel::Failure
    }
}

/// Broadcast bus for [`Notice`]s. Sending with no subscribers is a no-op.
#[derive(Debug, Clone)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn emit(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// "Something changed" signal. Carries only a generation counter.
#[derive(Debug, Clone)]
pub struct ChangeSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn notify(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.tx.send_modify(|generation| *generation += 1);
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for ChangeSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_signal_counts_generations() {
        let signal = ChangeSignal::new();
        let rx = signal.subscribe();
        signal.notify();
        signal.clone().notify();
        assert_eq!(signal.generation(), 2);
        assert!(rx.has_changed().unwrap_or(false));
    }

    #[tokio::test]
    async fn notices_reach_subscribers() {
        let bus = NoticeBus::new();
        let mut rx = bus.subscribe();
        bus.emit(Notice::failure("Failed to block IP", "boom"));
        let got = rx.recv().await.ok();
        assert_eq!(got.map(|n| n.is_failure()), Some(true));
    }
}
