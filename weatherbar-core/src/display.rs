//! Display sinks: where the formatted label text goes.
//!
//! The label itself is owned by one task. Everything else holds a
//! [`ChannelSink`] and sends text to that owner instead of touching the label.

use tokio::sync::mpsc;

pub trait DisplaySink: Send + Sync {
    fn show(&self, text: String);
}

/// Sending half handed to the scheduler and anything else producing label text.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

/// Receiving half, held by the task that owns the label.
#[derive(Debug)]
pub struct DisplayReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

pub fn channel() -> (ChannelSink, DisplayReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, DisplayReceiver { rx })
}

impl DisplaySink for ChannelSink {
    fn show(&self, text: String) {
        if self.tx.send(text).is_err() {
            tracing::debug!("display receiver dropped; discarding label update");
        }
    }
}

impl DisplayReceiver {
    /// Next label text, or `None` once every sink is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Drain whatever is queued and return only the newest text.
    pub fn try_latest(&mut self) -> Option<String> {
        let mut latest = None;
        while let Ok(text) = self.rx.try_recv() {
            latest = Some(text);
        }
        latest
    }
}
