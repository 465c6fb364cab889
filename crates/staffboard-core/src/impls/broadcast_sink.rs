//! BroadcastEventSink - tokio broadcast による EventSink 実装

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::Signal;
use crate::ports::EventSink;

pub const DEFAULT_SIGNAL_CAPACITY: usize = 64;

/// BroadcastEventSink は Signal を全購読者に配る
///
/// 購読者がいない間に発行された Signal は捨てられる。
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<Signal>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_CAPACITY)
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, signal: Signal) {
        // 購読者がいない場合の送信エラーは無視する
        let receivers = self.sender.send(signal).unwrap_or(0);
        debug!(signal = %signal, receivers, "signal emitted");
    }
}
