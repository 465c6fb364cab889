//! EventSink port - リフレッシュ要求の発行
//!
//! パネル（子）からシェル（親）への通知経路。パネルは購読者を知らない。
//!
//! # 実装
//! - **BroadcastEventSink**: tokio broadcast（シェルが購読）

use crate::domain::Signal;

/// EventSink は Signal を購読者に届ける
pub trait EventSink: Send + Sync {
    /// 購読者がいなくてもエラーにしない
    fn emit(&self, signal: Signal);
}
