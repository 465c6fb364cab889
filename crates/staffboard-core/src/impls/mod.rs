//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpTransport**: reqwest による Transport（本番用）
//! - **InMemoryBackend**: REST バックエンドのエミュレーション（開発・テスト用）
//! - **BroadcastEventSink**: tokio broadcast による EventSink

pub mod broadcast_sink;
pub mod http;
pub mod inmem_backend;

pub use self::broadcast_sink::BroadcastEventSink;
pub use self::http::HttpTransport;
pub use self::inmem_backend::InMemoryBackend;
