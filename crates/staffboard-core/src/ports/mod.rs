//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。外部（REST バックエンド、
//! 描画側の購読者、時計）とのインターフェースを trait で定義する。
//!
//! # 設計原則
//! - Remote Store が source of truth（正本）
//! - クライアント側は一覧を丸ごと取り直すだけで、差分を持たない

pub mod clock;
pub mod event_sink;
pub mod transport;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::transport::{ApiRequest, ApiResponse, Method, Transport};
