//! staffboard-core
//!
//! Client-side core for the staff / task / assignment board.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, staff, task, assignment, state, events, errors）
//! - **ports**: 抽象化レイヤー（Transport, EventSink, Clock）
//! - **app**: アプリケーションロジック（cache, resolver, workflow, panel, shell）
//! - **impls**: 実装（HttpTransport, InMemoryBackend, BroadcastEventSink）
//! - **config**: 環境変数からの設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use self::config::ClientConfig;
