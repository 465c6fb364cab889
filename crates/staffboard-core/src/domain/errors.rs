//! Errors - エラー型
//!
//! - StoreError: Remote Store とのやり取りの失敗
//! - WorkflowError: モーダルからの送信の失敗

use super::state::ModalPhase;

/// StoreError は Remote Store とのやり取りで起きるエラー
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 接続・タイムアウトなど（レスポンス自体が無い）
    #[error("{method} {path} failed: {message}")]
    Transport {
        method: &'static str,
        path: String,
        message: String,
    },

    /// 一覧取得が 2xx 以外を返した
    #[error("{path} answered with status {status}")]
    Status { path: String, status: u16 },

    /// リクエストボディを JSON にできなかった
    #[error("could not encode request body for {path}: {message}")]
    Encode { path: String, message: String },

    /// ボディが期待した形ではない
    #[error("malformed response from {path}: {message}")]
    Decode { path: String, message: String },
}

/// WorkflowError はモーダルからの送信で起きるエラー
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Idle のまま送信しようとした
    #[error("nothing is staged (modal is {0:?})")]
    NothingStaged(ModalPhase),

    /// 必須フィールドが空（リクエストは送っていない）
    #[error("required field '{0}' is empty")]
    MissingField(&'static str),

    /// バックエンドが 2xx 以外を返した（モーダルは開いたまま）
    #[error("backend rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// ConfigError は設定の読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
