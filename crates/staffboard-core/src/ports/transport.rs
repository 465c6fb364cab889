//! Transport port - REST バックエンドへの 1 リクエスト
//!
//! Transport はステータスコードを解釈しない。2xx かどうかの判断は
//! 呼び出し側（ApiClient / ワークフロー）が操作ごとに行う。
//!
//! # 実装
//! - **HttpTransport**: reqwest（本番用）
//! - **InMemoryBackend**: バックエンドのエミュレーション（テスト用）

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::domain::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ApiRequest はメソッド・パス・JSON ボディの組
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// `/api/...` 形式の絶対パス
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body,
        }
    }
}

/// ApiResponse はステータスと（あれば）JSON ボディ
///
/// ボディが空、または JSON でない場合は `Value::Null`。
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport はリクエストを送ってレスポンスを返す
///
/// # Thread Safety
/// - `Send + Sync` を要求（Arc で共有するため）
#[async_trait]
pub trait Transport: Send + Sync {
    /// レスポンスが得られなかった場合のみ `Err`（ステータスは見ない）
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, StoreError>;
}
