//! HttpTransport - reqwest による Transport 実装

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{ConfigError, StoreError};
use crate::ports::{ApiRequest, ApiResponse, Method, Transport};

/// HttpTransport は設定されたベース URL に JSON リクエストを送る
#[derive(Clone)]
pub struct HttpTransport {
    api_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|error| ConfigError::Invalid {
                name: "http client",
                reason: format!("failed to build HTTP client: {error}"),
            })?;

        Ok(Self {
            api_url: config.api_url.clone(),
            client,
        })
    }

    /// パスの末尾スラッシュはそのまま残す（バックエンドのルーティングが要求する）
    fn endpoint(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        let suffix = path.trim_start_matches('/');
        format!("{base}/{suffix}")
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or(Value::Null)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, StoreError> {
        let url = self.endpoint(&request.path);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(to_reqwest(request.method), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let transport_error = |error: reqwest::Error| StoreError::Transport {
            method: request.method.as_str(),
            path: request.path.clone(),
            message: error.to_string(),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;

        debug!(method = %request.method, %url, status, "received response");
        Ok(ApiResponse::new(status, parse_body(&text)))
    }
}
