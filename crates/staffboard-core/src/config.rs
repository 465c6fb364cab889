//! ClientConfig - REST バックエンドへの接続設定
//!
//! 環境変数から読み込む:
//! - `STAFFBOARD_API_URL`: ベース URL（既定 `http://127.0.0.1:8000`）
//! - `STAFFBOARD_REQUEST_TIMEOUT_SECS`: リクエストのタイムアウト秒（既定 20）

use std::time::Duration;

use crate::domain::ConfigError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const ENV_API_URL: &str = "STAFFBOARD_API_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "STAFFBOARD_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の lookup 関数から読み込む（テストでは環境変数を触らない）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(ENV_API_URL)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = validate_api_url(ENV_API_URL, api_url)?;

        let request_timeout = lookup(ENV_REQUEST_TIMEOUT_SECS)
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let secs = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: ENV_REQUEST_TIMEOUT_SECS,
                    reason: format!("'{raw}' is not a whole number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: ENV_REQUEST_TIMEOUT_SECS,
                        reason: "must be greater than zero".to_owned(),
                    });
                }
                Ok(Duration::from_secs(secs))
            })
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        Ok(Self {
            api_url,
            request_timeout,
        })
    }

    /// ベース URL を差し替える（CLI の `--api-url`）
    pub fn with_api_url(self, api_url: impl Into<String>) -> Result<Self, ConfigError> {
        let api_url = validate_api_url("--api-url", api_url.into().trim().to_owned())?;
        Ok(Self { api_url, ..self })
    }
}

fn validate_api_url(name: &'static str, api_url: String) -> Result<String, ConfigError> {
    if api_url.starts_with("http://") || api_url.starts_with("https://") {
        Ok(api_url.trim_end_matches('/').to_owned())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("'{api_url}' must start with http:// or https://"),
        })
    }
}
