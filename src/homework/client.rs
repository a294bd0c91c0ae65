//! 作业状态 API 客户端
//!
//! `GET <endpoint>?from_date=<unix_ts>`，认证头 `Authorization: OAuth <token>`。
//! 不做内部重试，重试由轮询周期负责。

use crate::error::{BotError, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 默认 API 地址
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// 默认请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 作业状态数据源
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// 拉取 `since`（Unix 秒）之后的作业状态，返回原始 JSON
    async fn fetch(&self, since: i64) -> Result<Value, BotError>;
}

/// 客户端配置
#[derive(Debug, Clone)]
pub struct PracticumConfig {
    pub endpoint: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl Default for PracticumConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: String::new(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// 作业状态 API 客户端
#[derive(Debug)]
pub struct PracticumClient {
    client: Client,
    config: PracticumConfig,
}

impl PracticumClient {
    pub fn new(config: PracticumConfig) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BotError::Unexpected(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch(&self, since: i64) -> Result<Value, BotError> {
        debug!(from_date = since, endpoint = %self.config.endpoint, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.config.endpoint)
            .header("Authorization", format!("OAuth {}", self.config.token))
            .query(&[("from_date", since)])
            .send()
            .await
            // URL 里带有会变化的 from_date，去掉后同一故障的错误文本保持一致
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = response.status();
        debug!(from_date = since, status = status.as_u16(), "Homework API responded");

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()).into());
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.without_url()))?;
        Ok(payload)
    }
}
