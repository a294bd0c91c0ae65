//! Telegram 渠道（基于 Bot API `sendMessage`）

use crate::error::BotError;
use crate::notification::channel::{NotificationChannel, SendResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Telegram Bot API 地址
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram 渠道配置
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token
    pub bot_token: String,
    /// Chat ID
    pub chat_id: String,
    /// API 地址（测试时可替换）
    pub api_base: String,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: TELEGRAM_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

/// sendMessage 请求体
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Bot API 响应
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram 渠道
#[derive(Debug)]
pub struct TelegramChannel {
    client: Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BotError::Unexpected(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<SendResult, BotError> {
        if text.trim().is_empty() {
            return Ok(SendResult::Skipped("empty message".to_string()));
        }

        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
        };

        // 不记录 URL，里面带有 bot token
        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Delivery(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let body: BotApiResponse = response.json().await.map_err(|e| {
            BotError::Delivery(format!("failed to parse response ({}): {}", status, e.without_url()))
        })?;

        if status.is_success() && body.ok {
            info!(chat_id = %self.config.chat_id, message = %text, "Bot sent message");
            Ok(SendResult::Sent)
        } else {
            let description = body
                .description
                .unwrap_or_else(|| format!("status {}", status));
            error!(chat_id = %self.config.chat_id, error = %description, "Failed to send message");
            Err(BotError::Delivery(description))
        }
    }
}
