//! 控制台渠道 - dry-run 模式下打印通知而不发送

use crate::error::BotError;
use crate::notification::channel::{NotificationChannel, SendResult};
use async_trait::async_trait;

/// 控制台渠道
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, text: &str) -> Result<SendResult, BotError> {
        println!("[notification] {}", text);
        Ok(SendResult::Sent)
    }
}
