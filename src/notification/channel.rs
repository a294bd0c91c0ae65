//! 通知渠道 trait 定义

use crate::error::BotError;
use async_trait::async_trait;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（渠道决定不发送，例如空消息）
    Skipped(String),
}

impl SendResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent)
    }
}

/// 通知渠道 trait
///
/// 发送失败返回 `BotError::Delivery`，由调用方记录日志，不会中断轮询。
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 发送一条文本消息到固定的目标
    async fn send(&self, text: &str) -> Result<SendResult, BotError>;
}

#[async_trait]
impl<T: NotificationChannel + ?Sized> NotificationChannel for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn send(&self, text: &str) -> Result<SendResult, BotError> {
        (**self).send(text).await
    }
}
