//! 通知去重器 - 同一条消息在进程生命周期内只发送一次
//!
//! ## 去重策略
//! 1. 以渲染后的完整文本作为 key（精确字符串相等）
//! 2. 状态通知和错误通知使用两个独立的命名空间
//! 3. 只在确认发送成功后记录，发送失败不会占用去重位置
//! 4. 记录只增不减，不持久化

use std::collections::HashSet;
use tracing::debug;

/// 去重命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DedupChannel {
    /// 作业状态变化通知
    Status,
    /// 运行错误通知
    Error,
}

impl DedupChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupChannel::Status => "status",
            DedupChannel::Error => "error",
        }
    }
}

impl std::fmt::Display for DedupChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 通知去重器
#[derive(Debug, Default)]
pub struct NotificationDeduplicator {
    /// 已发送的状态通知
    status: HashSet<String>,
    /// 已发送的错误通知
    errors: HashSet<String>,
}

impl NotificationDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, channel: DedupChannel) -> &HashSet<String> {
        match channel {
            DedupChannel::Status => &self.status,
            DedupChannel::Error => &self.errors,
        }
    }

    /// 消息在该命名空间内是否尚未发送过
    pub fn is_new(&self, channel: DedupChannel, message: &str) -> bool {
        let new = !self.set(channel).contains(message);
        if !new {
            debug!(channel = %channel, "Notification deduplicated (already sent)");
        }
        new
    }

    /// 记录消息已发送（幂等）
    pub fn record(&mut self, channel: DedupChannel, message: &str) {
        let set = match channel {
            DedupChannel::Status => &mut self.status,
            DedupChannel::Error => &mut self.errors,
        };
        if !set.contains(message) {
            set.insert(message.to_string());
        }
    }

    /// 该命名空间内已记录的消息数
    pub fn len(&self, channel: DedupChannel) -> usize {
        self.set(channel).len()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && self.errors.is_empty()
    }
}
