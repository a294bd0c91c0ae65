//! 通知层 - 发送渠道与去重
//!
//! # 使用示例
//! ```ignore
//! use homework_status_bot::notification::{DedupChannel, NotificationDeduplicator};
//!
//! let mut dedup = NotificationDeduplicator::new();
//! if dedup.is_new(DedupChannel::Status, &text) {
//!     if channel.send(&text).await?.is_sent() {
//!         dedup.record(DedupChannel::Status, &text);
//!     }
//! }
//! ```

pub mod channel;
pub mod channels;
pub mod deduplicator;

pub use channel::{NotificationChannel, SendResult};
pub use channels::{ConsoleChannel, TelegramChannel, TelegramConfig};
pub use deduplicator::{DedupChannel, NotificationDeduplicator};
