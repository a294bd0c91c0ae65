//! Homework Status Bot - 轮询作业审核 API，把状态变化转发到 Telegram

pub mod config;
pub mod error;
pub mod homework;
pub mod notification;
pub mod poller;

pub use config::{BotConfig, FileConfig, RawConfig};
pub use error::{failure_message, BotError, FetchError, EXIT_CONFIG};
pub use homework::{
    format_status, validate_response, HomeworkRecord, HomeworkSource, HomeworkStatus,
    PracticumClient, PracticumConfig,
};
pub use notification::{
    ConsoleChannel, DedupChannel, NotificationChannel, NotificationDeduplicator, SendResult,
    TelegramChannel, TelegramConfig,
};
pub use poller::{lookback_cursor, sleep_duration, CycleReport, PollLoop};
