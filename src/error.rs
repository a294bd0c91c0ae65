//! 错误类型 - 轮询流程中所有可能出现的失败
//!
//! 除 `Configuration` 外，所有错误都在抛出它的阶段边界被捕获，
//! 转换为 `failure_message()` 文本后通过通知渠道发出。

use thiserror::Error;

/// 配置不完整或无效时的退出码（sysexits EX_CONFIG）
pub const EXIT_CONFIG: i32 = 78;

/// 远程 API 请求失败
#[derive(Debug, Error)]
pub enum FetchError {
    /// 服务器返回非 2xx 状态码
    #[error("unexpected response from the server, status code {0}")]
    Status(u16),
    /// 连接失败、超时等传输层错误
    #[error("request to the homework API failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// 2xx 响应但正文不是 JSON
    #[error("response body is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// 对应的 HTTP 状态码（如果有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            FetchError::Transport(e) | FetchError::Decode(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// 通知机器人错误
#[derive(Debug, Error)]
pub enum BotError {
    /// 缺少必需的配置项（启动时致命）
    #[error("missing required configuration: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    /// 配置项取值无效（启动时致命）
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error(transparent)]
    RemoteFetch(#[from] FetchError),

    /// 响应结构不符合约定
    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    /// 作业记录缺少必需字段
    #[error("field `{0}` is missing from the homework record")]
    MissingField(&'static str),

    /// 作业状态缺失或无法识别
    #[error("{}", describe_status(.0))]
    UnknownStatus(Option<String>),

    /// 通知发送失败
    #[error("failed to deliver notification: {0}")]
    Delivery(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

fn describe_status(status: &Option<String>) -> String {
    match status {
        Some(status) => format!("homework status \"{}\" is not recognized", status),
        None => "homework status is missing from the homework record".to_string(),
    }
}

impl BotError {
    /// 只有配置错误会终止进程
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::Configuration { .. } | BotError::InvalidConfiguration { .. }
        )
    }

    /// 致命错误对应的进程退出码
    pub fn exit_code(&self) -> Option<i32> {
        self.is_fatal().then_some(EXIT_CONFIG)
    }

    /// 远程请求失败时的 HTTP 状态码
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BotError::RemoteFetch(e) => e.status_code(),
            _ => None,
        }
    }

    /// 错误类别，用于结构化日志
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::Configuration { .. } | BotError::InvalidConfiguration { .. } => {
                "configuration"
            }
            BotError::RemoteFetch(_) => "remote_fetch",
            BotError::MalformedResponse(_) => "malformed_response",
            BotError::MissingField(_) => "missing_field",
            BotError::UnknownStatus(_) => "unknown_status",
            BotError::Delivery(_) => "delivery",
            BotError::Unexpected(_) => "unexpected",
        }
    }
}

/// 发送给用户的故障通知文本
pub fn failure_message(error: &BotError) -> String {
    format!("Program failure: {}", error)
}
