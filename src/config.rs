//! 配置加载
//!
//! 读取优先级（从高到低）：
//! 1. 命令行参数
//! 2. 环境变量 `PRACTICUM_TOKEN` / `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID`（含当前目录 `.env`），
//!    旧名称 `TOKEN_YA` / `TOKEN_BOT` 作为后备
//! 3. 配置文件 `~/.config/homework-bot/config.json`（或 `--config` 指定的路径）

use crate::error::BotError;
use crate::homework::client::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::notification::channels::telegram::TELEGRAM_API_BASE;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// 默认轮询间隔（秒）
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// 默认回看窗口（秒）
pub const DEFAULT_LOOKBACK_SECS: i64 = 24 * 60 * 60;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// 旧版 `.env` 中使用的变量名
pub const LEGACY_PRACTICUM_TOKEN: &str = "TOKEN_YA";
pub const LEGACY_TELEGRAM_TOKEN: &str = "TOKEN_BOT";

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/homework-bot/config.json"))
}

/// 配置文件内容（所有字段可选）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub practicum_token: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub endpoint: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// 从指定路径读取配置文件
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// 读取默认路径的配置文件，不存在时返回 None
    pub fn load_default() -> Result<Option<Self>> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path).map(Some),
            _ => Ok(None),
        }
    }
}

/// 尚未校验的配置
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub practicum_token: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub endpoint: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub telegram_api_base: Option<String>,
}

/// 空字符串视为缺失
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 时长类配置必须大于 0
fn positive(field: &'static str, secs: u64) -> Result<u64, BotError> {
    if secs == 0 {
        error!(field = field, fatal = true, "Configuration value must be greater than 0");
        return Err(BotError::InvalidConfiguration {
            field,
            reason: "must be greater than 0 seconds".to_string(),
        });
    }
    Ok(secs)
}

impl RawConfig {
    /// 用配置文件补全缺失的值（已有值不会被覆盖）
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        self.practicum_token = non_empty(self.practicum_token).or(file.practicum_token);
        self.telegram_token = non_empty(self.telegram_token).or(file.telegram_token);
        self.telegram_chat_id = non_empty(self.telegram_chat_id).or(file.telegram_chat_id);
        self.endpoint = non_empty(self.endpoint).or(file.endpoint);
        self.poll_interval_secs = self.poll_interval_secs.or(file.poll_interval_secs);
        self.request_timeout_secs = self.request_timeout_secs.or(file.request_timeout_secs);
        self
    }

    /// 用旧变量名补全缺失的 token（`lookup` 通常是环境变量读取）
    pub fn with_legacy_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if non_empty(self.practicum_token.clone()).is_none() {
            if let Some(token) = non_empty(lookup(LEGACY_PRACTICUM_TOKEN)) {
                debug!(variable = LEGACY_PRACTICUM_TOKEN, "Using legacy variable for {}", PRACTICUM_TOKEN);
                self.practicum_token = Some(token);
            }
        }
        if non_empty(self.telegram_token.clone()).is_none() {
            if let Some(token) = non_empty(lookup(LEGACY_TELEGRAM_TOKEN)) {
                debug!(variable = LEGACY_TELEGRAM_TOKEN, "Using legacy variable for {}", TELEGRAM_TOKEN);
                self.telegram_token = Some(token);
            }
        }
        self
    }

    /// 缺失的必需配置项名称
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN, &self.practicum_token),
            (TELEGRAM_TOKEN, &self.telegram_token),
            (TELEGRAM_CHAT_ID, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    /// 必需配置项是否齐全
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// 校验并生成最终配置
    pub fn into_config(self) -> Result<BotConfig, BotError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            for name in &missing {
                error!(
                    variable = %name,
                    fatal = true,
                    "Required configuration value is missing, the bot will stop"
                );
            }
            return Err(BotError::Configuration { missing });
        }
        info!("Required configuration values are present");

        let poll_interval_secs = positive(
            "poll_interval_secs",
            self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )?;
        let request_timeout_secs = positive(
            "request_timeout_secs",
            self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )?;

        Ok(BotConfig {
            practicum_token: self.practicum_token.unwrap_or_default(),
            telegram_token: self.telegram_token.unwrap_or_default(),
            telegram_chat_id: self.telegram_chat_id.unwrap_or_default(),
            endpoint: non_empty(self.endpoint).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            poll_interval: Duration::from_secs(poll_interval_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
            lookback: chrono::Duration::seconds(DEFAULT_LOOKBACK_SECS),
            telegram_api_base: non_empty(self.telegram_api_base)
                .unwrap_or_else(|| TELEGRAM_API_BASE.to_string()),
        })
    }
}

/// 完整且已校验的配置
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub endpoint: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub lookback: chrono::Duration,
    pub telegram_api_base: String,
}
