//! Homework Status Bot CLI
//!
//! 轮询作业审核 API，把状态变化和运行错误发送到 Telegram 聊天

use anyhow::Result;
use clap::{Parser, Subcommand};
use homework_status_bot::{
    BotConfig, ConsoleChannel, FileConfig, NotificationChannel, PollLoop,
    PracticumClient, PracticumConfig, RawConfig, TelegramChannel, TelegramConfig,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "homework-bot")]
#[command(about = "Homework Status Bot - 作业审核状态变化通知")]
#[command(version)]
struct Cli {
    /// 作业 API token
    #[arg(long, env = "PRACTICUM_TOKEN", hide_env_values = true, global = true)]
    practicum_token: Option<String>,
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true, global = true)]
    telegram_token: Option<String>,
    /// 接收通知的 chat ID
    #[arg(long, env = "TELEGRAM_CHAT_ID", global = true)]
    telegram_chat_id: Option<String>,
    /// 作业 API 地址
    #[arg(long, env = "PRACTICUM_ENDPOINT", global = true)]
    endpoint: Option<String>,
    /// 轮询间隔（秒）
    #[arg(long, short, global = true)]
    interval: Option<u64>,
    /// 请求超时（秒）
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// 配置文件路径（默认 ~/.config/homework-bot/config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// 只打印通知，不发送到 Telegram
    #[arg(long, global = true)]
    dry_run: bool,
    /// 日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 持续轮询（默认）
    Run,
    /// 执行一个周期后退出
    Once,
    /// 检查配置是否完整
    CheckConfig,
}

impl Cli {
    fn raw_config(&self) -> RawConfig {
        RawConfig {
            practicum_token: self.practicum_token.clone(),
            telegram_token: self.telegram_token.clone(),
            telegram_chat_id: self.telegram_chat_id.clone(),
            endpoint: self.endpoint.clone(),
            poll_interval_secs: self.interval,
            request_timeout_secs: self.timeout,
            telegram_api_base: None,
        }
        .with_legacy_env(|name| std::env::var(name).ok())
    }
}

fn init_logging(level: &str) {
    // 通过 RUST_LOG 环境变量控制日志级别，默认使用 --log-level
    // 例如: RUST_LOG=debug homework-bot run
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("homework_status_bot={level},homework_bot={level}"))
    });

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// 合并命令行、环境变量和配置文件
fn load_config(cli: &Cli) -> Result<RawConfig> {
    let file = match &cli.config {
        Some(path) => Some(FileConfig::load_from(path)?),
        None => FileConfig::load_default()?,
    };

    let raw = cli.raw_config();
    Ok(match file {
        Some(file) => raw.merge_file(file),
        None => raw,
    })
}

fn build_channel(config: &BotConfig, dry_run: bool) -> Result<Box<dyn NotificationChannel>> {
    if dry_run {
        warn!("Dry-run mode: notifications are printed, not sent");
        return Ok(Box::new(ConsoleChannel::new()));
    }

    let mut telegram = TelegramConfig::new(&config.telegram_token, &config.telegram_chat_id);
    telegram.api_base = config.telegram_api_base.clone();
    telegram.timeout_secs = config.request_timeout.as_secs();
    Ok(Box::new(TelegramChannel::new(telegram)?))
}

fn build_source(config: &BotConfig) -> Result<PracticumClient> {
    Ok(PracticumClient::new(PracticumConfig {
        endpoint: config.endpoint.clone(),
        token: config.practicum_token.clone(),
        timeout_secs: config.request_timeout.as_secs(),
    })?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level);
    info!("=======START=======");

    let raw = load_config(&cli)?;
    let config = match raw.into_config() {
        Ok(config) => config,
        Err(e) => match e.exit_code() {
            Some(code) => {
                error!(error = %e, "Configuration is incomplete or invalid, exiting");
                std::process::exit(code);
            }
            None => return Err(e.into()),
        },
    };

    let command = cli.command.unwrap_or(Commands::Run);
    if let Commands::CheckConfig = command {
        println!("Configuration is complete");
        return Ok(());
    }

    let source = build_source(&config)?;
    let channel = build_channel(&config, cli.dry_run)?;
    let mut poller = PollLoop::from_config(source, channel, &config);

    match command {
        Commands::Once => {
            let report = poller.run_cycle().await;
            println!(
                "records: {}, sent: {}, duplicates: {}, failed: {}, errors: {}",
                report.records, report.sent, report.duplicates, report.failed, report.errors
            );
        }
        _ => poller.run(shutdown_signal()).await,
    }

    Ok(())
}
