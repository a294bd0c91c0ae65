//! 轮询循环 - 拉取 → 校验 → 格式化 → 去重 → 发送 → 休眠
//!
//! 单任务运行，同一时间只有一个周期在执行。任何阶段的错误都在阶段边界捕获，
//! 转换成错误通知后走同一条去重发送管道，循环本身不会因可恢复错误退出。

use crate::config::BotConfig;
use crate::error::{failure_message, BotError};
use crate::homework::{format_status, validate_response, HomeworkRecord, HomeworkSource};
use crate::notification::{DedupChannel, NotificationChannel, NotificationDeduplicator, SendResult};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// 本周期结束后需要休眠的时长（不会为负）
pub fn sleep_duration(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// 下一次拉取的起始时间戳：`now - lookback`，不早于 0
pub fn lookback_cursor(now: DateTime<Utc>, lookback: chrono::Duration) -> i64 {
    (now - lookback).timestamp().max(0)
}

/// 单个周期的处理结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// 本周期拉取到的作业记录数
    pub records: usize,
    /// 实际发送成功的消息数
    pub sent: usize,
    /// 因去重跳过的消息数
    pub duplicates: usize,
    /// 发送失败或被渠道跳过的消息数
    pub failed: usize,
    /// 本周期捕获的错误数（拉取、校验、格式化）
    pub errors: usize,
}

/// 轮询循环
pub struct PollLoop<S, C> {
    source: S,
    channel: C,
    dedup: NotificationDeduplicator,
    /// 下一次拉取的 `from_date`，启动时为 0（拉取全部历史）
    cursor: i64,
    interval: Duration,
    lookback: chrono::Duration,
    cycles: u64,
}

impl<S: HomeworkSource, C: NotificationChannel> PollLoop<S, C> {
    pub fn new(source: S, channel: C, interval: Duration, lookback: chrono::Duration) -> Self {
        Self {
            source,
            channel,
            dedup: NotificationDeduplicator::new(),
            cursor: 0,
            interval,
            lookback,
            cycles: 0,
        }
    }

    /// 使用配置中的轮询间隔和回看窗口创建
    pub fn from_config(source: S, channel: C, config: &BotConfig) -> Self {
        Self::new(source, channel, config.poll_interval, config.lookback)
    }

    pub fn deduplicator(&self) -> &NotificationDeduplicator {
        &self.dedup
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// 拉取并校验
    async fn fetch_homeworks(&self) -> Result<Vec<HomeworkRecord>, BotError> {
        let payload = self.source.fetch(self.cursor).await?;
        validate_response(&payload)
    }

    /// 执行一个完整周期（不含休眠）
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let span = info_span!("poll_cycle", cycle = self.cycles, from_date = self.cursor);
        self.cycle_inner().instrument(span).await
    }

    async fn cycle_inner(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let mut messages = Vec::new();
        let mut failures = Vec::new();

        match self.fetch_homeworks().await {
            Ok(records) => {
                report.records = records.len();
                for record in &records {
                    match format_status(record) {
                        Ok(message) => messages.push(message),
                        Err(e) => {
                            error!(kind = e.kind(), error = %e, record = %record.raw, "Cannot format homework record");
                            failures.push(e);
                        }
                    }
                }
            }
            Err(e) => {
                error!(
                    kind = e.kind(),
                    status = ?e.status_code(),
                    error = %e,
                    "Fetching homework statuses failed"
                );
                failures.push(e);
            }
        }

        report.errors = failures.len();

        for message in messages {
            self.deliver(DedupChannel::Status, &message, &mut report).await;
        }
        for failure in &failures {
            let message = failure_message(failure);
            self.deliver(DedupChannel::Error, &message, &mut report).await;
        }

        // 回看 24 小时而不是推进到 now，避免偶发失败漏掉状态变化
        self.cursor = lookback_cursor(Utc::now(), self.lookback);
        debug!(next_from_date = self.cursor, "Cursor updated");

        info!(
            records = report.records,
            sent = report.sent,
            duplicates = report.duplicates,
            failed = report.failed,
            errors = report.errors,
            "Poll cycle finished"
        );
        report
    }

    /// 去重后发送，只在确认发送后记录
    async fn deliver(&mut self, channel: DedupChannel, message: &str, report: &mut CycleReport) {
        if !self.dedup.is_new(channel, message) {
            report.duplicates += 1;
            return;
        }

        match self.channel.send(message).await {
            Ok(SendResult::Sent) => {
                self.dedup.record(channel, message);
                report.sent += 1;
            }
            Ok(SendResult::Skipped(reason)) => {
                warn!(channel = self.channel.name(), reason = %reason, "Notification skipped");
                report.failed += 1;
            }
            Err(e) => {
                error!(
                    channel = self.channel.name(),
                    kind = e.kind(),
                    error = %e,
                    "Notification delivery failed"
                );
                report.failed += 1;
            }
        }
    }

    /// 持续轮询，直到 `shutdown` 完成
    ///
    /// 取消只在周期之间和休眠期间生效，不会打断正在执行的周期。
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(interval_secs = self.interval.as_secs(), "Poll loop started");

        loop {
            let started = Instant::now();
            self.run_cycle().await;

            let pause = sleep_duration(self.interval, started.elapsed());
            debug!(sleep_secs = pause.as_secs(), "Sleeping until next cycle");

            tokio::select! {
                _ = &mut shutdown => {
                    info!(cycles = self.cycles, "Shutdown requested, poll loop stopping");
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }
}
