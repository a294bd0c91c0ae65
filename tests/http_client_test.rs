//! HTTP 客户端测试 - 作业 API 和 Telegram Bot API
//!
//! 使用本地 TcpListener 返回预设响应，检查请求内容和错误映射。

use async_trait::async_trait;
use homework_status_bot::{
    BotError, FetchError, HomeworkSource, NotificationChannel, PollLoop, PracticumClient,
    PracticumConfig, SendResult, TelegramChannel, TelegramConfig,
};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// 读完一个完整请求（头部 + Content-Length 指定的正文）
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            if buf.len() >= end + 4 + content_length(&head) {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

/// 依次接受 `count` 个连接，每个都返回 `response`，JoinHandle 产出原始请求文本
async fn serve(response: String, count: usize) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for _ in 0..count {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let (base, handle) = serve(response, 1).await;
    let handle = tokio::spawn(async move { handle.await.unwrap().remove(0) });
    (base, handle)
}

/// 端口已关闭的地址
async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// 记录发送内容的渠道
#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<SendResult, BotError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(SendResult::Sent)
    }
}

fn practicum(base: &str) -> PracticumClient {
    PracticumClient::new(PracticumConfig {
        endpoint: format!("{}/api/user_api/homework_statuses/", base),
        token: "secret-token".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn telegram(base: &str) -> TelegramChannel {
    let mut config = TelegramConfig::new("123:abc", "42");
    config.api_base = base.to_string();
    config.timeout_secs = 5;
    TelegramChannel::new(config).unwrap()
}

// ============================================================================
// 作业 API
// ============================================================================

#[tokio::test]
async fn test_fetch_sends_cursor_and_oauth_header() {
    let body = r#"{"homeworks": [{"homework_name": "hw1", "status": "approved"}], "current_date": 1}"#;
    let (base, server) = serve_once(http_response("200 OK", body)).await;

    let payload = practicum(&base).fetch(1_700_000_000).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /api/user_api/homework_statuses/?from_date=1700000000 HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: oauth secret-token"));
    assert_eq!(payload["homeworks"][0]["homework_name"], "hw1");
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let (base, server) = serve_once(http_response("500 Internal Server Error", "{}")).await;

    let err = practicum(&base).fetch(0).await.unwrap_err();
    server.await.unwrap();

    match err {
        BotError::RemoteFetch(FetchError::Status(code)) => assert_eq!(code, 500),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_empty_body_is_decode_failure() {
    let (base, server) = serve_once(http_response("204 No Content", "")).await;

    let err = practicum(&base).fetch(0).await.unwrap_err();
    server.await.unwrap();

    // 204 没有正文，无法解析为 JSON
    assert!(matches!(err, BotError::RemoteFetch(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_fetch_invalid_json() {
    let (base, server) = serve_once(http_response("200 OK", "not json")).await;

    let err = practicum(&base).fetch(0).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, BotError::RemoteFetch(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let err = practicum(&closed_port().await).fetch(0).await.unwrap_err();

    assert!(matches!(err, BotError::RemoteFetch(FetchError::Transport(_))));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_transport_error_text_independent_of_cursor() {
    let client = practicum(&closed_port().await);

    let first = client.fetch(0).await.unwrap_err();
    let second = client.fetch(1_700_000_000).await.unwrap_err();

    assert!(!first.to_string().contains("from_date"));
    assert_eq!(first.to_string(), second.to_string());
}

#[tokio::test]
async fn test_outage_reported_once_across_cycles() {
    let source = practicum(&closed_port().await);
    let mut poller = PollLoop::new(
        source,
        RecordingChannel::default(),
        Duration::from_secs(600),
        chrono::Duration::hours(24),
    );

    let first = poller.run_cycle().await;
    let second = poller.run_cycle().await;
    let third = poller.run_cycle().await;

    assert_eq!(first.sent, 1);
    assert_eq!(second.duplicates, 1);
    assert_eq!(third.duplicates, 1);
    let sent = poller.channel().sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("Program failure: request to the homework API failed"));
}

#[tokio::test]
async fn test_invalid_json_reported_once_across_cycles() {
    let (base, server) = serve(http_response("200 OK", "<html>maintenance</html>"), 2).await;
    let mut poller = PollLoop::new(
        practicum(&base),
        RecordingChannel::default(),
        Duration::from_secs(600),
        chrono::Duration::hours(24),
    );

    poller.run_cycle().await;
    let second = poller.run_cycle().await;
    let requests = server.await.unwrap();

    // 两次请求的 from_date 不同，但错误通知只发一次
    assert!(requests[0].contains("from_date=0 "));
    assert!(!requests[1].contains("from_date=0 "));
    assert_eq!(second.duplicates, 1);
    let sent = poller.channel().sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("not valid JSON"));
}

// ============================================================================
// Telegram
// ============================================================================

#[tokio::test]
async fn test_telegram_send_message() {
    let (base, server) = serve_once(http_response("200 OK", r#"{"ok": true, "result": {}}"#)).await;

    let result = telegram(&base).send("hello").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(result, SendResult::Sent);
    assert!(request.starts_with("POST /bot123:abc/sendMessage HTTP/1.1"));
    assert!(request.contains(r#""chat_id":"42""#));
    assert!(request.contains(r#""text":"hello""#));
}

#[tokio::test]
async fn test_telegram_api_error() {
    let body = r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#;
    let (base, server) = serve_once(http_response("400 Bad Request", body)).await;

    let err = telegram(&base).send("hello").await.unwrap_err();
    server.await.unwrap();

    match err {
        BotError::Delivery(description) => assert_eq!(description, "Bad Request: chat not found"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_telegram_unreachable() {
    let err = telegram(&closed_port().await).send("hello").await.unwrap_err();

    assert!(matches!(err, BotError::Delivery(_)));
    // 错误信息里不能带 token
    assert!(!err.to_string().contains("123:abc"));
}
