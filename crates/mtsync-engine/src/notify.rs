//! 운영자 알림 채널.
//!
//! 성공률 저하 등 운영 이벤트를 외부 채널로 전달합니다.
//! 최소 구현은 구조화 로그([`LogNotifier`])이며, webhook URL이 설정되면
//! Discord 호환 webhook으로도 전송합니다.

use async_trait::async_trait;
use mtsync_core::config::SchedulerConfig;
use std::sync::Arc;

/// 알림 채널 인터페이스.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 운영자 알림 발송. 알림 실패가 동기화를 중단시켜서는 안 됩니다.
    async fn alert(&self, title: &str, message: &str);
}

/// tracing 에러 로그로만 알리는 최소 구현.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn alert(&self, title: &str, message: &str) {
        tracing::error!(title = title, message = message, "운영자 알림");
    }
}

/// Discord 호환 webhook 알림.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// 새 webhook 알림 채널 생성.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn alert(&self, title: &str, message: &str) {
        tracing::error!(title = title, message = message, "운영자 알림");

        let payload = serde_json::json!({
            "content": format!("**{}**\n{}", title, message),
        });
        if let Err(e) = self.client.post(&self.url).json(&payload).send().await {
            tracing::warn!(error = %e, "webhook 알림 전송 실패");
        }
    }
}

/// 설정에 따라 알림 채널 구성.
pub fn notifier_from_config(config: &SchedulerConfig) -> Arc<dyn Notifier> {
    match &config.alert_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url)),
        None => Arc::new(LogNotifier),
    }
}
