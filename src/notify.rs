use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(String),

    #[error("notification API error: {0}")]
    Api(String),
}

/// Facts about a freshly placed order, handed to the merchant channel.
#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub order_id: i64,
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub total: i64,
    pub item_count: i64,
}

/// One-way channel toward the merchant. Implementations may retry internally
/// but must never block the checkout path.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify_order(&self, note: &OrderNotification) -> Result<(), NotifyError>;
}

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API sender. One message per order to the merchant chat.
pub struct TelegramGateway {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramGateway")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramGateway {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
            chat_id,
        }
    }
}

#[async_trait]
impl NotificationGateway for TelegramGateway {
    async fn notify_order(&self, note: &OrderNotification) -> Result<(), NotifyError> {
        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.bot_token);
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": format_order_message(note),
        });

        let response = self
            .client
            .post(url)
            .timeout(Duration::from_secs(10))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let result: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !result.ok {
            return Err(NotifyError::Api(
                result
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}

fn format_order_message(note: &OrderNotification) -> String {
    format!(
        "New order #{}\nCustomer: {} (id {})\nPhone: {}\nItems: {}\nTotal: {}",
        note.order_id,
        note.user_name.as_deref().unwrap_or("-"),
        note.user_id,
        note.user_phone.as_deref().unwrap_or("-"),
        note.item_count,
        note.total,
    )
}

/// Gateway used when no bot credentials are configured.
pub struct NoopGateway;

#[async_trait]
impl NotificationGateway for NoopGateway {
    async fn notify_order(&self, note: &OrderNotification) -> Result<(), NotifyError> {
        tracing::debug!(order_id = note.order_id, "no notification gateway configured");
        Ok(())
    }
}

/// Hand the notification to the gateway on a detached task. Delivery outcome
/// is observable only in the logs; the handle exists for tests.
pub fn dispatch(gateway: Arc<dyn NotificationGateway>, note: OrderNotification) -> JoinHandle<()> {
    tokio::spawn(async move {
        match gateway.notify_order(&note).await {
            Ok(()) => tracing::info!(order_id = note.order_id, "order notification delivered"),
            Err(err) => {
                tracing::warn!(error = %err, order_id = note.order_id, "order notification failed");
            }
        }
    })
}
