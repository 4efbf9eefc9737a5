//! Slack Incoming Webhook delivery.

use crate::domain::model::ChatMessage;
use crate::domain::ports::Notifier;
use crate::utils::error::{NotifierError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct SlackWebhook {
    client: Client,
    webhook_url: String,
}

impl SlackWebhook {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn send(&self, message: &ChatMessage) -> Result<()> {
        tracing::debug!("Posting {} blocks to webhook", message.blocks.len());
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::DeliveryError {
                message: format!("webhook returned {}: {}", status.as_u16(), body.trim()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::message;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_posts_json_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/hook")
                .json_body(json!({"text": "Release update", "blocks": [{"type": "divider"}]}));
            then.status(200).body("ok");
        });

        let hook = SlackWebhook::new(server.url("/hook")).unwrap();
        hook.send(&message(vec![json!({"type": "divider"})]))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_send_rejects_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(404).body("no_service");
        });

        let hook = SlackWebhook::new(server.url("/hook")).unwrap();
        let err = hook.send(&message(Vec::new())).await.unwrap_err();
        assert!(err.to_string().contains("no_service"));
    }
}
