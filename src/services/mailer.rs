//! Outbound mail.
//!
//! Messages go to an HTTP mail relay as JSON. When mail is disabled the
//! message is written to the log instead so local setups still see reset links.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

pub struct RelayMailer {
    client: Client,
    relay_url: Url,
    api_key: String,
    from_address: String,
}

impl RelayMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("codestack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build mail HTTP client: {e}"))?;

        Ok(Self {
            client,
            relay_url: Url::parse(&config.relay_url).context("Invalid mail relay URL")?,
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &self.from_address,
            to: &mail.to,
            subject: &mail.subject,
            text: &mail.text,
        };

        let mut request = self.client.post(self.relay_url.clone()).json(&payload);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %mail.to, "Mail accepted by relay");
        Ok(())
    }
}

/// Logs messages instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        info!(to = %mail.to, subject = %mail.subject, "Mail delivery disabled, message not sent");
        debug!(to = %mail.to, body = %mail.text, "Undelivered message body");
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig) -> anyhow::Result<std::sync::Arc<dyn Mailer>> {
    if config.enabled {
        Ok(std::sync::Arc::new(RelayMailer::new(config)?))
    } else {
        Ok(std::sync::Arc::new(LogMailer))
    }
}
