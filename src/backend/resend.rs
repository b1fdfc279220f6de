use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::json;
use tracing::debug;

use crate::config::EmailConfig;
use crate::workflows::artist::repository::{EmailMessage, Notifier, NotifyError};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Transactional mail delivery through the Resend HTTP API.
pub struct ResendMailer {
    http: Client,
    api_key: String,
    from_address: String,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

impl Notifier for ResendMailer {
    fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from_address,
                "to": [message.to],
                "subject": message.subject,
                "html": message.html,
            }))
            .send()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(subject = %message.subject, "email accepted by provider");
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            Err(NotifyError::Delivery(format!("status {status}: {body}")))
        }
    }
}
