use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailConfig;
use crate::user::errors::NotifierError;
use crate::user::models::EmailAddress;
use crate::user::models::Username;
use crate::user::models::VerificationCode;
use crate::user::ports::VerificationNotifier;

/// Verification email delivery over an HTTP mail API.
///
/// Posts a transactional-email payload to the configured endpoint,
/// authenticating with an `api-key` header.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: MailRecipient,
}

impl HttpMailer {
    /// Create a mailer from the outbound-mail configuration.
    ///
    /// # Arguments
    /// * `config` - Mail endpoint, credentials, and sender identity
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            sender: MailRecipient {
                email: config.sender_email.clone(),
                name: config.sender_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailRecipient {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailBody {
    sender: MailRecipient,
    to: Vec<MailRecipient>,
    subject: String,
    html_content: String,
}

#[async_trait]
impl VerificationNotifier for HttpMailer {
    async fn send_verification(
        &self,
        recipient: &EmailAddress,
        username: &Username,
        code: &VerificationCode,
    ) -> Result<(), NotifierError> {
        let body = SendMailBody {
            sender: self.sender.clone(),
            to: vec![MailRecipient {
                email: recipient.as_str().to_string(),
                name: Some(username.as_str().to_string()),
            }],
            subject: "Verify your account".to_string(),
            html_content: format!(
                "<p>Hi {username},</p>\
                 <p>Your verification code is <strong>{code}</strong>.</p>"
            ),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifierError::DeliveryFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifierError::Rejected(format!(
                "status={}: {}",
                status, detail
            )));
        }

        tracing::debug!(
            recipient = recipient.as_str(),
            "Verification email dispatched"
        );

        Ok(())
    }
}
