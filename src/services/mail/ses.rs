use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    error::DisplayErrorContext,
    types::{Body, Content, Destination, EmailContent, Message},
};
use tracing::{debug, error};

use crate::services::mail::client::{MailError, MailResult, MailSender};
use crate::services::mail::template::{TemplateData, render_html};

const CHARSET: &str = "UTF-8";

/// SES v2 mail sender.
#[derive(Clone, Debug)]
pub struct SesMailSender {
    client: Client,
    from: String,
}

impl SesMailSender {
    pub fn new(client: Client, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }

    pub async fn from_env(region: &str, from: impl Into<String>) -> Self {
        let aws_cfg = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_sesv2::config::Region::new(region.to_owned()))
            .load()
            .await;
        Self::new(Client::new(&aws_cfg), from)
    }

    async fn send(&self, subject: &str, recipient: &str, body: Body) -> MailResult<()> {
        let message = Message::builder()
            .subject(content(subject)?)
            .body(body)
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(recipient).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                error!(recipient, error = %DisplayErrorContext(&e), "SES send failed");
                MailError::Backend(e.to_string())
            })?;

        debug!(recipient, "mail sent");
        Ok(())
    }
}

fn content(data: &str) -> MailResult<Content> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| {
            error!(error = %e, "ses build error");
            MailError::InvalidMessage(e.to_string())
        })
}

#[async_trait]
impl MailSender for SesMailSender {
    fn backend_name(&self) -> &'static str {
        "ses"
    }

    async fn send_plain(&self, subject: &str, recipient: &str, body: &str) -> MailResult<()> {
        let body = Body::builder().text(content(body)?).build();
        self.send(subject, recipient, body).await
    }

    async fn send_html(
        &self,
        subject: &str,
        recipient: &str,
        data: &TemplateData,
    ) -> MailResult<()> {
        let body = Body::builder().html(content(&render_html(data))?).build();
        self.send(subject, recipient, body).await
    }
}
