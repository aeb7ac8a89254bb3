//! Recording `MailSender` for tests and local runs without SES.
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::services::mail::client::{MailResult, MailSender};
use crate::services::mail::template::{TemplateData, render_html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailBody {
    Plain(String),
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub subject: String,
    pub recipient: String,
    pub body: MailBody,
}

#[derive(Debug, Default)]
pub struct InMemoryMailSender {
    sent: Mutex<Vec<SentMail>>,
}

impl InMemoryMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    async fn record(&self, subject: &str, recipient: &str, body: MailBody) {
        self.sent.lock().await.push(SentMail {
            subject: subject.to_owned(),
            recipient: recipient.to_owned(),
            body,
        });
    }
}

#[async_trait]
impl MailSender for InMemoryMailSender {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn send_plain(&self, subject: &str, recipient: &str, body: &str) -> MailResult<()> {
        self.record(subject, recipient, MailBody::Plain(body.to_owned()))
            .await;
        Ok(())
    }

    async fn send_html(
        &self,
        subject: &str,
        recipient: &str,
        data: &TemplateData,
    ) -> MailResult<()> {
        self.record(subject, recipient, MailBody::Html(render_html(data)))
            .await;
        Ok(())
    }
}
