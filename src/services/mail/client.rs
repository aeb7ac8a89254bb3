//! Mail sender interface used by the mail handlers.
use async_trait::async_trait;
use thiserror::Error;

use crate::services::mail::template::TemplateData;

pub type MailResult<T> = Result<T, MailError>;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("mail backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait MailSender: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    async fn send_plain(&self, subject: &str, recipient: &str, body: &str) -> MailResult<()>;

    /// Render the built-in HTML template with `data` and send it.
    async fn send_html(
        &self,
        subject: &str,
        recipient: &str,
        data: &TemplateData,
    ) -> MailResult<()>;
}
