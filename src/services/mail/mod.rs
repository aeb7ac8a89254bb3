pub mod client;
pub mod memory;
pub mod ses;
pub mod template;

pub use client::{MailError, MailSender};
pub use memory::{InMemoryMailSender, MailBody, SentMail};
pub use ses::SesMailSender;
pub use template::TemplateData;
