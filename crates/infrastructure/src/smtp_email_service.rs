//! SMTP delivery of audit reports using the `lettre` crate.

use async_trait::async_trait;
use gregor_access_application::EmailService;
use gregor_access_core::{AppError, AppResult};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// SMTP email service configuration.
#[derive(Clone)]
pub struct SmtpEmailConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender email address.
    pub from_address: String,
}

/// Email service sending reports over SMTP.
#[derive(Clone)]
pub struct SmtpEmailService {
    config: SmtpEmailConfig,
}

impl SmtpEmailService {
    /// Creates a new SMTP email service.
    #[must_use]
    pub fn new(config: SmtpEmailConfig) -> Self {
        Self { config }
    }

    fn build_message(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<Message> {
        let from: Mailbox = self
            .config
            .from_address
            .parse()
            .map_err(|error| AppError::Validation(format!("invalid from address: {error}")))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|error| AppError::Validation(format!("invalid recipient address: {error}")))?;

        let builder = Message::builder().from(from).to(to_mailbox).subject(subject);
        let message = match html_body {
            Some(html_body) => builder.multipart(MultiPart::alternative_plain_html(
                text_body.to_owned(),
                html_body.to_owned(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text_body.to_owned()),
        };

        message.map_err(|error| AppError::Internal(format!("failed to build email: {error}")))
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        let message = self.build_message(to, subject, text_body, html_body)?;
        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|error| {
                AppError::Internal(format!("failed to create SMTP transport: {error}"))
            })?
            .port(self.config.port)
            .credentials(credentials)
            .build();

        mailer
            .send(message)
            .await
            .map_err(|error| AppError::Internal(format!("failed to send email: {error}")))?;

        info!(to = to, subject = subject, "sent email over SMTP");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gregor_access_core::AppError;

    use super::{SmtpEmailConfig, SmtpEmailService};

    fn service(from_address: &str) -> SmtpEmailService {
        SmtpEmailService::new(SmtpEmailConfig {
            host: "smtp.example.org".to_owned(),
            port: 587,
            username: "auditor".to_owned(),
            password: "secret".to_owned(),
            from_address: from_address.to_owned(),
        })
    }

    #[test]
    fn html_reports_are_sent_as_alternatives() {
        let message = service("GREGoR DCC <dcc@example.org>").build_message(
            "ops@example.org",
            "UploadWorkspaceSharingAudit - problems found",
            "plain report",
            Some("<h2>report</h2>"),
        );

        let Ok(message) = message else {
            panic!("message should build");
        };
        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("plain report"));
        assert!(formatted.contains("<h2>report</h2>"));
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let message = service("dcc@example.org").build_message("not an address", "s", "b", None);

        assert!(matches!(message, Err(AppError::Validation(_))));
    }
}
