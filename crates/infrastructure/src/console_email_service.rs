//! Console email service for local runs. Logs audit reports to tracing output.

use async_trait::async_trait;
use gregor_access_application::EmailService;
use gregor_access_core::AppResult;
use tracing::info;

/// Email service that logs reports instead of sending them.
#[derive(Clone, Default)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a new console email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        info!(
            to = to,
            subject = subject,
            has_html = html_body.is_some(),
            "--- AUDIT REPORT (console) ---\nTo: {}\nSubject: {}\n\n{}\n--- END AUDIT REPORT ---",
            to,
            subject,
            text_body
        );

        Ok(())
    }
}
