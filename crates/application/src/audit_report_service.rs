//! Audit summaries and emailed problem reports.

use std::sync::Arc;

use gregor_access_core::AppResult;
use serde::Serialize;
use tracing::info;

use crate::{AccessAudit, AuditRun, AuditTable, EmailService};

/// Bucket counts of one completed audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    /// Audit display name.
    pub audit_name: String,
    /// Verified results.
    pub verified: usize,
    /// Needs-action results.
    pub needs_action: usize,
    /// Error results.
    pub errors: usize,
}

impl AuditSummary {
    /// Returns whether anything needs attention.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.needs_action > 0 || self.errors > 0
    }

    /// Renders the operator-facing summary.
    #[must_use]
    pub fn render_text(&self) -> String {
        format!(
            "{}\n* Verified: {}\n* Needs action: {}\n* Errors: {}\n",
            self.audit_name, self.verified, self.needs_action, self.errors
        )
    }
}

/// Everything needed to report on one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Bucket counts.
    pub summary: AuditSummary,
    /// Needs-action table.
    pub needs_action: AuditTable,
    /// Error table.
    pub errors: AuditTable,
}

impl AuditReport {
    /// Captures the summary and problem tables of `run`.
    #[must_use]
    pub fn from_run<A: AccessAudit>(run: &AuditRun<A>) -> Self {
        Self {
            summary: AuditSummary {
                audit_name: run.audit().name().to_owned(),
                verified: run.verified().len(),
                needs_action: run.needs_action().len(),
                errors: run.errors().len(),
            },
            needs_action: run.get_needs_action_table(),
            errors: run.get_errors_table(),
        }
    }
}

/// Emails audit reports when problems are found.
#[derive(Clone)]
pub struct AuditReportService {
    email_service: Arc<dyn EmailService>,
    site_url: String,
}

impl AuditReportService {
    /// Creates a report service linking to `site_url`.
    #[must_use]
    pub fn new(email_service: Arc<dyn EmailService>, site_url: impl Into<String>) -> Self {
        Self {
            email_service,
            site_url: site_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Sends `report` to `recipient` if it has problems.
    ///
    /// Returns whether an email was sent.
    pub async fn send_report(&self, report: &AuditReport, recipient: &str) -> AppResult<bool> {
        if !report.summary.has_problems() {
            return Ok(false);
        }

        let subject = format!("{} - problems found", report.summary.audit_name);
        let text_body = self.text_body(report);
        let html_body = self.html_body(report);
        self.email_service
            .send_email(recipient, &subject, &text_body, Some(&html_body))
            .await?;

        info!(
            audit = %report.summary.audit_name,
            recipient = recipient,
            "sent audit report"
        );
        Ok(true)
    }

    fn audit_url(&self) -> String {
        format!("{}/audit/", self.site_url)
    }

    fn text_body(&self, report: &AuditReport) -> String {
        format!(
            "{}\nReview the audit at {}\n\n{}\n{}",
            report.summary.render_text(),
            self.audit_url(),
            report.needs_action.render_text(),
            report.errors.render_text()
        )
    }

    fn html_body(&self, report: &AuditReport) -> String {
        let summary = &report.summary;
        format!(
            "<h2>{name}</h2>\
             <ul><li>Verified: {verified}</li><li>Needs action: {needs_action}</li><li>Errors: {errors}</li></ul>\
             <p><a href=\"{url}\">Review the audit</a></p>\
             <pre>{needs_action_table}</pre>\
             <pre>{errors_table}</pre>",
            name = escape_html(&summary.audit_name),
            verified = summary.verified,
            needs_action = summary.needs_action,
            errors = summary.errors,
            url = escape_html(&self.audit_url()),
            needs_action_table = escape_html(&report.needs_action.render_text()),
            errors_table = escape_html(&report.errors.render_text()),
        )
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
