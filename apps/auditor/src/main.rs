//! GREGoR AnVIL access auditor.

#![forbid(unsafe_code)]

mod auditor_config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use gregor_access_application::{
    AccessAudit, AccessRemediationService, AccessStore, AuditConfig, AuditReport,
    AuditReportService, AuditRun, AuditScope, CombinedWorkspaceAuthDomainAudit,
    CombinedWorkspaceSharingAudit, DccProcessedWorkspaceAuthDomainAudit,
    DccProcessedWorkspaceSharingAudit, EmailService, UploadWorkspaceAuthDomainAudit,
    UploadWorkspaceSharingAudit,
};
use gregor_access_core::{AppError, AppResult};
use gregor_access_infrastructure::{
    AnvilApiEndpoints, ConsoleEmailService, HttpAnvilAccessClient, PostgresAccessStore,
    SmtpEmailConfig, SmtpEmailService,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auditor_config::{Args, AuditKind, AuditorConfig, EmailProviderConfig, init_tracing};

struct AuditContext {
    store: Arc<dyn AccessStore>,
    config: AuditConfig,
    reports: AuditReportService,
    recipient: Option<String>,
    remediation: Option<AccessRemediationService>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = AuditorConfig::load(&args)?;
    let pool = connect_pool(config.database_url.as_str()).await?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if args.migrate_only() {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let context = build_context(&args, &config, pool)?;
    info!(
        as_of = %context.config.as_of(),
        remediate = args.remediate,
        "gregor-access-auditor started"
    );

    let mut problems = 0_usize;
    for kind in args.selected_audits() {
        let config = context.config.clone();
        let store = Arc::clone(&context.store);
        let found = match kind {
            AuditKind::UploadSharing => {
                run_one(UploadWorkspaceSharingAudit::new(store, config), &context).await?
            }
            AuditKind::UploadAuthDomain => {
                run_one(UploadWorkspaceAuthDomainAudit::new(store, config), &context).await?
            }
            AuditKind::CombinedSharing => {
                run_one(CombinedWorkspaceSharingAudit::new(store, config), &context).await?
            }
            AuditKind::CombinedAuthDomain => {
                run_one(CombinedWorkspaceAuthDomainAudit::new(store, config), &context).await?
            }
            AuditKind::DccProcessedSharing => {
                run_one(DccProcessedWorkspaceSharingAudit::new(store, config), &context).await?
            }
            AuditKind::DccProcessedAuthDomain => {
                run_one(
                    DccProcessedWorkspaceAuthDomainAudit::new(store, config),
                    &context,
                )
                .await?
            }
        };
        problems = problems.saturating_add(found);
    }

    if problems > 0 {
        warn!(problems, "audits finished with problems");
    } else {
        info!("all audits verified");
    }

    Ok(())
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_context(args: &Args, config: &AuditorConfig, pool: PgPool) -> AppResult<AuditContext> {
    let store: Arc<dyn AccessStore> = Arc::new(PostgresAccessStore::new(pool));

    let email_service: Arc<dyn EmailService> = match &config.email_provider {
        EmailProviderConfig::Console => Arc::new(ConsoleEmailService::new()),
        EmailProviderConfig::Smtp(smtp) => Arc::new(SmtpEmailService::new(SmtpEmailConfig {
            host: smtp.host.clone(),
            port: smtp.port,
            username: smtp.username.clone(),
            password: smtp.password.clone(),
            from_address: smtp.from_address.clone(),
        })),
    };

    let remediation = match &config.api_token {
        Some(api_token) => {
            let http_client = reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build HTTP client: {error}"))
                })?;
            let client = HttpAnvilAccessClient::new(
                http_client,
                AnvilApiEndpoints::new(config.rawls_url.as_str(), config.sam_url.as_str()),
                api_token.as_str(),
            );
            Some(AccessRemediationService::new(
                Arc::clone(&store),
                Arc::new(client),
            ))
        }
        None => None,
    };

    Ok(AuditContext {
        store,
        config: config.audit.clone(),
        reports: AuditReportService::new(email_service, config.site_url.as_str()),
        recipient: args.email.clone(),
        remediation,
    })
}

/// Runs one audit, prints its summary, reports, then remediates if enabled.
///
/// Returns the number of needs-action and error results found.
async fn run_one<A: AccessAudit>(audit: A, context: &AuditContext) -> AppResult<usize> {
    let mut run = AuditRun::new(audit, AuditScope::All).await?;
    run.run_audit().await?;

    let report = AuditReport::from_run(&run);
    print!("{}", report.summary.render_text());

    if let Some(recipient) = &context.recipient {
        let sent = context.reports.send_report(&report, recipient).await?;
        if !sent {
            info!(audit = run.audit().name(), "no problems found; report not sent");
        }
    }

    if let Some(remediation) = &context.remediation {
        let handled = run.handle_needs_action(remediation).await?;
        info!(
            audit = run.audit().name(),
            handled,
            errors = run.errors().len(),
            "applied needs-action results"
        );
    }

    Ok(report.summary.needs_action + report.summary.errors)
}
