use std::env;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use gregor_access_application::AuditConfig;
use gregor_access_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

const DEFAULT_RAWLS_URL: &str = "https://rawls.dsde-prod.broadinstitute.org";
const DEFAULT_SAM_URL: &str = "https://sam.dsde-prod.broadinstitute.org";
const DEFAULT_DCC_ADMINS_GROUP_NAME: &str = "GREGOR_DCC_ADMINS";

/// GREGoR AnVIL access audits
#[derive(Parser, Debug)]
#[command(name = "gregor-access-auditor")]
pub struct Args {
    /// Email problem reports to this address
    #[arg(long)]
    pub email: Option<String>,

    /// Audit to run; may be repeated (default: all)
    #[arg(long = "audit", value_enum)]
    pub audits: Vec<AuditKind>,

    /// Apply needs-action results after auditing
    #[arg(long)]
    pub remediate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    UploadSharing,
    UploadAuthDomain,
    CombinedSharing,
    CombinedAuthDomain,
    DccProcessedSharing,
    DccProcessedAuthDomain,
}

impl AuditKind {
    pub const ALL: [Self; 6] = [
        Self::UploadSharing,
        Self::UploadAuthDomain,
        Self::CombinedSharing,
        Self::CombinedAuthDomain,
        Self::DccProcessedSharing,
        Self::DccProcessedAuthDomain,
    ];
}

impl Args {
    /// Selected audits in a fixed order, without repeats.
    pub fn selected_audits(&self) -> Vec<AuditKind> {
        if self.audits.is_empty() {
            return AuditKind::ALL.to_vec();
        }

        AuditKind::ALL
            .into_iter()
            .filter(|kind| self.audits.contains(kind))
            .collect()
    }

    pub fn migrate_only(&self) -> bool {
        self.command == Some(Command::Migrate)
    }
}

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct AuditorConfig {
    pub database_url: String,
    pub rawls_url: String,
    pub sam_url: String,
    pub api_token: Option<String>,
    pub audit: AuditConfig,
    pub email_provider: EmailProviderConfig,
    pub site_url: String,
}

impl AuditorConfig {
    pub fn load(args: &Args) -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let rawls_url = env::var("ANVIL_RAWLS_URL").unwrap_or_else(|_| DEFAULT_RAWLS_URL.to_owned());
        let sam_url = env::var("ANVIL_SAM_URL").unwrap_or_else(|_| DEFAULT_SAM_URL.to_owned());
        let api_token = if args.remediate {
            Some(required_non_empty_env("ANVIL_API_TOKEN")?)
        } else {
            None
        };

        let dcc_admins_group_name = env::var("ANVIL_DCC_ADMINS_GROUP_NAME")
            .unwrap_or_else(|_| DEFAULT_DCC_ADMINS_GROUP_NAME.to_owned());
        let as_of = match env::var("AUDIT_AS_OF") {
            Ok(value) => parse_date("AUDIT_AS_OF", &value)?,
            Err(_) => Utc::now().date_naive(),
        };
        let audit = AuditConfig::new(dcc_admins_group_name, as_of)?;

        let email_provider = match env::var("EMAIL_PROVIDER")
            .unwrap_or_else(|_| "console".to_owned())
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = required_non_empty_env("SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                    host: required_non_empty_env("SMTP_HOST")?,
                    port,
                    username: required_non_empty_env("SMTP_USERNAME")?,
                    password: required_non_empty_env("SMTP_PASSWORD")?,
                    from_address: required_non_empty_env("SMTP_FROM_ADDRESS")?,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };
        let site_url = env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:8000".to_owned());

        Ok(Self {
            database_url,
            rawls_url,
            sam_url,
            api_token,
            audit,
            email_provider,
            site_url,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_date(name: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> AppResult<String> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
