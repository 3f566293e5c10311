//! Application services and ports.

#![forbid(unsafe_code)]

mod access_audit;
mod access_ports;
mod access_remediation_service;
mod audit_config;
mod audit_report;
mod audit_report_service;

pub use access_audit::{
    AccessAudit, AuditBucket, AuditNote, AuditResult, AuditRun, AuthDomainMembershipAuditResult,
    Classified, CombinedWorkspaceAuthDomainAudit, CombinedWorkspaceAuthDomainAuditResult,
    CombinedWorkspaceAuthDomainNote, CombinedWorkspaceSharingAudit,
    CombinedWorkspaceSharingAuditResult, CombinedWorkspaceSharingNote,
    DccProcessedWorkspaceAuthDomainAudit, DccProcessedWorkspaceAuthDomainAuditResult,
    DccProcessedWorkspaceAuthDomainNote, DccProcessedWorkspaceSharingAudit,
    DccProcessedWorkspaceSharingAuditResult, DccProcessedWorkspaceSharingNote, GroupClass,
    MembershipAuditAction, SharingAuditAction, UploadWorkspaceAuthDomainAudit,
    UploadWorkspaceAuthDomainAuditResult, UploadWorkspaceAuthDomainNote,
    UploadWorkspaceSharingAudit, UploadWorkspaceSharingAuditResult, UploadWorkspaceSharingNote,
    WorkspaceSharingAuditResult,
};
pub use access_ports::{AccessStore, AclEntry, AnvilAccessClient, AuditScope, EmailService};
pub use access_remediation_service::AccessRemediationService;
pub use audit_config::AuditConfig;
pub use audit_report::{AuditRowState, AuditTable, AuditTableRow};
pub use audit_report_service::{AuditReport, AuditReportService, AuditSummary};
