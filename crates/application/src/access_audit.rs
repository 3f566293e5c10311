//! Access audits: rule tables, audit results, and the audit engine.
//!
//! Every audit compares the access a group should have to a workspace (or
//! to the workspace's authorization domain) with what the store records,
//! and buckets each pair as verified, needs action, or error. Classification
//! never writes; remediation only happens through [`AuditResult::handle`].

mod combined_workspace;
mod dcc_processed_workspace;
mod decision;
mod engine;
mod group_class;
mod results;
mod support;
mod upload_workspace;


pub use combined_workspace::{
    CombinedWorkspaceAuthDomainAudit, CombinedWorkspaceAuthDomainAuditResult,
    CombinedWorkspaceAuthDomainNote, CombinedWorkspaceSharingAudit,
    CombinedWorkspaceSharingAuditResult, CombinedWorkspaceSharingNote,
};
pub use dcc_processed_workspace::{
    DccProcessedWorkspaceAuthDomainAudit, DccProcessedWorkspaceAuthDomainAuditResult,
    DccProcessedWorkspaceAuthDomainNote, DccProcessedWorkspaceSharingAudit,
    DccProcessedWorkspaceSharingAuditResult, DccProcessedWorkspaceSharingNote,
};
pub use decision::{AuditBucket, Classified};
pub use engine::{AccessAudit, AuditRun};
pub use group_class::GroupClass;
pub use results::{
    AuditNote, AuditResult, AuthDomainMembershipAuditResult, MembershipAuditAction,
    SharingAuditAction, WorkspaceSharingAuditResult,
};
pub use upload_workspace::{
    UploadWorkspaceAuthDomainAudit, UploadWorkspaceAuthDomainAuditResult,
    UploadWorkspaceAuthDomainNote, UploadWorkspaceSharingAudit, UploadWorkspaceSharingAuditResult,
    UploadWorkspaceSharingNote,
};
