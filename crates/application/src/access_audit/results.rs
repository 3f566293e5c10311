use std::fmt::Debug;

use async_trait::async_trait;
use gregor_access_core::AppResult;
use gregor_access_domain::{
    AccessLevel, GroupGroupMembership, GroupRole, ManagedGroup, SharingGrant, Workspace,
    WorkspaceGroupSharing,
};
use serde::Serialize;

use crate::{AccessRemediationService, AuditRowState, AuditTableRow};

/// Justification attached to every audit result.
///
/// Each audit defines a closed set of notes, one per rule-table branch.
pub trait AuditNote: Debug + Clone + Copy + PartialEq + Eq + Send + Sync + 'static {
    /// Stable constant that reports group and filter on.
    fn code(&self) -> &'static str;

    /// Human-readable explanation.
    fn message(&self) -> &'static str;
}

/// Declares a note enum implementing [`AuditNote`].
macro_rules! audit_notes {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($code:literal, $message:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $message]
                $variant,
            )+
        }

        impl $crate::access_audit::AuditNote for $name {
            fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn message(&self) -> &'static str {
                match self {
                    $(Self::$variant => $message,)+
                }
            }
        }
    };
}

pub(crate) use audit_notes;

/// Outcome of a sharing comparison, doubling as the remediation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SharingAuditAction {
    /// Shared exactly as desired.
    VerifiedShared,
    /// Not shared, as desired.
    VerifiedNotShared,
    /// Grant READER without compute.
    ShareAsReader,
    /// Grant WRITER without compute.
    ShareAsWriter,
    /// Grant WRITER with compute.
    ShareWithCompute,
    /// Grant OWNER with compute.
    ShareAsOwner,
    /// Remove the grant.
    StopSharing,
}

impl SharingAuditAction {
    /// Returns the action that reaches `grant`.
    #[must_use]
    pub fn share(grant: SharingGrant) -> Self {
        match (grant.access(), grant.can_compute()) {
            (AccessLevel::Owner, _) => Self::ShareAsOwner,
            (AccessLevel::Writer, true) => Self::ShareWithCompute,
            (AccessLevel::Writer, false) => Self::ShareAsWriter,
            (AccessLevel::Reader | AccessLevel::NoAccess, _) => Self::ShareAsReader,
        }
    }

    /// Returns the grant this action leaves in place, if it creates one.
    #[must_use]
    pub fn target_grant(&self) -> Option<SharingGrant> {
        match self {
            Self::ShareAsReader => Some(SharingGrant::reader()),
            Self::ShareAsWriter => Some(SharingGrant::writer()),
            Self::ShareWithCompute => Some(SharingGrant::writer_with_compute()),
            Self::ShareAsOwner => Some(SharingGrant::owner()),
            Self::VerifiedShared | Self::VerifiedNotShared | Self::StopSharing => None,
        }
    }

    /// Returns the report label, or `None` for verified outcomes.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::VerifiedShared | Self::VerifiedNotShared => None,
            Self::ShareAsReader => Some("Share as reader"),
            Self::ShareAsWriter => Some("Share as writer"),
            Self::ShareWithCompute => Some("Share with compute"),
            Self::ShareAsOwner => Some("Share as owner"),
            Self::StopSharing => Some("Stop sharing"),
        }
    }
}

/// Outcome of a membership comparison, doubling as the remediation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MembershipAuditAction {
    /// Member, as desired.
    VerifiedMember,
    /// Admin, as desired.
    VerifiedAdmin,
    /// Not a member, as desired.
    VerifiedNotMember,
    /// Add as member.
    AddMember,
    /// Add as admin.
    AddAdmin,
    /// Change an existing role to member.
    ChangeToMember,
    /// Change an existing role to admin.
    ChangeToAdmin,
    /// Remove the membership.
    Remove,
}

impl MembershipAuditAction {
    /// Returns the role this action leaves in place, if it creates one.
    #[must_use]
    pub fn target_role(&self) -> Option<GroupRole> {
        match self {
            Self::AddMember | Self::ChangeToMember => Some(GroupRole::Member),
            Self::AddAdmin | Self::ChangeToAdmin => Some(GroupRole::Admin),
            Self::VerifiedMember | Self::VerifiedAdmin | Self::VerifiedNotMember | Self::Remove => {
                None
            }
        }
    }

    /// Returns the report label, or `None` for verified outcomes.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::VerifiedMember | Self::VerifiedAdmin | Self::VerifiedNotMember => None,
            Self::AddMember => Some("Add member"),
            Self::AddAdmin => Some("Add admin"),
            Self::ChangeToMember => Some("Change to member"),
            Self::ChangeToAdmin => Some("Change to admin"),
            Self::Remove => Some("Remove"),
        }
    }
}

/// Behaviour shared by every audit result kind.
#[async_trait]
pub trait AuditResult: Send + Sync {
    /// Returns the audited workspace.
    fn workspace(&self) -> &Workspace;

    /// Returns the audited group.
    fn managed_group(&self) -> &ManagedGroup;

    /// Returns the note constant.
    fn note_code(&self) -> &'static str;

    /// Returns the remediation label, `None` when nothing is to be done.
    fn action_label(&self) -> Option<&'static str>;

    /// Flat projection used by report tables.
    fn table_row(&self) -> AuditTableRow;

    /// Returns whether the remediation has been applied.
    fn is_handled(&self) -> bool;

    /// Applies the remediation and marks the result handled.
    ///
    /// Errors leave the result unhandled so the call can be retried.
    async fn handle(&mut self, remediation: &AccessRemediationService) -> AppResult<()>;
}

/// Result of comparing a workspace's sharing with one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSharingAuditResult<N> {
    workspace: Workspace,
    managed_group: ManagedGroup,
    current_sharing: Option<WorkspaceGroupSharing>,
    note: N,
    action: SharingAuditAction,
    handled: bool,
}

impl<N: AuditNote> WorkspaceSharingAuditResult<N> {
    pub(crate) fn new(
        workspace: Workspace,
        managed_group: ManagedGroup,
        current_sharing: Option<WorkspaceGroupSharing>,
        note: N,
        action: SharingAuditAction,
    ) -> Self {
        Self {
            workspace,
            managed_group,
            current_sharing,
            note,
            action,
            handled: false,
        }
    }

    /// Returns the sharing observed when the audit ran.
    #[must_use]
    pub fn current_sharing(&self) -> Option<&WorkspaceGroupSharing> {
        self.current_sharing.as_ref()
    }

    /// Returns the note.
    #[must_use]
    pub fn note(&self) -> N {
        self.note
    }

    /// Returns the outcome.
    #[must_use]
    pub fn action(&self) -> SharingAuditAction {
        self.action
    }
}

#[async_trait]
impl<N: AuditNote> AuditResult for WorkspaceSharingAuditResult<N> {
    fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn managed_group(&self) -> &ManagedGroup {
        &self.managed_group
    }

    fn note_code(&self) -> &'static str {
        self.note.code()
    }

    fn action_label(&self) -> Option<&'static str> {
        self.action.label()
    }

    fn table_row(&self) -> AuditTableRow {
        AuditTableRow {
            workspace: self.workspace.full_name(),
            managed_group: self.managed_group.name().to_owned(),
            auth_domain: None,
            current_state: AuditRowState::Sharing {
                access: self.current_sharing.as_ref().map(WorkspaceGroupSharing::access),
                can_compute: self
                    .current_sharing
                    .as_ref()
                    .map(WorkspaceGroupSharing::can_compute),
            },
            note: self.note.code().to_owned(),
            note_message: self.note.message().to_owned(),
            action: self.action.label().map(str::to_owned),
        }
    }

    fn is_handled(&self) -> bool {
        self.handled
    }

    async fn handle(&mut self, remediation: &AccessRemediationService) -> AppResult<()> {
        match (self.action, self.action.target_grant()) {
            (SharingAuditAction::StopSharing, _) => {
                remediation
                    .stop_sharing(&self.workspace, &self.managed_group)
                    .await?;
            }
            (_, Some(grant)) => {
                remediation
                    .share_workspace(&self.workspace, &self.managed_group, grant)
                    .await?;
            }
            (_, None) => {}
        }

        self.handled = true;
        Ok(())
    }
}

/// Result of comparing one group's membership in a workspace's
/// authorization domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDomainMembershipAuditResult<N> {
    workspace: Workspace,
    auth_domain: ManagedGroup,
    managed_group: ManagedGroup,
    current_membership: Option<GroupGroupMembership>,
    note: N,
    action: MembershipAuditAction,
    handled: bool,
}

impl<N: AuditNote> AuthDomainMembershipAuditResult<N> {
    pub(crate) fn new(
        workspace: Workspace,
        auth_domain: ManagedGroup,
        managed_group: ManagedGroup,
        current_membership: Option<GroupGroupMembership>,
        note: N,
        action: MembershipAuditAction,
    ) -> Self {
        Self {
            workspace,
            auth_domain,
            managed_group,
            current_membership,
            note,
            action,
            handled: false,
        }
    }

    /// Returns the authorization domain group.
    #[must_use]
    pub fn auth_domain(&self) -> &ManagedGroup {
        &self.auth_domain
    }

    /// Returns the membership observed when the audit ran.
    #[must_use]
    pub fn current_membership(&self) -> Option<&GroupGroupMembership> {
        self.current_membership.as_ref()
    }

    /// Returns the note.
    #[must_use]
    pub fn note(&self) -> N {
        self.note
    }

    /// Returns the outcome.
    #[must_use]
    pub fn action(&self) -> MembershipAuditAction {
        self.action
    }
}

#[async_trait]
impl<N: AuditNote> AuditResult for AuthDomainMembershipAuditResult<N> {
    fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn managed_group(&self) -> &ManagedGroup {
        &self.managed_group
    }

    fn note_code(&self) -> &'static str {
        self.note.code()
    }

    fn action_label(&self) -> Option<&'static str> {
        self.action.label()
    }

    fn table_row(&self) -> AuditTableRow {
        AuditTableRow {
            workspace: self.workspace.full_name(),
            managed_group: self.managed_group.name().to_owned(),
            auth_domain: Some(self.auth_domain.name().to_owned()),
            current_state: AuditRowState::Membership {
                role: self
                    .current_membership
                    .as_ref()
                    .map(GroupGroupMembership::role),
            },
            note: self.note.code().to_owned(),
            note_message: self.note.message().to_owned(),
            action: self.action.label().map(str::to_owned),
        }
    }

    fn is_handled(&self) -> bool {
        self.handled
    }

    async fn handle(&mut self, remediation: &AccessRemediationService) -> AppResult<()> {
        match (self.action, self.action.target_role()) {
            (MembershipAuditAction::Remove, _) => {
                remediation
                    .remove_membership(&self.auth_domain, &self.managed_group)
                    .await?;
            }
            (_, Some(role)) => {
                remediation
                    .set_membership(&self.auth_domain, &self.managed_group, role)
                    .await?;
            }
            (_, None) => {}
        }

        self.handled = true;
        Ok(())
    }
}
