use gregor_access_domain::{
    AccessLevel, GroupGroupMembership, GroupRole, ManagedGroup, SharingGrant, Workspace,
    WorkspaceGroupSharing,
};
use serde::Serialize;

use super::results::{
    AuditNote, AuthDomainMembershipAuditResult, MembershipAuditAction, SharingAuditAction,
    WorkspaceSharingAuditResult,
};

/// Bucket a classified pair lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditBucket {
    /// Actual state matches the desired state.
    Verified,
    /// Actual state differs but stays within what the group may hold.
    NeedsAction,
    /// Actual state exceeds anything the group may hold.
    Error,
}

impl AuditBucket {
    /// Returns a stable label for logs and reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::NeedsAction => "needs_action",
            Self::Error => "error",
        }
    }
}

/// A result together with the bucket it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified<R> {
    /// Bucket the result belongs to.
    pub bucket: AuditBucket,
    /// The audit result.
    pub result: R,
}

/// One row of a sharing rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SharingRule<N> {
    pub(crate) desired: Option<SharingGrant>,
    pub(crate) ceiling: Option<AccessLevel>,
    pub(crate) note: N,
}

impl<N> SharingRule<N> {
    pub(crate) fn share(grant: SharingGrant, ceiling: AccessLevel, note: N) -> Self {
        Self {
            desired: Some(grant),
            ceiling: Some(ceiling),
            note,
        }
    }

    /// No sharing desired; any grant above `ceiling` is an error.
    pub(crate) fn not_shared(ceiling: Option<AccessLevel>, note: N) -> Self {
        Self {
            desired: None,
            ceiling,
            note,
        }
    }
}

impl<N: AuditNote> SharingRule<N> {
    pub(crate) fn evaluate(
        self,
        workspace: &Workspace,
        managed_group: &ManagedGroup,
        current_sharing: Option<WorkspaceGroupSharing>,
    ) -> Classified<WorkspaceSharingAuditResult<N>> {
        let (bucket, action) = decide_sharing(
            self.desired,
            self.ceiling,
            current_sharing.as_ref().map(WorkspaceGroupSharing::grant),
        );

        Classified {
            bucket,
            result: WorkspaceSharingAuditResult::new(
                workspace.clone(),
                managed_group.clone(),
                current_sharing,
                self.note,
                action,
            ),
        }
    }
}

/// One row of a membership rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MembershipRule<N> {
    pub(crate) desired: Option<GroupRole>,
    pub(crate) ceiling: Option<GroupRole>,
    pub(crate) note: N,
}

impl<N> MembershipRule<N> {
    pub(crate) fn member(role: GroupRole, ceiling: GroupRole, note: N) -> Self {
        Self {
            desired: Some(role),
            ceiling: Some(ceiling),
            note,
        }
    }

    pub(crate) fn not_member(ceiling: Option<GroupRole>, note: N) -> Self {
        Self {
            desired: None,
            ceiling,
            note,
        }
    }

    /// Accepts whatever role is present; used where no rule is settled.
    pub(crate) fn unchanged(current: Option<GroupRole>, note: N) -> Self {
        Self {
            desired: current,
            ceiling: Some(GroupRole::Admin),
            note,
        }
    }
}

impl<N: AuditNote> MembershipRule<N> {
    pub(crate) fn evaluate(
        self,
        workspace: &Workspace,
        auth_domain: &ManagedGroup,
        managed_group: &ManagedGroup,
        current_membership: Option<GroupGroupMembership>,
    ) -> Classified<AuthDomainMembershipAuditResult<N>> {
        let (bucket, action) = decide_membership(
            self.desired,
            self.ceiling,
            current_membership.as_ref().map(GroupGroupMembership::role),
        );

        Classified {
            bucket,
            result: AuthDomainMembershipAuditResult::new(
                workspace.clone(),
                auth_domain.clone(),
                managed_group.clone(),
                current_membership,
                self.note,
                action,
            ),
        }
    }
}

fn exceeds<T: Ord + Copy>(current: Option<T>, ceiling: Option<T>) -> bool {
    current.is_some_and(|current| ceiling.is_none_or(|ceiling| current > ceiling))
}

pub(crate) fn decide_sharing(
    desired: Option<SharingGrant>,
    ceiling: Option<AccessLevel>,
    current: Option<SharingGrant>,
) -> (AuditBucket, SharingAuditAction) {
    match (desired, current) {
        (None, None) => return (AuditBucket::Verified, SharingAuditAction::VerifiedNotShared),
        (Some(desired), Some(current)) if desired == current => {
            return (AuditBucket::Verified, SharingAuditAction::VerifiedShared);
        }
        _ => {}
    }

    let action = desired.map_or(SharingAuditAction::StopSharing, SharingAuditAction::share);
    let bucket = if exceeds(current.map(|grant| grant.access()), ceiling) {
        AuditBucket::Error
    } else {
        AuditBucket::NeedsAction
    };

    (bucket, action)
}

pub(crate) fn decide_membership(
    desired: Option<GroupRole>,
    ceiling: Option<GroupRole>,
    current: Option<GroupRole>,
) -> (AuditBucket, MembershipAuditAction) {
    let action = match (desired, current) {
        (None, None) => return (AuditBucket::Verified, MembershipAuditAction::VerifiedNotMember),
        (Some(GroupRole::Member), Some(GroupRole::Member)) => {
            return (AuditBucket::Verified, MembershipAuditAction::VerifiedMember);
        }
        (Some(GroupRole::Admin), Some(GroupRole::Admin)) => {
            return (AuditBucket::Verified, MembershipAuditAction::VerifiedAdmin);
        }
        (None, Some(_)) => MembershipAuditAction::Remove,
        (Some(GroupRole::Member), None) => MembershipAuditAction::AddMember,
        (Some(GroupRole::Admin), None) => MembershipAuditAction::AddAdmin,
        (Some(GroupRole::Member), Some(_)) => MembershipAuditAction::ChangeToMember,
        (Some(GroupRole::Admin), Some(_)) => MembershipAuditAction::ChangeToAdmin,
    };

    let bucket = if exceeds(current, ceiling) {
        AuditBucket::Error
    } else {
        AuditBucket::NeedsAction
    };

    (bucket, action)
}
