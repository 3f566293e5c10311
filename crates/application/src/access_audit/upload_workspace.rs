use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use gregor_access_core::AppResult;
use gregor_access_domain::{
    AccessLevel, GroupRole, ManagedGroup, SharingGrant, UploadLifecycle, UploadWorkspace,
    Workspace,
};

use super::decision::{Classified, MembershipRule, SharingRule};
use super::engine::AccessAudit;
use super::group_class::{GroupClass, GroupContext};
use super::results::{AuthDomainMembershipAuditResult, WorkspaceSharingAuditResult, audit_notes};
use super::support::{find_auth_domain, is_combined_ready};
use crate::{AccessStore, AuditConfig, AuditScope};

audit_notes! {
    /// Notes of the upload workspace sharing audit.
    UploadWorkspaceSharingNote {
        RcUploadersFutureCycle => (
            "RC_UPLOADERS_FUTURE_CYCLE",
            "Uploaders should not have access before the upload cycle starts."
        ),
        RcUploadersCurrentCycleBeforeCompute => (
            "RC_UPLOADERS_CURRENT_CYCLE_BEFORE_COMPUTE",
            "Uploaders should have write access without compute during the cycle until compute is enabled."
        ),
        RcUploadersCurrentCycleAfterCompute => (
            "RC_UPLOADERS_CURRENT_CYCLE_AFTER_COMPUTE",
            "Uploaders should have write access with compute once compute is enabled for the cycle."
        ),
        RcUploadersPastCycleBeforeQcComplete => (
            "RC_UPLOADERS_PAST_CYCLE_BEFORE_QC_COMPLETE",
            "Uploaders should not have direct access after the cycle ends."
        ),
        RcUploadersPastCycleAfterQcComplete => (
            "RC_UPLOADERS_PAST_CYCLE_AFTER_QC_COMPLETE",
            "Uploaders should not have direct access after QC is complete."
        ),
        RcUploadersPastCycleCombinedWorkspaceReady => (
            "RC_UPLOADERS_PAST_CYCLE_COMBINED_WORKSPACE_READY",
            "Uploaders should not have direct access once the combined workspace is ready."
        ),
        DccWritersFutureCycle => (
            "DCC_WRITERS_FUTURE_CYCLE",
            "DCC writers should have write and compute access for future cycles."
        ),
        DccWritersCurrentCycle => (
            "DCC_WRITERS_CURRENT_CYCLE",
            "DCC writers should have write and compute access for the current cycle."
        ),
        DccWritersPastCycleBeforeQcComplete => (
            "DCC_WRITERS_PAST_CYCLE_BEFORE_QC_COMPLETE",
            "DCC writers should have write and compute access until QC is complete."
        ),
        DccWritersPastCycleAfterQcComplete => (
            "DCC_WRITERS_PAST_CYCLE_AFTER_QC_COMPLETE",
            "DCC writers should keep write and compute access until the combined workspace is ready."
        ),
        DccWritersPastCycleCombinedWorkspaceReady => (
            "DCC_WRITERS_PAST_CYCLE_COMBINED_WORKSPACE_READY",
            "DCC writers should not have direct access once the combined workspace is ready."
        ),
        AuthDomainAsReader => (
            "AUTH_DOMAIN_AS_READER",
            "The auth domain should always be a reader."
        ),
        DccAdminAsOwner => (
            "DCC_ADMIN_AS_OWNER",
            "The DCC admin group should always be an owner."
        ),
        OtherGroupNoAccess => (
            "OTHER_GROUP_NO_ACCESS",
            "Other groups should not have direct access."
        ),
    }
}

audit_notes! {
    /// Notes of the upload workspace auth domain audit.
    UploadWorkspaceAuthDomainNote {
        RcFutureCycle => (
            "RC_FUTURE_CYCLE",
            "Research center groups should not be in the auth domain before the cycle starts."
        ),
        RcUploadersBeforeQc => (
            "RC_UPLOADERS_BEFORE_QC",
            "Uploaders should be members of the auth domain until QC is complete."
        ),
        RcUploadersAfterQc => (
            "RC_UPLOADERS_AFTER_QC",
            "Uploaders should not be in the auth domain after QC is complete."
        ),
        RcMembersBeforeCombined => (
            "RC_MEMBERS_BEFORE_COMBINED",
            "Research center members should be members of the auth domain until the combined workspace is ready."
        ),
        RcMembersAfterCombined => (
            "RC_MEMBERS_AFTER_COMBINED",
            "Research center members should not be in the auth domain once the combined workspace is ready."
        ),
        RcNonMembersAfterStart => (
            "RC_NON_MEMBERS_AFTER_START",
            "Research center non-members should be members of the auth domain once the cycle starts."
        ),
        DccAdmins => (
            "DCC_ADMINS",
            "The DCC admin group should always be an admin of the auth domain."
        ),
        DccBeforeCombined => (
            "DCC_BEFORE_COMBINED",
            "DCC groups should be members of the auth domain until the combined workspace is ready."
        ),
        DccAfterCombined => (
            "DCC_AFTER_COMBINED",
            "DCC groups should not be in the auth domain once the combined workspace is ready."
        ),
        GregorAllBeforeCombined => (
            "GREGOR_ALL_BEFORE_COMBINED",
            "GREGOR_ALL should not be in the auth domain before the combined workspace is ready."
        ),
        GregorAllAfterCombined => (
            "GREGOR_ALL_AFTER_COMBINED",
            "GREGOR_ALL should be a member of the auth domain once the combined workspace is ready."
        ),
        OtherGroup => (
            "OTHER_GROUP",
            "Other groups should not be in the auth domain."
        ),
    }
}

/// Result type of [`UploadWorkspaceSharingAudit`].
pub type UploadWorkspaceSharingAuditResult =
    WorkspaceSharingAuditResult<UploadWorkspaceSharingNote>;

/// Result type of [`UploadWorkspaceAuthDomainAudit`].
pub type UploadWorkspaceAuthDomainAuditResult =
    AuthDomainMembershipAuditResult<UploadWorkspaceAuthDomainNote>;

pub(crate) fn upload_sharing_rule(
    class: GroupClass,
    lifecycle: UploadLifecycle,
) -> SharingRule<UploadWorkspaceSharingNote> {
    use UploadLifecycle as L;
    use UploadWorkspaceSharingNote as N;

    match (class, lifecycle) {
        (GroupClass::RcUploaders, L::Future) => {
            SharingRule::not_shared(Some(AccessLevel::Writer), N::RcUploadersFutureCycle)
        }
        (GroupClass::RcUploaders, L::CurrentBeforeCompute) => SharingRule::share(
            SharingGrant::writer(),
            AccessLevel::Writer,
            N::RcUploadersCurrentCycleBeforeCompute,
        ),
        (GroupClass::RcUploaders, L::CurrentAfterCompute) => SharingRule::share(
            SharingGrant::writer_with_compute(),
            AccessLevel::Writer,
            N::RcUploadersCurrentCycleAfterCompute,
        ),
        (GroupClass::RcUploaders, L::PastBeforeQc) => SharingRule::not_shared(
            Some(AccessLevel::Writer),
            N::RcUploadersPastCycleBeforeQcComplete,
        ),
        (GroupClass::RcUploaders, L::PastAfterQc) => SharingRule::not_shared(
            Some(AccessLevel::Writer),
            N::RcUploadersPastCycleAfterQcComplete,
        ),
        (GroupClass::RcUploaders, L::PastCombinedReady) => SharingRule::not_shared(
            Some(AccessLevel::Writer),
            N::RcUploadersPastCycleCombinedWorkspaceReady,
        ),
        (GroupClass::DccWriters, lifecycle) => {
            let note = match lifecycle {
                L::Future => N::DccWritersFutureCycle,
                L::CurrentBeforeCompute | L::CurrentAfterCompute => N::DccWritersCurrentCycle,
                L::PastBeforeQc => N::DccWritersPastCycleBeforeQcComplete,
                L::PastAfterQc => N::DccWritersPastCycleAfterQcComplete,
                L::PastCombinedReady => {
                    return SharingRule::not_shared(
                        Some(AccessLevel::Writer),
                        N::DccWritersPastCycleCombinedWorkspaceReady,
                    );
                }
            };
            SharingRule::share(SharingGrant::writer_with_compute(), AccessLevel::Writer, note)
        }
        (GroupClass::AuthDomain, _) => SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Owner,
            N::AuthDomainAsReader,
        ),
        (GroupClass::DccAdmins, _) => {
            SharingRule::share(SharingGrant::owner(), AccessLevel::Owner, N::DccAdminAsOwner)
        }
        (
            GroupClass::RcMembers
            | GroupClass::RcNonMembers
            | GroupClass::DccMembers
            | GroupClass::GregorAll
            | GroupClass::Other,
            _,
        ) => SharingRule::not_shared(None, N::OtherGroupNoAccess),
    }
}

pub(crate) fn upload_auth_domain_rule(
    class: GroupClass,
    lifecycle: UploadLifecycle,
) -> MembershipRule<UploadWorkspaceAuthDomainNote> {
    use UploadLifecycle as L;
    use UploadWorkspaceAuthDomainNote as N;

    let member = GroupRole::Member;
    let combined_ready = lifecycle.is_combined_ready();

    match (class, lifecycle) {
        (GroupClass::RcUploaders | GroupClass::RcMembers | GroupClass::RcNonMembers, L::Future) => {
            MembershipRule::not_member(Some(member), N::RcFutureCycle)
        }
        (GroupClass::RcUploaders, L::PastAfterQc | L::PastCombinedReady) => {
            MembershipRule::not_member(Some(member), N::RcUploadersAfterQc)
        }
        (GroupClass::RcUploaders, _) => {
            MembershipRule::member(member, member, N::RcUploadersBeforeQc)
        }
        (GroupClass::RcMembers, _) if combined_ready => {
            MembershipRule::not_member(Some(member), N::RcMembersAfterCombined)
        }
        (GroupClass::RcMembers, _) => {
            MembershipRule::member(member, member, N::RcMembersBeforeCombined)
        }
        (GroupClass::RcNonMembers, _) => {
            MembershipRule::member(member, member, N::RcNonMembersAfterStart)
        }
        (GroupClass::DccAdmins, _) => {
            MembershipRule::member(GroupRole::Admin, GroupRole::Admin, N::DccAdmins)
        }
        (GroupClass::DccWriters | GroupClass::DccMembers, _) if combined_ready => {
            MembershipRule::not_member(Some(member), N::DccAfterCombined)
        }
        (GroupClass::DccWriters | GroupClass::DccMembers, _) => {
            MembershipRule::member(member, member, N::DccBeforeCombined)
        }
        (GroupClass::GregorAll, _) if combined_ready => {
            MembershipRule::member(member, member, N::GregorAllAfterCombined)
        }
        (GroupClass::GregorAll, _) => MembershipRule::not_member(None, N::GregorAllBeforeCombined),
        (GroupClass::AuthDomain | GroupClass::Other, _) => {
            MembershipRule::not_member(None, N::OtherGroup)
        }
    }
}

async fn upload_lifecycle(
    store: &dyn AccessStore,
    upload: &UploadWorkspace,
    as_of: NaiveDate,
) -> AppResult<UploadLifecycle> {
    let combined_ready = is_combined_ready(store, upload.upload_cycle().id()).await?;
    Ok(upload.lifecycle(as_of, combined_ready))
}

/// Audits direct sharing of upload workspaces.
#[derive(Clone)]
pub struct UploadWorkspaceSharingAudit {
    store: Arc<dyn AccessStore>,
    config: AuditConfig,
}

impl UploadWorkspaceSharingAudit {
    /// Creates the audit.
    #[must_use]
    pub fn new(store: Arc<dyn AccessStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AccessAudit for UploadWorkspaceSharingAudit {
    type Workspace = UploadWorkspace;
    type Result = UploadWorkspaceSharingAuditResult;
    type Snapshot = UploadLifecycle;

    fn name(&self) -> &'static str {
        "UploadWorkspaceSharingAudit"
    }

    fn base_workspace<'a>(&self, workspace: &'a UploadWorkspace) -> &'a Workspace {
        workspace.workspace()
    }

    async fn load_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<UploadWorkspace>> {
        self.store.list_upload_workspaces(scope).await
    }

    async fn list_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        self.store.list_managed_groups().await
    }

    async fn snapshot(&self, upload: &UploadWorkspace) -> AppResult<UploadLifecycle> {
        upload_lifecycle(self.store.as_ref(), upload, self.config.as_of()).await
    }

    async fn classify_with(
        &self,
        upload: &UploadWorkspace,
        lifecycle: &UploadLifecycle,
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>> {
        let context = GroupContext::new(&self.config, upload.workspace())
            .with_research_center(upload.research_center());
        let Some(class) = GroupClass::classify(managed_group, &context) else {
            return Ok(None);
        };

        let current_sharing = self
            .store
            .find_sharing(upload.workspace().id(), managed_group.id())
            .await?;

        Ok(Some(upload_sharing_rule(class, *lifecycle).evaluate(
            upload.workspace(),
            managed_group,
            current_sharing,
        )))
    }
}

/// Audits membership in the authorization domain of upload workspaces.
#[derive(Clone)]
pub struct UploadWorkspaceAuthDomainAudit {
    store: Arc<dyn AccessStore>,
    config: AuditConfig,
}

impl UploadWorkspaceAuthDomainAudit {
    /// Creates the audit.
    #[must_use]
    pub fn new(store: Arc<dyn AccessStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AccessAudit for UploadWorkspaceAuthDomainAudit {
    type Workspace = UploadWorkspace;
    type Result = UploadWorkspaceAuthDomainAuditResult;
    type Snapshot = (Option<ManagedGroup>, UploadLifecycle);

    fn name(&self) -> &'static str {
        "UploadWorkspaceAuthDomainAudit"
    }

    fn base_workspace<'a>(&self, workspace: &'a UploadWorkspace) -> &'a Workspace {
        workspace.workspace()
    }

    fn requires_auth_domain(&self) -> bool {
        true
    }

    async fn load_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<UploadWorkspace>> {
        self.store.list_upload_workspaces(scope).await
    }

    async fn list_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        self.store.list_managed_groups().await
    }

    async fn snapshot(
        &self,
        upload: &UploadWorkspace,
    ) -> AppResult<(Option<ManagedGroup>, UploadLifecycle)> {
        let auth_domain = find_auth_domain(self.store.as_ref(), upload.workspace()).await?;
        let lifecycle = upload_lifecycle(self.store.as_ref(), upload, self.config.as_of()).await?;
        Ok((auth_domain, lifecycle))
    }

    async fn classify_with(
        &self,
        upload: &UploadWorkspace,
        snapshot: &(Option<ManagedGroup>, UploadLifecycle),
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>> {
        let (auth_domain, lifecycle) = snapshot;
        let context = GroupContext::new(&self.config, upload.workspace())
            .with_research_center(upload.research_center());
        let Some(class) = GroupClass::classify(managed_group, &context) else {
            return Ok(None);
        };
        let Some(auth_domain) = auth_domain else {
            return Ok(None);
        };

        let current_membership = self
            .store
            .find_membership(auth_domain.id(), managed_group.id())
            .await?;

        Ok(Some(upload_auth_domain_rule(class, *lifecycle).evaluate(
            upload.workspace(),
            auth_domain,
            managed_group,
            current_membership,
        )))
    }
}
