use std::sync::Arc;

use async_trait::async_trait;
use gregor_access_core::AppResult;
use gregor_access_domain::{
    AccessLevel, CombinedConsortiumDataWorkspace, CombinedLifecycle, GroupRole, ManagedGroup,
    SharingGrant, Workspace,
};

use super::decision::{Classified, MembershipRule, SharingRule};
use super::engine::AccessAudit;
use super::group_class::{GroupClass, GroupContext};
use super::results::{AuthDomainMembershipAuditResult, WorkspaceSharingAuditResult, audit_notes};
use super::support::find_auth_domain;
use crate::{AccessStore, AuditConfig, AuditScope};

audit_notes! {
    /// Notes of the combined workspace sharing audit.
    CombinedWorkspaceSharingNote {
        DccAdminAsOwner => (
            "DCC_ADMIN_AS_OWNER",
            "The DCC admin group should always be an owner."
        ),
        DccWritersBeforeComplete => (
            "DCC_WRITERS_BEFORE_COMPLETE",
            "DCC writers should have write and compute access before the workspace is complete."
        ),
        DccWritersAfterComplete => (
            "DCC_WRITERS_AFTER_COMPLETE",
            "DCC writers should not have direct access after the workspace is complete."
        ),
        DccMembersBeforeComplete => (
            "DCC_MEMBERS_BEFORE_COMPLETE",
            "DCC members should have read access before the workspace is complete."
        ),
        DccMembersAfterComplete => (
            "DCC_MEMBERS_AFTER_COMPLETE",
            "DCC members should not have direct access after the workspace is complete."
        ),
        GregorAllBeforeComplete => (
            "GREGOR_ALL_BEFORE_COMPLETE",
            "GREGOR_ALL should not have access before the workspace is complete."
        ),
        GregorAllAfterComplete => (
            "GREGOR_ALL_AFTER_COMPLETE",
            "GREGOR_ALL should have read access after the workspace is complete."
        ),
        AuthDomainBeforeComplete => (
            "AUTH_DOMAIN_BEFORE_COMPLETE",
            "The auth domain should not have access before the workspace is complete."
        ),
        AuthDomainAfterComplete => (
            "AUTH_DOMAIN_AFTER_COMPLETE",
            "The auth domain should have read access after the workspace is complete."
        ),
        OtherGroupNoAccess => (
            "OTHER_GROUP_NO_ACCESS",
            "Other groups should not have direct access."
        ),
    }
}

audit_notes! {
    /// Notes of the combined workspace auth domain audit.
    CombinedWorkspaceAuthDomainNote {
        DccAdmins => (
            "DCC_ADMINS",
            "The DCC admin group should always be an admin of the auth domain."
        ),
        DccBeforeComplete => (
            "DCC_BEFORE_COMPLETE",
            "DCC groups should be members of the auth domain before the workspace is complete."
        ),
        DccAfterComplete => (
            "DCC_AFTER_COMPLETE",
            "DCC groups should not be in the auth domain after the workspace is complete."
        ),
        GregorAllBeforeComplete => (
            "GREGOR_ALL_BEFORE_COMPLETE",
            "GREGOR_ALL should not be in the auth domain before the workspace is complete."
        ),
        GregorAllAfterComplete => (
            "GREGOR_ALL_AFTER_COMPLETE",
            "GREGOR_ALL should be a member of the auth domain after the workspace is complete."
        ),
        OtherGroup => (
            "OTHER_GROUP",
            "Other groups should not be in the auth domain."
        ),
    }
}

/// Result type of [`CombinedWorkspaceSharingAudit`].
pub type CombinedWorkspaceSharingAuditResult =
    WorkspaceSharingAuditResult<CombinedWorkspaceSharingNote>;

/// Result type of [`CombinedWorkspaceAuthDomainAudit`].
pub type CombinedWorkspaceAuthDomainAuditResult =
    AuthDomainMembershipAuditResult<CombinedWorkspaceAuthDomainNote>;

pub(crate) fn combined_sharing_rule(
    class: GroupClass,
    lifecycle: CombinedLifecycle,
) -> SharingRule<CombinedWorkspaceSharingNote> {
    use CombinedLifecycle as L;
    use CombinedWorkspaceSharingNote as N;

    match (class, lifecycle) {
        (GroupClass::DccAdmins, _) => {
            SharingRule::share(SharingGrant::owner(), AccessLevel::Owner, N::DccAdminAsOwner)
        }
        (GroupClass::DccWriters, L::BeforeComplete) => SharingRule::share(
            SharingGrant::writer_with_compute(),
            AccessLevel::Writer,
            N::DccWritersBeforeComplete,
        ),
        (GroupClass::DccWriters, L::AfterComplete) => {
            SharingRule::not_shared(Some(AccessLevel::Writer), N::DccWritersAfterComplete)
        }
        (GroupClass::DccMembers, L::BeforeComplete) => SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Reader,
            N::DccMembersBeforeComplete,
        ),
        (GroupClass::DccMembers, L::AfterComplete) => {
            SharingRule::not_shared(Some(AccessLevel::Reader), N::DccMembersAfterComplete)
        }
        (GroupClass::GregorAll, L::BeforeComplete) => {
            SharingRule::not_shared(None, N::GregorAllBeforeComplete)
        }
        (GroupClass::GregorAll, L::AfterComplete) => SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Reader,
            N::GregorAllAfterComplete,
        ),
        (GroupClass::AuthDomain, L::BeforeComplete) => {
            SharingRule::not_shared(None, N::AuthDomainBeforeComplete)
        }
        (GroupClass::AuthDomain, L::AfterComplete) => SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Reader,
            N::AuthDomainAfterComplete,
        ),
        (
            GroupClass::RcUploaders
            | GroupClass::RcMembers
            | GroupClass::RcNonMembers
            | GroupClass::Other,
            _,
        ) => SharingRule::not_shared(None, N::OtherGroupNoAccess),
    }
}

pub(crate) fn combined_auth_domain_rule(
    class: GroupClass,
    lifecycle: CombinedLifecycle,
) -> MembershipRule<CombinedWorkspaceAuthDomainNote> {
    use CombinedLifecycle as L;
    use CombinedWorkspaceAuthDomainNote as N;

    let member = GroupRole::Member;
    match (class, lifecycle) {
        (GroupClass::DccAdmins, _) => {
            MembershipRule::member(GroupRole::Admin, GroupRole::Admin, N::DccAdmins)
        }
        (GroupClass::DccWriters | GroupClass::DccMembers, L::BeforeComplete) => {
            MembershipRule::member(member, member, N::DccBeforeComplete)
        }
        (GroupClass::DccWriters | GroupClass::DccMembers, L::AfterComplete) => {
            MembershipRule::not_member(Some(member), N::DccAfterComplete)
        }
        (GroupClass::GregorAll, L::BeforeComplete) => {
            MembershipRule::not_member(None, N::GregorAllBeforeComplete)
        }
        (GroupClass::GregorAll, L::AfterComplete) => {
            MembershipRule::member(member, member, N::GregorAllAfterComplete)
        }
        (
            GroupClass::RcUploaders
            | GroupClass::RcMembers
            | GroupClass::RcNonMembers
            | GroupClass::AuthDomain
            | GroupClass::Other,
            _,
        ) => MembershipRule::not_member(None, N::OtherGroup),
    }
}

/// Audits direct sharing of combined consortium data workspaces.
#[derive(Clone)]
pub struct CombinedWorkspaceSharingAudit {
    store: Arc<dyn AccessStore>,
    config: AuditConfig,
}

impl CombinedWorkspaceSharingAudit {
    /// Creates the audit.
    #[must_use]
    pub fn new(store: Arc<dyn AccessStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AccessAudit for CombinedWorkspaceSharingAudit {
    type Workspace = CombinedConsortiumDataWorkspace;
    type Result = CombinedWorkspaceSharingAuditResult;
    type Snapshot = CombinedLifecycle;

    fn name(&self) -> &'static str {
        "CombinedConsortiumDataWorkspaceSharingAudit"
    }

    fn base_workspace<'a>(&self, workspace: &'a CombinedConsortiumDataWorkspace) -> &'a Workspace {
        workspace.workspace()
    }

    async fn load_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<CombinedConsortiumDataWorkspace>> {
        self.store.list_combined_workspaces(scope).await
    }

    async fn list_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        self.store.list_managed_groups().await
    }

    async fn snapshot(
        &self,
        combined: &CombinedConsortiumDataWorkspace,
    ) -> AppResult<CombinedLifecycle> {
        Ok(combined.lifecycle())
    }

    async fn classify_with(
        &self,
        combined: &CombinedConsortiumDataWorkspace,
        lifecycle: &CombinedLifecycle,
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>> {
        let context = GroupContext::new(&self.config, combined.workspace());
        let Some(class) = GroupClass::classify(managed_group, &context) else {
            return Ok(None);
        };

        let current_sharing = self
            .store
            .find_sharing(combined.workspace().id(), managed_group.id())
            .await?;

        Ok(Some(
            combined_sharing_rule(class, *lifecycle).evaluate(
                combined.workspace(),
                managed_group,
                current_sharing,
            ),
        ))
    }
}

/// Audits membership in the authorization domain of combined workspaces.
#[derive(Clone)]
pub struct CombinedWorkspaceAuthDomainAudit {
    store: Arc<dyn AccessStore>,
    config: AuditConfig,
}

impl CombinedWorkspaceAuthDomainAudit {
    /// Creates the audit.
    #[must_use]
    pub fn new(store: Arc<dyn AccessStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AccessAudit for CombinedWorkspaceAuthDomainAudit {
    type Workspace = CombinedConsortiumDataWorkspace;
    type Result = CombinedWorkspaceAuthDomainAuditResult;
    type Snapshot = Option<ManagedGroup>;

    fn name(&self) -> &'static str {
        "CombinedConsortiumDataWorkspaceAuthDomainAudit"
    }

    fn base_workspace<'a>(&self, workspace: &'a CombinedConsortiumDataWorkspace) -> &'a Workspace {
        workspace.workspace()
    }

    fn requires_auth_domain(&self) -> bool {
        true
    }

    async fn load_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<CombinedConsortiumDataWorkspace>> {
        self.store.list_combined_workspaces(scope).await
    }

    async fn list_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        self.store.list_managed_groups().await
    }

    async fn snapshot(
        &self,
        combined: &CombinedConsortiumDataWorkspace,
    ) -> AppResult<Option<ManagedGroup>> {
        find_auth_domain(self.store.as_ref(), combined.workspace()).await
    }

    async fn classify_with(
        &self,
        combined: &CombinedConsortiumDataWorkspace,
        auth_domain: &Option<ManagedGroup>,
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>> {
        let context = GroupContext::new(&self.config, combined.workspace());
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

        Ok(Some(
            combined_auth_domain_rule(class, combined.lifecycle()).evaluate(
                combined.workspace(),
                auth_domain,
                managed_group,
                current_membership,
            ),
        ))
    }
}
