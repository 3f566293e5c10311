use std::sync::Arc;

use async_trait::async_trait;
use gregor_access_core::AppResult;
use gregor_access_domain::{
    AccessLevel, DccProcessedDataWorkspace, DccProcessedLifecycle, GroupGroupMembership,
    GroupRole, ManagedGroup, SharingGrant, Workspace,
};

use super::decision::{Classified, MembershipRule, SharingRule};
use super::engine::AccessAudit;
use super::group_class::{GroupClass, GroupContext};
use super::results::{AuthDomainMembershipAuditResult, WorkspaceSharingAuditResult, audit_notes};
use super::support::{find_auth_domain, is_combined_ready};
use crate::{AccessStore, AuditConfig, AuditScope};

audit_notes! {
    /// Notes of the DCC processed data workspace sharing audit.
    DccProcessedWorkspaceSharingNote {
        DccAdminAsOwner => (
            "DCC_ADMIN_AS_OWNER",
            "The DCC admin group should always be an owner."
        ),
        DccWritersBeforeCombined => (
            "DCC_WRITERS_BEFORE_COMBINED",
            "DCC writers should have write and compute access until the combined workspace is complete."
        ),
        DccWritersAfterCombined => (
            "DCC_WRITERS_AFTER_COMBINED",
            "DCC writers should not have direct access once the combined workspace is complete."
        ),
        DccMembersBeforeCombined => (
            "DCC_MEMBERS_BEFORE_COMBINED",
            "DCC members should have read access until the combined workspace is complete."
        ),
        DccMembersAfterCombined => (
            "DCC_MEMBERS_AFTER_COMBINED",
            "DCC members should not have direct access once the combined workspace is complete."
        ),
        AuthDomainAsReader => (
            "AUTH_DOMAIN_AS_READER",
            "The auth domain should always be a reader."
        ),
        OtherGroupNoAccess => (
            "OTHER_GROUP_NO_ACCESS",
            "Other groups should not have direct access."
        ),
    }
}

audit_notes! {
    /// Notes of the DCC processed data workspace auth domain audit.
    DccProcessedWorkspaceAuthDomainNote {
        DccAdmins => (
            "DCC_ADMINS",
            "The DCC admin group should always be an admin of the auth domain."
        ),
        DccBeforeCombined => (
            "DCC_BEFORE_COMBINED",
            "DCC groups should be members of the auth domain until the combined workspace is complete."
        ),
        DccAfterCombined => (
            "DCC_AFTER_COMBINED",
            "DCC groups should not be in the auth domain once the combined workspace is complete."
        ),
        GregorAllUndetermined => (
            "GREGOR_ALL_UNDETERMINED",
            "No rule is settled for GREGOR_ALL; its current membership is reported as is."
        ),
        OtherGroup => (
            "OTHER_GROUP",
            "Other groups should not be in the auth domain."
        ),
    }
}

/// Result type of [`DccProcessedWorkspaceSharingAudit`].
pub type DccProcessedWorkspaceSharingAuditResult =
    WorkspaceSharingAuditResult<DccProcessedWorkspaceSharingNote>;

/// Result type of [`DccProcessedWorkspaceAuthDomainAudit`].
pub type DccProcessedWorkspaceAuthDomainAuditResult =
    AuthDomainMembershipAuditResult<DccProcessedWorkspaceAuthDomainNote>;

pub(crate) fn dcc_processed_sharing_rule(
    class: GroupClass,
    lifecycle: DccProcessedLifecycle,
) -> SharingRule<DccProcessedWorkspaceSharingNote> {
    use DccProcessedLifecycle as L;
    use DccProcessedWorkspaceSharingNote as N;

    match (class, lifecycle) {
        (GroupClass::DccAdmins, _) => {
            SharingRule::share(SharingGrant::owner(), AccessLevel::Owner, N::DccAdminAsOwner)
        }
        (GroupClass::DccWriters, L::BeforeCombinedComplete) => SharingRule::share(
            SharingGrant::writer_with_compute(),
            AccessLevel::Writer,
            N::DccWritersBeforeCombined,
        ),
        (GroupClass::DccWriters, L::AfterCombinedComplete) => {
            SharingRule::not_shared(Some(AccessLevel::Writer), N::DccWritersAfterCombined)
        }
        (GroupClass::DccMembers, L::BeforeCombinedComplete) => SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Reader,
            N::DccMembersBeforeCombined,
        ),
        (GroupClass::DccMembers, L::AfterCombinedComplete) => {
            SharingRule::not_shared(Some(AccessLevel::Reader), N::DccMembersAfterCombined)
        }
        (GroupClass::AuthDomain, _) => SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Reader,
            N::AuthDomainAsReader,
        ),
        (
            GroupClass::RcUploaders
            | GroupClass::RcMembers
            | GroupClass::RcNonMembers
            | GroupClass::GregorAll
            | GroupClass::Other,
            _,
        ) => SharingRule::not_shared(None, N::OtherGroupNoAccess),
    }
}

pub(crate) fn dcc_processed_auth_domain_rule(
    class: GroupClass,
    lifecycle: DccProcessedLifecycle,
    current_role: Option<GroupRole>,
) -> MembershipRule<DccProcessedWorkspaceAuthDomainNote> {
    use DccProcessedLifecycle as L;
    use DccProcessedWorkspaceAuthDomainNote as N;

    let member = GroupRole::Member;
    match (class, lifecycle) {
        (GroupClass::DccAdmins, _) => {
            MembershipRule::member(GroupRole::Admin, GroupRole::Admin, N::DccAdmins)
        }
        (GroupClass::DccWriters | GroupClass::DccMembers, L::BeforeCombinedComplete) => {
            MembershipRule::member(member, member, N::DccBeforeCombined)
        }
        (GroupClass::DccWriters | GroupClass::DccMembers, L::AfterCombinedComplete) => {
            MembershipRule::not_member(Some(member), N::DccAfterCombined)
        }
        (GroupClass::GregorAll, _) => {
            MembershipRule::unchanged(current_role, N::GregorAllUndetermined)
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

async fn dcc_processed_lifecycle(
    store: &dyn AccessStore,
    processed: &DccProcessedDataWorkspace,
) -> AppResult<DccProcessedLifecycle> {
    let combined_ready = is_combined_ready(store, processed.upload_cycle_id()).await?;
    Ok(DccProcessedLifecycle::from_combined_ready(combined_ready))
}

/// Audits direct sharing of DCC processed data workspaces.
#[derive(Clone)]
pub struct DccProcessedWorkspaceSharingAudit {
    store: Arc<dyn AccessStore>,
    config: AuditConfig,
}

impl DccProcessedWorkspaceSharingAudit {
    /// Creates the audit.
    #[must_use]
    pub fn new(store: Arc<dyn AccessStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AccessAudit for DccProcessedWorkspaceSharingAudit {
    type Workspace = DccProcessedDataWorkspace;
    type Result = DccProcessedWorkspaceSharingAuditResult;
    type Snapshot = DccProcessedLifecycle;

    fn name(&self) -> &'static str {
        "DCCProcessedDataWorkspaceSharingAudit"
    }

    fn base_workspace<'a>(&self, workspace: &'a DccProcessedDataWorkspace) -> &'a Workspace {
        workspace.workspace()
    }

    async fn load_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<DccProcessedDataWorkspace>> {
        self.store.list_dcc_processed_workspaces(scope).await
    }

    async fn list_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        self.store.list_managed_groups().await
    }

    async fn snapshot(
        &self,
        processed: &DccProcessedDataWorkspace,
    ) -> AppResult<DccProcessedLifecycle> {
        dcc_processed_lifecycle(self.store.as_ref(), processed).await
    }

    async fn classify_with(
        &self,
        processed: &DccProcessedDataWorkspace,
        lifecycle: &DccProcessedLifecycle,
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>> {
        let context = GroupContext::new(&self.config, processed.workspace());
        let Some(class) = GroupClass::classify(managed_group, &context) else {
            return Ok(None);
        };

        let current_sharing = self
            .store
            .find_sharing(processed.workspace().id(), managed_group.id())
            .await?;

        Ok(Some(dcc_processed_sharing_rule(class, *lifecycle).evaluate(
            processed.workspace(),
            managed_group,
            current_sharing,
        )))
    }
}

/// Audits membership in the authorization domain of DCC processed data workspaces.
#[derive(Clone)]
pub struct DccProcessedWorkspaceAuthDomainAudit {
    store: Arc<dyn AccessStore>,
    config: AuditConfig,
}

impl DccProcessedWorkspaceAuthDomainAudit {
    /// Creates the audit.
    #[must_use]
    pub fn new(store: Arc<dyn AccessStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AccessAudit for DccProcessedWorkspaceAuthDomainAudit {
    type Workspace = DccProcessedDataWorkspace;
    type Result = DccProcessedWorkspaceAuthDomainAuditResult;
    type Snapshot = (Option<ManagedGroup>, DccProcessedLifecycle);

    fn name(&self) -> &'static str {
        "DCCProcessedDataWorkspaceAuthDomainAudit"
    }

    fn base_workspace<'a>(&self, workspace: &'a DccProcessedDataWorkspace) -> &'a Workspace {
        workspace.workspace()
    }

    fn requires_auth_domain(&self) -> bool {
        true
    }

    async fn load_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<DccProcessedDataWorkspace>> {
        self.store.list_dcc_processed_workspaces(scope).await
    }

    async fn list_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        self.store.list_managed_groups().await
    }

    async fn snapshot(
        &self,
        processed: &DccProcessedDataWorkspace,
    ) -> AppResult<(Option<ManagedGroup>, DccProcessedLifecycle)> {
        let auth_domain = find_auth_domain(self.store.as_ref(), processed.workspace()).await?;
        let lifecycle = dcc_processed_lifecycle(self.store.as_ref(), processed).await?;
        Ok((auth_domain, lifecycle))
    }

    async fn classify_with(
        &self,
        processed: &DccProcessedDataWorkspace,
        snapshot: &(Option<ManagedGroup>, DccProcessedLifecycle),
        managed_group: &ManagedGroup,
    ) -> AppResult<Option<Classified<Self::Result>>> {
        let (auth_domain, lifecycle) = snapshot;
        let context = GroupContext::new(&self.config, processed.workspace());
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
        let current_role = current_membership.as_ref().map(GroupGroupMembership::role);

        Ok(Some(
            dcc_processed_auth_domain_rule(class, *lifecycle, current_role).evaluate(
                processed.workspace(),
                auth_domain,
                managed_group,
                current_membership,
            ),
        ))
    }
}
