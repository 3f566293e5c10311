use async_trait::async_trait;
use gregor_access_core::{AppResult, ManagedGroupId, UploadCycleId, WorkspaceId};
use gregor_access_domain::{
    AccessLevel, CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupGroupMembership,
    GroupRole, ManagedGroup, SharingGrant, UploadWorkspace, Workspace, WorkspaceGroupSharing,
};
use serde::Serialize;

/// Restricts which workspaces an audit run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuditScope {
    /// Every workspace of the audited kind.
    #[default]
    All,
    /// Only the listed workspaces. Every id must refer to the audited kind.
    Workspaces(Vec<WorkspaceId>),
}

/// Data store port for groups, workspaces, sharing grants, and memberships.
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Lists every managed group.
    async fn list_managed_groups(&self) -> AppResult<Vec<ManagedGroup>>;

    /// Finds one managed group.
    async fn find_managed_group(&self, group_id: ManagedGroupId)
    -> AppResult<Option<ManagedGroup>>;

    /// Lists upload workspaces in scope.
    ///
    /// Returns a validation error if a scoped id is not an upload workspace.
    async fn list_upload_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<UploadWorkspace>>;

    /// Lists combined consortium data workspaces in scope.
    ///
    /// Returns a validation error if a scoped id is not a combined workspace.
    async fn list_combined_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<CombinedConsortiumDataWorkspace>>;

    /// Lists DCC processed data workspaces in scope.
    ///
    /// Returns a validation error if a scoped id is not a DCC processed workspace.
    async fn list_dcc_processed_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<DccProcessedDataWorkspace>>;

    /// Finds a complete combined workspace for the upload cycle, if any.
    async fn find_complete_combined_workspace(
        &self,
        upload_cycle_id: UploadCycleId,
    ) -> AppResult<Option<CombinedConsortiumDataWorkspace>>;

    /// Finds the sharing grant of a workspace with a group.
    async fn find_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
    ) -> AppResult<Option<WorkspaceGroupSharing>>;

    /// Creates or updates a sharing grant.
    ///
    /// `created_at` is kept on update; `modified_at` only advances when the
    /// grant changes.
    async fn save_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
        grant: SharingGrant,
    ) -> AppResult<WorkspaceGroupSharing>;

    /// Deletes a sharing grant. Returns whether a record was removed.
    async fn delete_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
    ) -> AppResult<bool>;

    /// Finds the membership of `child` inside `parent`.
    async fn find_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
    ) -> AppResult<Option<GroupGroupMembership>>;

    /// Creates or updates a membership role with the same timestamp rules as
    /// [`AccessStore::save_sharing`].
    async fn save_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
        role: GroupRole,
    ) -> AppResult<GroupGroupMembership>;

    /// Deletes a membership. Returns whether a record was removed.
    async fn delete_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
    ) -> AppResult<bool>;
}

/// One entry of a workspace ACL update sent to the remote API.
///
/// Entries only come from [`AclEntry::grant`] and [`AclEntry::revoke`], so
/// share rights are never delegated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AclEntry {
    email: String,
    access_level: AccessLevel,
    can_share: bool,
    can_compute: bool,
}

impl AclEntry {
    /// Builds an entry granting `grant` to `email`.
    #[must_use]
    pub fn grant(email: &str, grant: SharingGrant) -> Self {
        Self {
            email: email.to_owned(),
            access_level: grant.access(),
            can_share: false,
            can_compute: grant.can_compute(),
        }
    }

    /// Builds an entry revoking all access for `email`.
    #[must_use]
    pub fn revoke(email: &str) -> Self {
        Self {
            email: email.to_owned(),
            access_level: AccessLevel::NoAccess,
            can_share: false,
            can_compute: false,
        }
    }

    /// Returns the group address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the access level to set.
    #[must_use]
    pub fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    /// Always false.
    #[must_use]
    pub fn can_share(&self) -> bool {
        self.can_share
    }

    /// Returns the compute permission.
    #[must_use]
    pub fn can_compute(&self) -> bool {
        self.can_compute
    }
}

/// Port for the remote workspace access-control API.
#[async_trait]
pub trait AnvilAccessClient: Send + Sync {
    /// Applies ACL entries to one workspace.
    async fn update_workspace_acl(&self, workspace: &Workspace, entries: &[AclEntry])
    -> AppResult<()>;

    /// Adds `member_email` to `group_name` with `role`.
    async fn add_group_member(
        &self,
        group_name: &str,
        role: GroupRole,
        member_email: &str,
    ) -> AppResult<()>;

    /// Removes `member_email` from the `role` list of `group_name`.
    async fn remove_group_member(
        &self,
        group_name: &str,
        role: GroupRole,
        member_email: &str,
    ) -> AppResult<()>;
}

/// Port for sending emails. Infrastructure provides SMTP or console implementations.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text or HTML email.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}
