use std::sync::Arc;

use gregor_access_core::AppResult;
use gregor_access_domain::{
    GroupGroupMembership, GroupRole, ManagedGroup, SharingGrant, Workspace, WorkspaceGroupSharing,
};
use tracing::{info, warn};

use crate::{AccessStore, AclEntry, AnvilAccessClient};

/// Applies audit remediations: remote API first, then the store.
///
/// A remote failure leaves the store untouched, so the next audit pass sees
/// the same state and the remediation can be retried.
#[derive(Clone)]
pub struct AccessRemediationService {
    store: Arc<dyn AccessStore>,
    client: Arc<dyn AnvilAccessClient>,
}

impl AccessRemediationService {
    /// Creates a remediation service.
    #[must_use]
    pub fn new(store: Arc<dyn AccessStore>, client: Arc<dyn AnvilAccessClient>) -> Self {
        Self { store, client }
    }

    /// Shares `workspace` with `group` using exactly `grant`.
    pub async fn share_workspace(
        &self,
        workspace: &Workspace,
        group: &ManagedGroup,
        grant: SharingGrant,
    ) -> AppResult<WorkspaceGroupSharing> {
        let entry = AclEntry::grant(group.email(), grant);
        self.client
            .update_workspace_acl(workspace, &[entry])
            .await
            .inspect_err(|error| {
                warn!(
                    workspace = %workspace.full_name(),
                    managed_group = %group.name(),
                    error = %error,
                    "failed to update workspace acl"
                );
            })?;

        let sharing = self
            .store
            .save_sharing(workspace.id(), group.id(), grant)
            .await?;
        info!(
            workspace = %workspace.full_name(),
            managed_group = %group.name(),
            access = grant.access().as_str(),
            can_compute = grant.can_compute(),
            "shared workspace"
        );

        Ok(sharing)
    }

    /// Revokes any sharing of `workspace` with `group`. No-op without a grant.
    pub async fn stop_sharing(&self, workspace: &Workspace, group: &ManagedGroup) -> AppResult<()> {
        if self
            .store
            .find_sharing(workspace.id(), group.id())
            .await?
            .is_none()
        {
            return Ok(());
        }

        let entry = AclEntry::revoke(group.email());
        self.client
            .update_workspace_acl(workspace, &[entry])
            .await
            .inspect_err(|error| {
                warn!(
                    workspace = %workspace.full_name(),
                    managed_group = %group.name(),
                    error = %error,
                    "failed to revoke workspace acl"
                );
            })?;

        self.store.delete_sharing(workspace.id(), group.id()).await?;
        info!(
            workspace = %workspace.full_name(),
            managed_group = %group.name(),
            "stopped sharing workspace"
        );

        Ok(())
    }

    /// Makes `child` a member of `parent` with exactly `role`.
    ///
    /// A role change adds the new role remotely before removing the old one.
    pub async fn set_membership(
        &self,
        parent: &ManagedGroup,
        child: &ManagedGroup,
        role: GroupRole,
    ) -> AppResult<GroupGroupMembership> {
        let existing = self.store.find_membership(parent.id(), child.id()).await?;

        self.client
            .add_group_member(parent.name(), role, child.email())
            .await
            .inspect_err(|error| log_membership_failure(parent, child, error))?;

        if let Some(previous_role) = existing
            .as_ref()
            .map(GroupGroupMembership::role)
            .filter(|previous_role| *previous_role != role)
        {
            self.client
                .remove_group_member(parent.name(), previous_role, child.email())
                .await
                .inspect_err(|error| log_membership_failure(parent, child, error))?;
        }

        let membership = self
            .store
            .save_membership(parent.id(), child.id(), role)
            .await?;
        info!(
            parent_group = %parent.name(),
            managed_group = %child.name(),
            role = role.as_str(),
            "set group membership"
        );

        Ok(membership)
    }

    /// Removes `child` from `parent`. No-op without a membership.
    pub async fn remove_membership(
        &self,
        parent: &ManagedGroup,
        child: &ManagedGroup,
    ) -> AppResult<()> {
        let Some(existing) = self.store.find_membership(parent.id(), child.id()).await? else {
            return Ok(());
        };

        self.client
            .remove_group_member(parent.name(), existing.role(), child.email())
            .await
            .inspect_err(|error| log_membership_failure(parent, child, error))?;

        self.store
            .delete_membership(parent.id(), child.id())
            .await?;
        info!(
            parent_group = %parent.name(),
            managed_group = %child.name(),
            "removed group membership"
        );

        Ok(())
    }
}

fn log_membership_failure(
    parent: &ManagedGroup,
    child: &ManagedGroup,
    error: &gregor_access_core::AppError,
) {
    warn!(
        parent_group = %parent.name(),
        managed_group = %child.name(),
        error = %error,
        "failed to update group membership"
    );
}
