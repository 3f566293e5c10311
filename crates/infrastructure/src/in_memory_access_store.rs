use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use gregor_access_application::{AccessStore, AuditScope};
use gregor_access_core::{AppError, AppResult, ManagedGroupId, UploadCycleId, WorkspaceId};
use gregor_access_domain::{
    CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupGroupMembership, GroupRole,
    ManagedGroup, SharingGrant, UploadWorkspace, Workspace, WorkspaceGroupSharing,
};
use tokio::sync::RwLock;

/// In-memory access store, used for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    groups: RwLock<HashMap<ManagedGroupId, ManagedGroup>>,
    upload_workspaces: RwLock<Vec<UploadWorkspace>>,
    combined_workspaces: RwLock<Vec<CombinedConsortiumDataWorkspace>>,
    dcc_processed_workspaces: RwLock<Vec<DccProcessedDataWorkspace>>,
    sharing: RwLock<HashMap<(WorkspaceId, ManagedGroupId), WorkspaceGroupSharing>>,
    memberships: RwLock<HashMap<(ManagedGroupId, ManagedGroupId), GroupGroupMembership>>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a managed group. Names are unique.
    pub async fn insert_managed_group(&self, group: ManagedGroup) -> AppResult<()> {
        let mut groups = self.groups.write().await;
        if groups
            .values()
            .any(|existing| existing.name() == group.name())
        {
            return Err(AppError::Conflict(format!(
                "managed group '{}' already exists",
                group.name()
            )));
        }

        groups.insert(group.id(), group);
        Ok(())
    }

    /// Registers an upload workspace.
    pub async fn insert_upload_workspace(&self, upload: UploadWorkspace) -> AppResult<()> {
        self.ensure_new_workspace(upload.workspace()).await?;
        self.upload_workspaces.write().await.push(upload);
        Ok(())
    }

    /// Registers a combined consortium data workspace.
    pub async fn insert_combined_workspace(
        &self,
        combined: CombinedConsortiumDataWorkspace,
    ) -> AppResult<()> {
        self.ensure_new_workspace(combined.workspace()).await?;
        self.combined_workspaces.write().await.push(combined);
        Ok(())
    }

    /// Registers a DCC processed data workspace.
    pub async fn insert_dcc_processed_workspace(
        &self,
        processed: DccProcessedDataWorkspace,
    ) -> AppResult<()> {
        self.ensure_new_workspace(processed.workspace()).await?;
        self.dcc_processed_workspaces.write().await.push(processed);
        Ok(())
    }

    async fn ensure_new_workspace(&self, workspace: &Workspace) -> AppResult<()> {
        let id = workspace.id();
        let exists = self
            .upload_workspaces
            .read()
            .await
            .iter()
            .any(|upload| upload.workspace().id() == id)
            || self
                .combined_workspaces
                .read()
                .await
                .iter()
                .any(|combined| combined.workspace().id() == id)
            || self
                .dcc_processed_workspaces
                .read()
                .await
                .iter()
                .any(|processed| processed.workspace().id() == id);

        if exists {
            return Err(AppError::Conflict(format!(
                "workspace '{}' already exists",
                workspace.full_name()
            )));
        }

        Ok(())
    }
}

fn select_in_scope<T: Clone>(
    workspaces: &[T],
    scope: &AuditScope,
    kind: &str,
    workspace_of: impl Fn(&T) -> &Workspace,
) -> AppResult<Vec<T>> {
    let AuditScope::Workspaces(ids) = scope else {
        return Ok(workspaces.to_vec());
    };

    if let Some(missing) = ids.iter().find(|id| {
        !workspaces
            .iter()
            .any(|workspace| workspace_of(workspace).id() == **id)
    }) {
        return Err(AppError::Validation(format!(
            "workspace '{missing}' is not {kind}"
        )));
    }

    Ok(workspaces
        .iter()
        .filter(|workspace| ids.contains(&workspace_of(workspace).id()))
        .cloned()
        .collect())
}

#[async_trait]
impl AccessStore for InMemoryAccessStore {
    async fn list_managed_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        let mut groups: Vec<ManagedGroup> = self.groups.read().await.values().cloned().collect();
        groups.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(groups)
    }

    async fn find_managed_group(
        &self,
        group_id: ManagedGroupId,
    ) -> AppResult<Option<ManagedGroup>> {
        Ok(self.groups.read().await.get(&group_id).cloned())
    }

    async fn list_upload_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<UploadWorkspace>> {
        select_in_scope(
            &self.upload_workspaces.read().await,
            scope,
            "an upload workspace",
            UploadWorkspace::workspace,
        )
    }

    async fn list_combined_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<CombinedConsortiumDataWorkspace>> {
        select_in_scope(
            &self.combined_workspaces.read().await,
            scope,
            "a combined consortium data workspace",
            CombinedConsortiumDataWorkspace::workspace,
        )
    }

    async fn list_dcc_processed_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<DccProcessedDataWorkspace>> {
        select_in_scope(
            &self.dcc_processed_workspaces.read().await,
            scope,
            "a DCC processed data workspace",
            DccProcessedDataWorkspace::workspace,
        )
    }

    async fn find_complete_combined_workspace(
        &self,
        upload_cycle_id: UploadCycleId,
    ) -> AppResult<Option<CombinedConsortiumDataWorkspace>> {
        Ok(self
            .combined_workspaces
            .read()
            .await
            .iter()
            .find(|combined| {
                combined.upload_cycle_id() == upload_cycle_id && combined.is_complete()
            })
            .cloned())
    }

    async fn find_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
    ) -> AppResult<Option<WorkspaceGroupSharing>> {
        Ok(self
            .sharing
            .read()
            .await
            .get(&(workspace_id, group_id))
            .cloned())
    }

    async fn save_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
        grant: SharingGrant,
    ) -> AppResult<WorkspaceGroupSharing> {
        let now = Utc::now();
        let mut sharing = self.sharing.write().await;
        let saved = match sharing.get(&(workspace_id, group_id)) {
            Some(existing) if existing.grant() == grant => existing.clone(),
            Some(existing) => WorkspaceGroupSharing::new(
                workspace_id,
                group_id,
                grant,
                existing.created_at(),
                now.max(existing.modified_at()),
            ),
            None => WorkspaceGroupSharing::new(workspace_id, group_id, grant, now, now),
        };

        sharing.insert((workspace_id, group_id), saved.clone());
        Ok(saved)
    }

    async fn delete_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
    ) -> AppResult<bool> {
        Ok(self
            .sharing
            .write()
            .await
            .remove(&(workspace_id, group_id))
            .is_some())
    }

    async fn find_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
    ) -> AppResult<Option<GroupGroupMembership>> {
        Ok(self
            .memberships
            .read()
            .await
            .get(&(parent_group_id, child_group_id))
            .cloned())
    }

    async fn save_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
        role: GroupRole,
    ) -> AppResult<GroupGroupMembership> {
        let now = Utc::now();
        let mut memberships = self.memberships.write().await;
        let saved = match memberships.get(&(parent_group_id, child_group_id)) {
            Some(existing) if existing.role() == role => existing.clone(),
            Some(existing) => GroupGroupMembership::new(
                parent_group_id,
                child_group_id,
                role,
                existing.created_at(),
                now.max(existing.modified_at()),
            )?,
            None => GroupGroupMembership::new(parent_group_id, child_group_id, role, now, now)?,
        };

        memberships.insert((parent_group_id, child_group_id), saved.clone());
        Ok(saved)
    }

    async fn delete_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
    ) -> AppResult<bool> {
        Ok(self
            .memberships
            .write()
            .await
            .remove(&(parent_group_id, child_group_id))
            .is_some())
    }
}
