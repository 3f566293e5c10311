use std::collections::HashSet;

use async_trait::async_trait;
use gregor_access_application::{AccessStore, AuditScope};
use gregor_access_core::{AppError, AppResult, ManagedGroupId, UploadCycleId, WorkspaceId};
use gregor_access_domain::{
    CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupGroupMembership, GroupRole,
    ManagedGroup, SharingGrant, UploadWorkspace, WorkspaceGroupSharing,
};
use sqlx::PgPool;
use uuid::Uuid;

mod rows;

use rows::{
    CombinedWorkspaceRow, DccProcessedWorkspaceRow, ManagedGroupRow, MembershipRow, SharingRow,
    UploadWorkspaceRow,
};

/// PostgreSQL-backed access store.
#[derive(Clone)]
pub struct PostgresAccessStore {
    pool: PgPool,
}

impl PostgresAccessStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn scope_ids(scope: &AuditScope) -> Option<Vec<Uuid>> {
    match scope {
        AuditScope::All => None,
        AuditScope::Workspaces(ids) => Some(ids.iter().map(WorkspaceId::as_uuid).collect()),
    }
}

/// Fails when a scoped id did not resolve to a workspace of the listed kind.
fn ensure_scope_resolved(scope: &AuditScope, found: &HashSet<Uuid>, kind: &str) -> AppResult<()> {
    let AuditScope::Workspaces(ids) = scope else {
        return Ok(());
    };

    match ids.iter().find(|id| !found.contains(&id.as_uuid())) {
        Some(missing) => Err(AppError::Validation(format!(
            "workspace '{missing}' is not {kind}"
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl AccessStore for PostgresAccessStore {
    async fn list_managed_groups(&self) -> AppResult<Vec<ManagedGroup>> {
        let rows = sqlx::query_as::<_, ManagedGroupRow>(
            r#"
            SELECT id, name, email
            FROM managed_groups
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list managed groups: {error}")))?;

        rows.into_iter().map(ManagedGroupRow::into_domain).collect()
    }

    async fn find_managed_group(
        &self,
        group_id: ManagedGroupId,
    ) -> AppResult<Option<ManagedGroup>> {
        sqlx::query_as::<_, ManagedGroupRow>(
            r#"
            SELECT id, name, email
            FROM managed_groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find managed group: {error}")))?
        .map(ManagedGroupRow::into_domain)
        .transpose()
    }

    async fn list_upload_workspaces(&self, scope: &AuditScope) -> AppResult<Vec<UploadWorkspace>> {
        let rows = sqlx::query_as::<_, UploadWorkspaceRow>(
            r#"
            SELECT
                w.id AS workspace_id,
                w.billing_project,
                w.name AS workspace_name,
                w.auth_domain_id,
                c.id AS upload_cycle_id,
                c.cycle,
                c.start_date,
                c.end_date,
                c.date_ready_for_compute,
                r.id AS research_center_id,
                r.short_name,
                r.uploader_group_id,
                r.member_group_id,
                r.non_member_group_id,
                u.date_qc_completed
            FROM upload_workspaces u
            JOIN workspaces w ON w.id = u.workspace_id
            JOIN upload_cycles c ON c.id = u.upload_cycle_id
            JOIN research_centers r ON r.id = u.research_center_id
            WHERE ($1::UUID[] IS NULL OR w.id = ANY($1))
            ORDER BY w.billing_project, w.name
            "#,
        )
        .bind(scope_ids(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list upload workspaces: {error}"))
        })?;

        let found = rows.iter().map(UploadWorkspaceRow::workspace_id).collect();
        ensure_scope_resolved(scope, &found, "an upload workspace")?;
        rows.into_iter().map(UploadWorkspaceRow::into_domain).collect()
    }

    async fn list_combined_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<CombinedConsortiumDataWorkspace>> {
        let rows = sqlx::query_as::<_, CombinedWorkspaceRow>(
            r#"
            SELECT
                w.id AS workspace_id,
                w.billing_project,
                w.name AS workspace_name,
                w.auth_domain_id,
                cc.upload_cycle_id,
                cc.date_completed
            FROM combined_consortium_data_workspaces cc
            JOIN workspaces w ON w.id = cc.workspace_id
            WHERE ($1::UUID[] IS NULL OR w.id = ANY($1))
            ORDER BY w.billing_project, w.name
            "#,
        )
        .bind(scope_ids(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list combined workspaces: {error}"))
        })?;

        let found = rows.iter().map(CombinedWorkspaceRow::workspace_id).collect();
        ensure_scope_resolved(scope, &found, "a combined consortium data workspace")?;
        rows.into_iter().map(CombinedWorkspaceRow::into_domain).collect()
    }

    async fn list_dcc_processed_workspaces(
        &self,
        scope: &AuditScope,
    ) -> AppResult<Vec<DccProcessedDataWorkspace>> {
        let rows = sqlx::query_as::<_, DccProcessedWorkspaceRow>(
            r#"
            SELECT
                w.id AS workspace_id,
                w.billing_project,
                w.name AS workspace_name,
                w.auth_domain_id,
                p.upload_cycle_id
            FROM dcc_processed_data_workspaces p
            JOIN workspaces w ON w.id = p.workspace_id
            WHERE ($1::UUID[] IS NULL OR w.id = ANY($1))
            ORDER BY w.billing_project, w.name
            "#,
        )
        .bind(scope_ids(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list DCC processed workspaces: {error}"))
        })?;

        let found = rows
            .iter()
            .map(DccProcessedWorkspaceRow::workspace_id)
            .collect();
        ensure_scope_resolved(scope, &found, "a DCC processed data workspace")?;
        rows.into_iter()
            .map(DccProcessedWorkspaceRow::into_domain)
            .collect()
    }

    async fn find_complete_combined_workspace(
        &self,
        upload_cycle_id: UploadCycleId,
    ) -> AppResult<Option<CombinedConsortiumDataWorkspace>> {
        sqlx::query_as::<_, CombinedWorkspaceRow>(
            r#"
            SELECT
                w.id AS workspace_id,
                w.billing_project,
                w.name AS workspace_name,
                w.auth_domain_id,
                cc.upload_cycle_id,
                cc.date_completed
            FROM combined_consortium_data_workspaces cc
            JOIN workspaces w ON w.id = cc.workspace_id
            WHERE cc.upload_cycle_id = $1
                AND cc.date_completed IS NOT NULL
            ORDER BY cc.date_completed
            LIMIT 1
            "#,
        )
        .bind(upload_cycle_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find complete combined workspace: {error}"))
        })?
        .map(CombinedWorkspaceRow::into_domain)
        .transpose()
    }

    async fn find_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
    ) -> AppResult<Option<WorkspaceGroupSharing>> {
        sqlx::query_as::<_, SharingRow>(
            r#"
            SELECT workspace_id, group_id, access, can_compute, created_at, modified_at
            FROM workspace_group_sharing
            WHERE workspace_id = $1 AND group_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(group_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find sharing: {error}")))?
        .map(SharingRow::into_domain)
        .transpose()
    }

    async fn save_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
        grant: SharingGrant,
    ) -> AppResult<WorkspaceGroupSharing> {
        sqlx::query_as::<_, SharingRow>(
            r#"
            INSERT INTO workspace_group_sharing (workspace_id, group_id, access, can_compute)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (workspace_id, group_id) DO UPDATE
            SET
                access = EXCLUDED.access,
                can_compute = EXCLUDED.can_compute,
                modified_at = CASE
                    WHEN workspace_group_sharing.access = EXCLUDED.access
                        AND workspace_group_sharing.can_compute = EXCLUDED.can_compute
                    THEN workspace_group_sharing.modified_at
                    ELSE GREATEST(now(), workspace_group_sharing.modified_at)
                END
            RETURNING workspace_id, group_id, access, can_compute, created_at, modified_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(group_id.as_uuid())
        .bind(grant.access().as_str())
        .bind(grant.can_compute())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save sharing: {error}")))?
        .into_domain()
    }

    async fn delete_sharing(
        &self,
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM workspace_group_sharing
            WHERE workspace_id = $1 AND group_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(group_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete sharing: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
    ) -> AppResult<Option<GroupGroupMembership>> {
        sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT parent_group_id, child_group_id, role, created_at, modified_at
            FROM group_group_memberships
            WHERE parent_group_id = $1 AND child_group_id = $2
            "#,
        )
        .bind(parent_group_id.as_uuid())
        .bind(child_group_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find membership: {error}")))?
        .map(MembershipRow::into_domain)
        .transpose()
    }

    async fn save_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
        role: GroupRole,
    ) -> AppResult<GroupGroupMembership> {
        if parent_group_id == child_group_id {
            return Err(AppError::Validation(format!(
                "group '{parent_group_id}' cannot be a member of itself"
            )));
        }

        sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO group_group_memberships (parent_group_id, child_group_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (parent_group_id, child_group_id) DO UPDATE
            SET
                role = EXCLUDED.role,
                modified_at = CASE
                    WHEN group_group_memberships.role = EXCLUDED.role
                    THEN group_group_memberships.modified_at
                    ELSE GREATEST(now(), group_group_memberships.modified_at)
                END
            RETURNING parent_group_id, child_group_id, role, created_at, modified_at
            "#,
        )
        .bind(parent_group_id.as_uuid())
        .bind(child_group_id.as_uuid())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save membership: {error}")))?
        .into_domain()
    }

    async fn delete_membership(
        &self,
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM group_group_memberships
            WHERE parent_group_id = $1 AND child_group_id = $2
            "#,
        )
        .bind(parent_group_id.as_uuid())
        .bind(child_group_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete membership: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests;
