use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use gregor_access_core::{
    AppError, AppResult, ManagedGroupId, ResearchCenterId, UploadCycleId, WorkspaceId,
};
use gregor_access_domain::{
    AccessLevel, CombinedConsortiumDataWorkspace, DccProcessedDataWorkspace, GroupGroupMembership,
    GroupRole, ManagedGroup, ResearchCenter, SharingGrant, UploadCycle, UploadWorkspace,
    Workspace, WorkspaceGroupSharing,
};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(super) struct ManagedGroupRow {
    id: Uuid,
    name: String,
    email: String,
}

impl ManagedGroupRow {
    pub(super) fn into_domain(self) -> AppResult<ManagedGroup> {
        ManagedGroup::new(ManagedGroupId::from_uuid(self.id), self.name, self.email)
    }
}

fn workspace(
    id: Uuid,
    billing_project: String,
    name: String,
    auth_domain_id: Option<Uuid>,
) -> AppResult<Workspace> {
    Workspace::new(
        WorkspaceId::from_uuid(id),
        billing_project,
        name,
        auth_domain_id.map(ManagedGroupId::from_uuid),
    )
}

#[derive(Debug, FromRow)]
pub(super) struct UploadWorkspaceRow {
    workspace_id: Uuid,
    billing_project: String,
    workspace_name: String,
    auth_domain_id: Option<Uuid>,
    upload_cycle_id: Uuid,
    cycle: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    date_ready_for_compute: Option<NaiveDate>,
    research_center_id: Uuid,
    short_name: String,
    uploader_group_id: Option<Uuid>,
    member_group_id: Option<Uuid>,
    non_member_group_id: Option<Uuid>,
    date_qc_completed: Option<NaiveDate>,
}

impl UploadWorkspaceRow {
    pub(super) fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }

    pub(super) fn into_domain(self) -> AppResult<UploadWorkspace> {
        let cycle = u32::try_from(self.cycle).map_err(|error| {
            AppError::Internal(format!("invalid stored upload cycle {}: {error}", self.cycle))
        })?;
        let upload_cycle = UploadCycle::new(
            UploadCycleId::from_uuid(self.upload_cycle_id),
            cycle,
            self.start_date,
            self.end_date,
            self.date_ready_for_compute,
        )?;
        let research_center = ResearchCenter::new(
            ResearchCenterId::from_uuid(self.research_center_id),
            self.short_name,
            self.uploader_group_id.map(ManagedGroupId::from_uuid),
            self.member_group_id.map(ManagedGroupId::from_uuid),
            self.non_member_group_id.map(ManagedGroupId::from_uuid),
        )?;

        Ok(UploadWorkspace::new(
            workspace(
                self.workspace_id,
                self.billing_project,
                self.workspace_name,
                self.auth_domain_id,
            )?,
            upload_cycle,
            research_center,
            self.date_qc_completed,
        ))
    }
}

#[derive(Debug, FromRow)]
pub(super) struct CombinedWorkspaceRow {
    workspace_id: Uuid,
    billing_project: String,
    workspace_name: String,
    auth_domain_id: Option<Uuid>,
    upload_cycle_id: Uuid,
    date_completed: Option<NaiveDate>,
}

impl CombinedWorkspaceRow {
    pub(super) fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }

    pub(super) fn into_domain(self) -> AppResult<CombinedConsortiumDataWorkspace> {
        Ok(CombinedConsortiumDataWorkspace::new(
            workspace(
                self.workspace_id,
                self.billing_project,
                self.workspace_name,
                self.auth_domain_id,
            )?,
            UploadCycleId::from_uuid(self.upload_cycle_id),
            self.date_completed,
        ))
    }
}

#[derive(Debug, FromRow)]
pub(super) struct DccProcessedWorkspaceRow {
    workspace_id: Uuid,
    billing_project: String,
    workspace_name: String,
    auth_domain_id: Option<Uuid>,
    upload_cycle_id: Uuid,
}

impl DccProcessedWorkspaceRow {
    pub(super) fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }

    pub(super) fn into_domain(self) -> AppResult<DccProcessedDataWorkspace> {
        Ok(DccProcessedDataWorkspace::new(
            workspace(
                self.workspace_id,
                self.billing_project,
                self.workspace_name,
                self.auth_domain_id,
            )?,
            UploadCycleId::from_uuid(self.upload_cycle_id),
        ))
    }
}

#[derive(Debug, FromRow)]
pub(super) struct SharingRow {
    workspace_id: Uuid,
    group_id: Uuid,
    access: String,
    can_compute: bool,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl SharingRow {
    pub(super) fn into_domain(self) -> AppResult<WorkspaceGroupSharing> {
        let grant = SharingGrant::new(AccessLevel::from_str(&self.access)?, self.can_compute)?;

        Ok(WorkspaceGroupSharing::new(
            WorkspaceId::from_uuid(self.workspace_id),
            ManagedGroupId::from_uuid(self.group_id),
            grant,
            self.created_at,
            self.modified_at,
        ))
    }
}

#[derive(Debug, FromRow)]
pub(super) struct MembershipRow {
    parent_group_id: Uuid,
    child_group_id: Uuid,
    role: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl MembershipRow {
    pub(super) fn into_domain(self) -> AppResult<GroupGroupMembership> {
        GroupGroupMembership::new(
            ManagedGroupId::from_uuid(self.parent_group_id),
            ManagedGroupId::from_uuid(self.child_group_id),
            GroupRole::from_str(&self.role)?,
            self.created_at,
            self.modified_at,
        )
    }
}
