use chrono::NaiveDate;
use gregor_access_core::{
    AppError, AppResult, ManagedGroupId, NonEmptyString, ResearchCenterId, UploadCycleId,
    WorkspaceId,
};
use serde::{Deserialize, Serialize};

/// Base workspace record shared by every workspace kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    id: WorkspaceId,
    billing_project: NonEmptyString,
    name: NonEmptyString,
    auth_domain_id: Option<ManagedGroupId>,
}

impl Workspace {
    /// Creates a workspace with an optional authorization domain.
    pub fn new(
        id: WorkspaceId,
        billing_project: impl Into<String>,
        name: impl Into<String>,
        auth_domain_id: Option<ManagedGroupId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            billing_project: NonEmptyString::new(billing_project)?,
            name: NonEmptyString::new(name)?,
            auth_domain_id,
        })
    }

    /// Returns the workspace identifier.
    #[must_use]
    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    /// Returns the billing project namespace.
    #[must_use]
    pub fn billing_project(&self) -> &str {
        self.billing_project.as_str()
    }

    /// Returns the workspace name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the authorization domain group, if any.
    #[must_use]
    pub fn auth_domain_id(&self) -> Option<ManagedGroupId> {
        self.auth_domain_id
    }

    /// Returns `billing_project/name`, the identifier used in reports.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.billing_project, self.name)
    }
}

/// Position of an evaluation date relative to an upload cycle window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePhase {
    /// Before the cycle starts.
    Future,
    /// Inside the cycle window, bounds inclusive.
    Current,
    /// After the cycle ends.
    Past,
}

/// Time-boxed upload period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCycle {
    id: UploadCycleId,
    cycle: u32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    date_ready_for_compute: Option<NaiveDate>,
}

impl UploadCycle {
    /// Creates an upload cycle, requiring `start_date < end_date`.
    pub fn new(
        id: UploadCycleId,
        cycle: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        date_ready_for_compute: Option<NaiveDate>,
    ) -> AppResult<Self> {
        if start_date >= end_date {
            return Err(AppError::Validation(format!(
                "upload cycle {cycle} must start before it ends ({start_date} >= {end_date})"
            )));
        }

        Ok(Self {
            id,
            cycle,
            start_date,
            end_date,
            date_ready_for_compute,
        })
    }

    /// Returns the upload cycle identifier.
    #[must_use]
    pub fn id(&self) -> UploadCycleId {
        self.id
    }

    /// Returns the cycle number.
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Returns the first day of the cycle.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the last day of the cycle.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Returns the date compute was enabled, if set.
    #[must_use]
    pub fn date_ready_for_compute(&self) -> Option<NaiveDate> {
        self.date_ready_for_compute
    }

    /// Returns the cycle phase at `as_of`.
    #[must_use]
    pub fn phase(&self, as_of: NaiveDate) -> CyclePhase {
        if as_of < self.start_date {
            CyclePhase::Future
        } else if as_of > self.end_date {
            CyclePhase::Past
        } else {
            CyclePhase::Current
        }
    }

    /// Returns whether compute is enabled at `as_of`.
    #[must_use]
    pub fn is_ready_for_compute(&self, as_of: NaiveDate) -> bool {
        self.date_ready_for_compute
            .is_some_and(|ready_date| ready_date <= as_of)
    }
}

/// Research center owning the RC groups of its upload workspaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchCenter {
    id: ResearchCenterId,
    short_name: NonEmptyString,
    uploader_group_id: Option<ManagedGroupId>,
    member_group_id: Option<ManagedGroupId>,
    non_member_group_id: Option<ManagedGroupId>,
}

impl ResearchCenter {
    /// Creates a research center. Any of its three groups may be absent.
    pub fn new(
        id: ResearchCenterId,
        short_name: impl Into<String>,
        uploader_group_id: Option<ManagedGroupId>,
        member_group_id: Option<ManagedGroupId>,
        non_member_group_id: Option<ManagedGroupId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            short_name: NonEmptyString::new(short_name)?,
            uploader_group_id,
            member_group_id,
            non_member_group_id,
        })
    }

    /// Returns the research center identifier.
    #[must_use]
    pub fn id(&self) -> ResearchCenterId {
        self.id
    }

    /// Returns the short display name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.short_name.as_str()
    }

    /// Returns the uploader group.
    #[must_use]
    pub fn uploader_group_id(&self) -> Option<ManagedGroupId> {
        self.uploader_group_id
    }

    /// Returns the member group.
    #[must_use]
    pub fn member_group_id(&self) -> Option<ManagedGroupId> {
        self.member_group_id
    }

    /// Returns the non-member group.
    #[must_use]
    pub fn non_member_group_id(&self) -> Option<ManagedGroupId> {
        self.non_member_group_id
    }
}

/// Lifecycle of an upload workspace at an evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadLifecycle {
    /// The cycle has not started.
    Future,
    /// Cycle open, compute not yet enabled.
    CurrentBeforeCompute,
    /// Cycle open, compute enabled.
    CurrentAfterCompute,
    /// Cycle closed, QC not completed.
    PastBeforeQc,
    /// QC completed, no complete combined workspace yet.
    PastAfterQc,
    /// A complete combined workspace exists for the cycle.
    PastCombinedReady,
}

impl UploadLifecycle {
    /// Returns whether the combined workspace for the cycle is ready.
    #[must_use]
    pub fn is_combined_ready(&self) -> bool {
        matches!(self, Self::PastCombinedReady)
    }
}

/// Workspace where one research center uploads data for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadWorkspace {
    workspace: Workspace,
    upload_cycle: UploadCycle,
    research_center: ResearchCenter,
    date_qc_completed: Option<NaiveDate>,
}

impl UploadWorkspace {
    /// Creates an upload workspace.
    #[must_use]
    pub fn new(
        workspace: Workspace,
        upload_cycle: UploadCycle,
        research_center: ResearchCenter,
        date_qc_completed: Option<NaiveDate>,
    ) -> Self {
        Self {
            workspace,
            upload_cycle,
            research_center,
            date_qc_completed,
        }
    }

    /// Returns the base workspace.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns the upload cycle.
    #[must_use]
    pub fn upload_cycle(&self) -> &UploadCycle {
        &self.upload_cycle
    }

    /// Returns the owning research center.
    #[must_use]
    pub fn research_center(&self) -> &ResearchCenter {
        &self.research_center
    }

    /// Returns the QC completion date.
    #[must_use]
    pub fn date_qc_completed(&self) -> Option<NaiveDate> {
        self.date_qc_completed
    }

    /// Derives the lifecycle at `as_of`.
    ///
    /// `combined_ready` tells whether a complete combined workspace exists for
    /// the same upload cycle; it only matters once QC is completed.
    #[must_use]
    pub fn lifecycle(&self, as_of: NaiveDate, combined_ready: bool) -> UploadLifecycle {
        match self.upload_cycle.phase(as_of) {
            CyclePhase::Future => UploadLifecycle::Future,
            CyclePhase::Current if self.upload_cycle.is_ready_for_compute(as_of) => {
                UploadLifecycle::CurrentAfterCompute
            }
            CyclePhase::Current => UploadLifecycle::CurrentBeforeCompute,
            CyclePhase::Past if self.date_qc_completed.is_none() => UploadLifecycle::PastBeforeQc,
            CyclePhase::Past if combined_ready => UploadLifecycle::PastCombinedReady,
            CyclePhase::Past => UploadLifecycle::PastAfterQc,
        }
    }
}

/// Lifecycle of a combined consortium data workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinedLifecycle {
    /// `date_completed` is unset.
    BeforeComplete,
    /// `date_completed` is set.
    AfterComplete,
}

/// Workspace aggregating QC'd data for one upload cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedConsortiumDataWorkspace {
    workspace: Workspace,
    upload_cycle_id: UploadCycleId,
    date_completed: Option<NaiveDate>,
}

impl CombinedConsortiumDataWorkspace {
    /// Creates a combined workspace.
    #[must_use]
    pub fn new(
        workspace: Workspace,
        upload_cycle_id: UploadCycleId,
        date_completed: Option<NaiveDate>,
    ) -> Self {
        Self {
            workspace,
            upload_cycle_id,
            date_completed,
        }
    }

    /// Returns the base workspace.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns the upload cycle this workspace combines.
    #[must_use]
    pub fn upload_cycle_id(&self) -> UploadCycleId {
        self.upload_cycle_id
    }

    /// Returns the completion date.
    #[must_use]
    pub fn date_completed(&self) -> Option<NaiveDate> {
        self.date_completed
    }

    /// Returns whether the workspace is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.date_completed.is_some()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> CombinedLifecycle {
        if self.is_complete() {
            CombinedLifecycle::AfterComplete
        } else {
            CombinedLifecycle::BeforeComplete
        }
    }
}

/// Lifecycle of a DCC processed data workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DccProcessedLifecycle {
    /// No complete combined workspace exists for the cycle.
    BeforeCombinedComplete,
    /// A complete combined workspace exists for the cycle.
    AfterCombinedComplete,
}

impl DccProcessedLifecycle {
    /// Derives the lifecycle from the combined workspace readiness.
    #[must_use]
    pub fn from_combined_ready(combined_ready: bool) -> Self {
        if combined_ready {
            Self::AfterCombinedComplete
        } else {
            Self::BeforeCombinedComplete
        }
    }
}

/// Workspace holding DCC-processed data for one upload cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DccProcessedDataWorkspace {
    workspace: Workspace,
    upload_cycle_id: UploadCycleId,
}

impl DccProcessedDataWorkspace {
    /// Creates a DCC processed data workspace.
    #[must_use]
    pub fn new(workspace: Workspace, upload_cycle_id: UploadCycleId) -> Self {
        Self {
            workspace,
            upload_cycle_id,
        }
    }

    /// Returns the base workspace.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns the upload cycle.
    #[must_use]
    pub fn upload_cycle_id(&self) -> UploadCycleId {
        self.upload_cycle_id
    }
}
