//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod group;
mod membership;
mod sharing;
mod workspace;

pub use group::{
    DCC_MEMBERS_GROUP_NAME, DCC_WRITERS_GROUP_NAME, DEFAULT_DCC_ADMINS_GROUP_NAME,
    GREGOR_ALL_GROUP_NAME, GroupRole, ManagedGroup, PLATFORM_RESERVED_GROUP_NAMES,
};
pub use membership::GroupGroupMembership;
pub use sharing::{AccessLevel, SharingGrant, WorkspaceGroupSharing};
pub use workspace::{
    CombinedConsortiumDataWorkspace, CombinedLifecycle, CyclePhase, DccProcessedDataWorkspace,
    DccProcessedLifecycle, ResearchCenter, UploadCycle, UploadLifecycle, UploadWorkspace,
    Workspace,
};
