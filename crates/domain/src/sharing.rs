use std::str::FromStr;

use chrono::{DateTime, Utc};
use gregor_access_core::{AppError, AppResult, ManagedGroupId, WorkspaceId};
use serde::{Deserialize, Serialize};

/// Workspace access level understood by the workspace provider.
///
/// Ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    /// No access. Only used on the wire; stored grants never carry it.
    #[serde(rename = "NO ACCESS")]
    NoAccess,
    /// Read-only access.
    #[serde(rename = "READER")]
    Reader,
    /// Read and write access.
    #[serde(rename = "WRITER")]
    Writer,
    /// Full ownership.
    #[serde(rename = "OWNER")]
    Owner,
}

impl AccessLevel {
    /// Returns the stable wire and storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAccess => "NO ACCESS",
            Self::Reader => "READER",
            Self::Writer => "WRITER",
            Self::Owner => "OWNER",
        }
    }
}

impl FromStr for AccessLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NO ACCESS" => Ok(Self::NoAccess),
            "READER" => Ok(Self::Reader),
            "WRITER" => Ok(Self::Writer),
            "OWNER" => Ok(Self::Owner),
            _ => Err(AppError::Validation(format!(
                "unknown access level value '{value}'"
            ))),
        }
    }
}

/// Validated (access, can_compute) pair for a stored grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UncheckedSharingGrant")]
pub struct SharingGrant {
    access: AccessLevel,
    can_compute: bool,
}

#[derive(Deserialize)]
struct UncheckedSharingGrant {
    access: AccessLevel,
    can_compute: bool,
}

impl TryFrom<UncheckedSharingGrant> for SharingGrant {
    type Error = AppError;

    fn try_from(unchecked: UncheckedSharingGrant) -> AppResult<Self> {
        Self::new(unchecked.access, unchecked.can_compute)
    }
}

impl SharingGrant {
    /// Creates a grant, rejecting combinations the domain never allows.
    pub fn new(access: AccessLevel, can_compute: bool) -> AppResult<Self> {
        if access == AccessLevel::NoAccess {
            return Err(AppError::Validation(
                "a stored sharing grant cannot have NO ACCESS; delete the grant instead".to_owned(),
            ));
        }

        if can_compute && access == AccessLevel::Reader {
            return Err(AppError::Validation(
                "can_compute requires WRITER or OWNER access".to_owned(),
            ));
        }

        Ok(Self {
            access,
            can_compute,
        })
    }

    /// Read-only grant.
    #[must_use]
    pub const fn reader() -> Self {
        Self {
            access: AccessLevel::Reader,
            can_compute: false,
        }
    }

    /// Write grant without compute.
    #[must_use]
    pub const fn writer() -> Self {
        Self {
            access: AccessLevel::Writer,
            can_compute: false,
        }
    }

    /// Write grant with compute.
    #[must_use]
    pub const fn writer_with_compute() -> Self {
        Self {
            access: AccessLevel::Writer,
            can_compute: true,
        }
    }

    /// Owner grant with compute.
    #[must_use]
    pub const fn owner() -> Self {
        Self {
            access: AccessLevel::Owner,
            can_compute: true,
        }
    }

    /// Returns the access level.
    #[must_use]
    pub fn access(&self) -> AccessLevel {
        self.access
    }

    /// Returns whether compute is allowed.
    #[must_use]
    pub fn can_compute(&self) -> bool {
        self.can_compute
    }
}

/// Persisted sharing of one workspace with one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceGroupSharing {
    workspace_id: WorkspaceId,
    group_id: ManagedGroupId,
    grant: SharingGrant,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl WorkspaceGroupSharing {
    /// Rebuilds a persisted sharing record.
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        group_id: ManagedGroupId,
        grant: SharingGrant,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            workspace_id,
            group_id,
            grant,
            created_at,
            modified_at,
        }
    }

    /// Returns the shared workspace.
    #[must_use]
    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    /// Returns the group the workspace is shared with.
    #[must_use]
    pub fn group_id(&self) -> ManagedGroupId {
        self.group_id
    }

    /// Returns the validated grant.
    #[must_use]
    pub fn grant(&self) -> SharingGrant {
        self.grant
    }

    /// Returns the access level.
    #[must_use]
    pub fn access(&self) -> AccessLevel {
        self.grant.access()
    }

    /// Returns whether compute is allowed.
    #[must_use]
    pub fn can_compute(&self) -> bool {
        self.grant.can_compute()
    }

    /// Creation timestamp assigned by the store.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp assigned by the store.
    #[must_use]
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}
