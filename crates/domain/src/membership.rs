use chrono::{DateTime, Utc};
use gregor_access_core::{AppError, AppResult, ManagedGroupId};
use serde::{Deserialize, Serialize};

use crate::GroupRole;

/// Directed membership edge: `child` nested inside `parent` with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupGroupMembership {
    parent_group_id: ManagedGroupId,
    child_group_id: ManagedGroupId,
    role: GroupRole,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl GroupGroupMembership {
    /// Rebuilds a persisted membership edge.
    pub fn new(
        parent_group_id: ManagedGroupId,
        child_group_id: ManagedGroupId,
        role: GroupRole,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if parent_group_id == child_group_id {
            return Err(AppError::Validation(format!(
                "group '{parent_group_id}' cannot be a member of itself"
            )));
        }

        Ok(Self {
            parent_group_id,
            child_group_id,
            role,
            created_at,
            modified_at,
        })
    }

    /// Returns the parent group.
    #[must_use]
    pub fn parent_group_id(&self) -> ManagedGroupId {
        self.parent_group_id
    }

    /// Returns the nested child group.
    #[must_use]
    pub fn child_group_id(&self) -> ManagedGroupId {
        self.child_group_id
    }

    /// Returns the child's role inside the parent.
    #[must_use]
    pub fn role(&self) -> GroupRole {
        self.role
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
