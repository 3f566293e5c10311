use std::str::FromStr;

use gregor_access_core::{AppError, AppResult, ManagedGroupId, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Name of the DCC writers group.
pub const DCC_WRITERS_GROUP_NAME: &str = "GREGOR_DCC_WRITERS";

/// Name of the DCC members group.
pub const DCC_MEMBERS_GROUP_NAME: &str = "GREGOR_DCC_MEMBERS";

/// Name of the consortium-wide group.
pub const GREGOR_ALL_GROUP_NAME: &str = "GREGOR_ALL";

/// Default name of the DCC admins group when none is configured.
pub const DEFAULT_DCC_ADMINS_GROUP_NAME: &str = "GREGOR_DCC_ADMINS";

/// Platform groups that audits never evaluate. Matched exactly and case-sensitively.
pub const PLATFORM_RESERVED_GROUP_NAMES: [&str; 2] = ["anvil-admins", "anvil_devs"];

/// Group managed by the consortium on the workspace provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedGroup {
    id: ManagedGroupId,
    name: NonEmptyString,
    email: NonEmptyString,
}

impl ManagedGroup {
    /// Creates a managed group from its stable identity.
    pub fn new(
        id: ManagedGroupId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            email: NonEmptyString::new(email)?,
        })
    }

    /// Returns the group identifier.
    #[must_use]
    pub fn id(&self) -> ManagedGroupId {
        self.id
    }

    /// Returns the unique group name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the group address used by the remote API.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns whether audits must skip this group entirely.
    #[must_use]
    pub fn is_platform_reserved(&self) -> bool {
        PLATFORM_RESERVED_GROUP_NAMES.contains(&self.name())
    }
}

/// Role of a child group inside a parent group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupRole {
    /// Regular member.
    Member,
    /// Admin, which implies membership.
    Admin,
}

impl GroupRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Admin => "ADMIN",
        }
    }

    /// Returns the path segment used by the remote group API.
    #[must_use]
    pub fn api_segment(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for GroupRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "MEMBER" => Ok(Self::Member),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!(
                "unknown group role value '{value}'"
            ))),
        }
    }
}
