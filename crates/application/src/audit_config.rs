use chrono::{NaiveDate, Utc};
use gregor_access_core::{AppResult, NonEmptyString};
use gregor_access_domain::DEFAULT_DCC_ADMINS_GROUP_NAME;

/// Settings every audit receives explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    dcc_admins_group_name: String,
    as_of: NaiveDate,
}

impl AuditConfig {
    /// Creates a configuration with a custom DCC admins group and evaluation date.
    pub fn new(dcc_admins_group_name: impl Into<String>, as_of: NaiveDate) -> AppResult<Self> {
        Ok(Self {
            dcc_admins_group_name: NonEmptyString::new(dcc_admins_group_name)?.into(),
            as_of,
        })
    }

    /// Returns a copy evaluated at another date.
    #[must_use]
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    /// Returns the configured DCC admins group name.
    #[must_use]
    pub fn dcc_admins_group_name(&self) -> &str {
        self.dcc_admins_group_name.as_str()
    }

    /// Returns the date lifecycle states are evaluated at.
    #[must_use]
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            dcc_admins_group_name: DEFAULT_DCC_ADMINS_GROUP_NAME.to_owned(),
            as_of: Utc::now().date_naive(),
        }
    }
}
