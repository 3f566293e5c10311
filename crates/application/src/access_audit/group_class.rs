use gregor_access_core::ManagedGroupId;
use gregor_access_domain::{
    DCC_MEMBERS_GROUP_NAME, DCC_WRITERS_GROUP_NAME, GREGOR_ALL_GROUP_NAME, ManagedGroup,
    ResearchCenter, Workspace,
};

use crate::AuditConfig;

/// Role a group plays relative to one audited workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupClass {
    /// Research center uploader group.
    RcUploaders,
    /// Research center member group.
    RcMembers,
    /// Research center non-member group.
    RcNonMembers,
    /// Configured DCC admins group.
    DccAdmins,
    /// `GREGOR_DCC_WRITERS`.
    DccWriters,
    /// `GREGOR_DCC_MEMBERS`.
    DccMembers,
    /// `GREGOR_ALL`.
    GregorAll,
    /// The workspace's own authorization domain.
    AuthDomain,
    /// Anything else.
    Other,
}

/// Facts about the audited workspace needed to classify a group.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GroupContext<'a> {
    dcc_admins_group_name: &'a str,
    auth_domain_id: Option<ManagedGroupId>,
    research_center: Option<&'a ResearchCenter>,
}

impl<'a> GroupContext<'a> {
    pub(crate) fn new(config: &'a AuditConfig, workspace: &Workspace) -> Self {
        Self {
            dcc_admins_group_name: config.dcc_admins_group_name(),
            auth_domain_id: workspace.auth_domain_id(),
            research_center: None,
        }
    }

    pub(crate) fn with_research_center(mut self, research_center: &'a ResearchCenter) -> Self {
        self.research_center = Some(research_center);
        self
    }
}

impl GroupClass {
    /// Classifies `group`, returning `None` for platform-reserved groups.
    ///
    /// Research center groups are matched first, then the DCC groups, then
    /// the authorization domain.
    pub(crate) fn classify(group: &ManagedGroup, context: &GroupContext<'_>) -> Option<Self> {
        if group.is_platform_reserved() {
            return None;
        }

        let group_id = Some(group.id());
        if let Some(research_center) = context.research_center {
            if group_id == research_center.uploader_group_id() {
                return Some(Self::RcUploaders);
            }
            if group_id == research_center.member_group_id() {
                return Some(Self::RcMembers);
            }
            if group_id == research_center.non_member_group_id() {
                return Some(Self::RcNonMembers);
            }
        }

        let class = match group.name() {
            name if name == context.dcc_admins_group_name => Self::DccAdmins,
            DCC_WRITERS_GROUP_NAME => Self::DccWriters,
            DCC_MEMBERS_GROUP_NAME => Self::DccMembers,
            GREGOR_ALL_GROUP_NAME => Self::GregorAll,
            _ if group_id == context.auth_domain_id => Self::AuthDomain,
            _ => Self::Other,
        };

        Some(class)
    }
}
