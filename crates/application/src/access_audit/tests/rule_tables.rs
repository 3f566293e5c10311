use gregor_access_domain::{
    AccessLevel, CombinedLifecycle, DccProcessedLifecycle, GroupRole, SharingGrant,
    UploadLifecycle,
};

use super::super::combined_workspace::{combined_auth_domain_rule, combined_sharing_rule};
use super::super::dcc_processed_workspace::{
    dcc_processed_auth_domain_rule, dcc_processed_sharing_rule,
};
use super::super::decision::{MembershipRule, SharingRule};
use super::super::upload_workspace::{upload_auth_domain_rule, upload_sharing_rule};
use crate::{
    CombinedWorkspaceAuthDomainNote, CombinedWorkspaceSharingNote,
    DccProcessedWorkspaceAuthDomainNote, DccProcessedWorkspaceSharingNote, GroupClass,
    UploadWorkspaceAuthDomainNote, UploadWorkspaceSharingNote,
};

const CLASSES: [GroupClass; 9] = [
    GroupClass::RcUploaders,
    GroupClass::RcMembers,
    GroupClass::RcNonMembers,
    GroupClass::DccAdmins,
    GroupClass::DccWriters,
    GroupClass::DccMembers,
    GroupClass::GregorAll,
    GroupClass::AuthDomain,
    GroupClass::Other,
];

const UPLOAD_LIFECYCLES: [UploadLifecycle; 6] = [
    UploadLifecycle::Future,
    UploadLifecycle::CurrentBeforeCompute,
    UploadLifecycle::CurrentAfterCompute,
    UploadLifecycle::PastBeforeQc,
    UploadLifecycle::PastAfterQc,
    UploadLifecycle::PastCombinedReady,
];

const COMBINED_LIFECYCLES: [CombinedLifecycle; 2] =
    [CombinedLifecycle::BeforeComplete, CombinedLifecycle::AfterComplete];

const DCC_PROCESSED_LIFECYCLES: [DccProcessedLifecycle; 2] = [
    DccProcessedLifecycle::BeforeCombinedComplete,
    DccProcessedLifecycle::AfterCombinedComplete,
];

const WRITER: AccessLevel = AccessLevel::Writer;
const MEMBER: GroupRole = GroupRole::Member;
const ADMIN: GroupRole = GroupRole::Admin;

/// Expected upload sharing rules, one per entry of `UPLOAD_LIFECYCLES`.
fn upload_sharing_row(class: GroupClass) -> [SharingRule<UploadWorkspaceSharingNote>; 6] {
    use UploadWorkspaceSharingNote as N;

    let writers = SharingGrant::writer_with_compute();
    match class {
        GroupClass::RcUploaders => [
            SharingRule::not_shared(Some(WRITER), N::RcUploadersFutureCycle),
            SharingRule::share(
                SharingGrant::writer(),
                WRITER,
                N::RcUploadersCurrentCycleBeforeCompute,
            ),
            SharingRule::share(writers, WRITER, N::RcUploadersCurrentCycleAfterCompute),
            SharingRule::not_shared(Some(WRITER), N::RcUploadersPastCycleBeforeQcComplete),
            SharingRule::not_shared(Some(WRITER), N::RcUploadersPastCycleAfterQcComplete),
            SharingRule::not_shared(
                Some(WRITER),
                N::RcUploadersPastCycleCombinedWorkspaceReady,
            ),
        ],
        GroupClass::DccWriters => [
            SharingRule::share(writers, WRITER, N::DccWritersFutureCycle),
            SharingRule::share(writers, WRITER, N::DccWritersCurrentCycle),
            SharingRule::share(writers, WRITER, N::DccWritersCurrentCycle),
            SharingRule::share(writers, WRITER, N::DccWritersPastCycleBeforeQcComplete),
            SharingRule::share(writers, WRITER, N::DccWritersPastCycleAfterQcComplete),
            SharingRule::not_shared(Some(WRITER), N::DccWritersPastCycleCombinedWorkspaceReady),
        ],
        GroupClass::DccAdmins => [SharingRule::share(
            SharingGrant::owner(),
            AccessLevel::Owner,
            N::DccAdminAsOwner,
        ); 6],
        GroupClass::AuthDomain => [SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Owner,
            N::AuthDomainAsReader,
        ); 6],
        GroupClass::RcMembers
        | GroupClass::RcNonMembers
        | GroupClass::DccMembers
        | GroupClass::GregorAll
        | GroupClass::Other => [SharingRule::not_shared(None, N::OtherGroupNoAccess); 6],
    }
}

/// Expected upload auth domain rules, one per entry of `UPLOAD_LIFECYCLES`.
fn upload_auth_domain_row(
    class: GroupClass,
) -> [MembershipRule<UploadWorkspaceAuthDomainNote>; 6] {
    use UploadWorkspaceAuthDomainNote as N;

    let future = MembershipRule::not_member(Some(MEMBER), N::RcFutureCycle);
    match class {
        GroupClass::RcUploaders => {
            let before_qc = MembershipRule::member(MEMBER, MEMBER, N::RcUploadersBeforeQc);
            let after_qc = MembershipRule::not_member(Some(MEMBER), N::RcUploadersAfterQc);
            [future, before_qc, before_qc, before_qc, after_qc, after_qc]
        }
        GroupClass::RcMembers => {
            let before = MembershipRule::member(MEMBER, MEMBER, N::RcMembersBeforeCombined);
            let after = MembershipRule::not_member(Some(MEMBER), N::RcMembersAfterCombined);
            [future, before, before, before, before, after]
        }
        GroupClass::RcNonMembers => {
            let started = MembershipRule::member(MEMBER, MEMBER, N::RcNonMembersAfterStart);
            [future, started, started, started, started, started]
        }
        GroupClass::DccAdmins => [MembershipRule::member(ADMIN, ADMIN, N::DccAdmins); 6],
        GroupClass::DccWriters | GroupClass::DccMembers => {
            let before = MembershipRule::member(MEMBER, MEMBER, N::DccBeforeCombined);
            let after = MembershipRule::not_member(Some(MEMBER), N::DccAfterCombined);
            [before, before, before, before, before, after]
        }
        GroupClass::GregorAll => {
            let before = MembershipRule::not_member(None, N::GregorAllBeforeCombined);
            let after = MembershipRule::member(MEMBER, MEMBER, N::GregorAllAfterCombined);
            [before, before, before, before, before, after]
        }
        GroupClass::AuthDomain | GroupClass::Other => {
            [MembershipRule::not_member(None, N::OtherGroup); 6]
        }
    }
}

/// Expected combined sharing rules, before and after completion.
fn combined_sharing_row(class: GroupClass) -> [SharingRule<CombinedWorkspaceSharingNote>; 2] {
    use CombinedWorkspaceSharingNote as N;

    let reader = SharingGrant::reader();
    match class {
        GroupClass::DccAdmins => {
            [SharingRule::share(SharingGrant::owner(), AccessLevel::Owner, N::DccAdminAsOwner); 2]
        }
        GroupClass::DccWriters => [
            SharingRule::share(
                SharingGrant::writer_with_compute(),
                WRITER,
                N::DccWritersBeforeComplete,
            ),
            SharingRule::not_shared(Some(WRITER), N::DccWritersAfterComplete),
        ],
        GroupClass::DccMembers => [
            SharingRule::share(reader, AccessLevel::Reader, N::DccMembersBeforeComplete),
            SharingRule::not_shared(Some(AccessLevel::Reader), N::DccMembersAfterComplete),
        ],
        GroupClass::GregorAll => [
            SharingRule::not_shared(None, N::GregorAllBeforeComplete),
            SharingRule::share(reader, AccessLevel::Reader, N::GregorAllAfterComplete),
        ],
        GroupClass::AuthDomain => [
            SharingRule::not_shared(None, N::AuthDomainBeforeComplete),
            SharingRule::share(reader, AccessLevel::Reader, N::AuthDomainAfterComplete),
        ],
        GroupClass::RcUploaders
        | GroupClass::RcMembers
        | GroupClass::RcNonMembers
        | GroupClass::Other => [SharingRule::not_shared(None, N::OtherGroupNoAccess); 2],
    }
}

/// Expected combined auth domain rules, before and after completion.
fn combined_auth_domain_row(
    class: GroupClass,
) -> [MembershipRule<CombinedWorkspaceAuthDomainNote>; 2] {
    use CombinedWorkspaceAuthDomainNote as N;

    match class {
        GroupClass::DccAdmins => [MembershipRule::member(ADMIN, ADMIN, N::DccAdmins); 2],
        GroupClass::DccWriters | GroupClass::DccMembers => [
            MembershipRule::member(MEMBER, MEMBER, N::DccBeforeComplete),
            MembershipRule::not_member(Some(MEMBER), N::DccAfterComplete),
        ],
        GroupClass::GregorAll => [
            MembershipRule::not_member(None, N::GregorAllBeforeComplete),
            MembershipRule::member(MEMBER, MEMBER, N::GregorAllAfterComplete),
        ],
        GroupClass::RcUploaders
        | GroupClass::RcMembers
        | GroupClass::RcNonMembers
        | GroupClass::AuthDomain
        | GroupClass::Other => [MembershipRule::not_member(None, N::OtherGroup); 2],
    }
}

/// Expected DCC processed sharing rules, before and after the combined
/// workspace completes.
fn dcc_processed_sharing_row(
    class: GroupClass,
) -> [SharingRule<DccProcessedWorkspaceSharingNote>; 2] {
    use DccProcessedWorkspaceSharingNote as N;

    match class {
        GroupClass::DccAdmins => {
            [SharingRule::share(SharingGrant::owner(), AccessLevel::Owner, N::DccAdminAsOwner); 2]
        }
        GroupClass::DccWriters => [
            SharingRule::share(
                SharingGrant::writer_with_compute(),
                WRITER,
                N::DccWritersBeforeCombined,
            ),
            SharingRule::not_shared(Some(WRITER), N::DccWritersAfterCombined),
        ],
        GroupClass::DccMembers => [
            SharingRule::share(
                SharingGrant::reader(),
                AccessLevel::Reader,
                N::DccMembersBeforeCombined,
            ),
            SharingRule::not_shared(Some(AccessLevel::Reader), N::DccMembersAfterCombined),
        ],
        GroupClass::AuthDomain => [SharingRule::share(
            SharingGrant::reader(),
            AccessLevel::Reader,
            N::AuthDomainAsReader,
        ); 2],
        GroupClass::RcUploaders
        | GroupClass::RcMembers
        | GroupClass::RcNonMembers
        | GroupClass::GregorAll
        | GroupClass::Other => [SharingRule::not_shared(None, N::OtherGroupNoAccess); 2],
    }
}

/// Expected DCC processed auth domain rules, before and after the combined
/// workspace completes.
fn dcc_processed_auth_domain_row(
    class: GroupClass,
    current_role: Option<GroupRole>,
) -> [MembershipRule<DccProcessedWorkspaceAuthDomainNote>; 2] {
    use DccProcessedWorkspaceAuthDomainNote as N;

    match class {
        GroupClass::DccAdmins => [MembershipRule::member(ADMIN, ADMIN, N::DccAdmins); 2],
        GroupClass::DccWriters | GroupClass::DccMembers => [
            MembershipRule::member(MEMBER, MEMBER, N::DccBeforeCombined),
            MembershipRule::not_member(Some(MEMBER), N::DccAfterCombined),
        ],
        GroupClass::GregorAll => {
            [MembershipRule::unchanged(current_role, N::GregorAllUndetermined); 2]
        }
        GroupClass::RcUploaders
        | GroupClass::RcMembers
        | GroupClass::RcNonMembers
        | GroupClass::AuthDomain
        | GroupClass::Other => [MembershipRule::not_member(None, N::OtherGroup); 2],
    }
}

#[test]
fn upload_sharing_table_matches_every_cell() {
    for class in CLASSES {
        for (lifecycle, expected) in UPLOAD_LIFECYCLES.into_iter().zip(upload_sharing_row(class)) {
            assert_eq!(
                upload_sharing_rule(class, lifecycle),
                expected,
                "{class:?} in {lifecycle:?}"
            );
        }
    }
}

#[test]
fn upload_auth_domain_table_matches_every_cell() {
    for class in CLASSES {
        for (lifecycle, expected) in UPLOAD_LIFECYCLES
            .into_iter()
            .zip(upload_auth_domain_row(class))
        {
            assert_eq!(
                upload_auth_domain_rule(class, lifecycle),
                expected,
                "{class:?} in {lifecycle:?}"
            );
        }
    }
}

#[test]
fn combined_sharing_table_matches_every_cell() {
    for class in CLASSES {
        for (lifecycle, expected) in COMBINED_LIFECYCLES
            .into_iter()
            .zip(combined_sharing_row(class))
        {
            assert_eq!(
                combined_sharing_rule(class, lifecycle),
                expected,
                "{class:?} in {lifecycle:?}"
            );
        }
    }
}

#[test]
fn combined_auth_domain_table_matches_every_cell() {
    for class in CLASSES {
        for (lifecycle, expected) in COMBINED_LIFECYCLES
            .into_iter()
            .zip(combined_auth_domain_row(class))
        {
            assert_eq!(
                combined_auth_domain_rule(class, lifecycle),
                expected,
                "{class:?} in {lifecycle:?}"
            );
        }
    }
}

#[test]
fn dcc_processed_sharing_table_matches_every_cell() {
    for class in CLASSES {
        for (lifecycle, expected) in DCC_PROCESSED_LIFECYCLES
            .into_iter()
            .zip(dcc_processed_sharing_row(class))
        {
            assert_eq!(
                dcc_processed_sharing_rule(class, lifecycle),
                expected,
                "{class:?} in {lifecycle:?}"
            );
        }
    }
}

#[test]
fn dcc_processed_auth_domain_table_matches_every_cell() {
    for current_role in [None, Some(MEMBER), Some(ADMIN)] {
        for class in CLASSES {
            for (lifecycle, expected) in DCC_PROCESSED_LIFECYCLES
                .into_iter()
                .zip(dcc_processed_auth_domain_row(class, current_role))
            {
                assert_eq!(
                    dcc_processed_auth_domain_rule(class, lifecycle, current_role),
                    expected,
                    "{class:?} in {lifecycle:?} with {current_role:?}"
                );
            }
        }
    }
}
