use gregor_access_core::UploadCycleId;
use gregor_access_domain::{GroupRole, SharingGrant};

use super::{Fixture, classify, date};
use crate::{
    AuditBucket, CombinedWorkspaceAuthDomainAudit, CombinedWorkspaceAuthDomainNote,
    CombinedWorkspaceSharingAudit, CombinedWorkspaceSharingNote, MembershipAuditAction,
    SharingAuditAction,
};

#[tokio::test]
async fn auth_domain_reading_incomplete_workspace_is_an_error() {
    let fixture = Fixture::new().await;
    let (combined, auth_domain) = fixture.combined_workspace(UploadCycleId::new(), None).await;
    fixture
        .share(combined.workspace(), &auth_domain, SharingGrant::reader())
        .await;
    let audit = CombinedWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &combined, &auth_domain).await;

    assert_eq!(classified.bucket, AuditBucket::Error);
    assert_eq!(classified.result.action(), SharingAuditAction::StopSharing);
    assert_eq!(
        classified.result.note(),
        CombinedWorkspaceSharingNote::AuthDomainBeforeComplete
    );
}

#[tokio::test]
async fn complete_workspace_is_shared_with_gregor_all() {
    let fixture = Fixture::new().await;
    let (combined, auth_domain) = fixture
        .combined_workspace(UploadCycleId::new(), Some(date(2025, 2, 1)))
        .await;
    fixture
        .share(combined.workspace(), &auth_domain, SharingGrant::reader())
        .await;
    let audit = CombinedWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &combined, &fixture.gregor_all).await;
    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::ShareAsReader);
    assert_eq!(
        classified.result.note(),
        CombinedWorkspaceSharingNote::GregorAllAfterComplete
    );

    let classified = classify(&audit, &combined, &auth_domain).await;
    assert_eq!(classified.bucket, AuditBucket::Verified);
    assert_eq!(classified.result.action(), SharingAuditAction::VerifiedShared);
}

#[tokio::test]
async fn dcc_members_read_until_complete() {
    let fixture = Fixture::new().await;
    let (combined, _) = fixture.combined_workspace(UploadCycleId::new(), None).await;
    let audit = CombinedWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &combined, &fixture.dcc_members).await;

    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::ShareAsReader);
    assert_eq!(
        classified.result.note(),
        CombinedWorkspaceSharingNote::DccMembersBeforeComplete
    );
}

#[tokio::test]
async fn dcc_writers_above_ceiling_after_complete_is_an_error() {
    let fixture = Fixture::new().await;
    let (combined, _) = fixture
        .combined_workspace(UploadCycleId::new(), Some(date(2025, 2, 1)))
        .await;
    fixture
        .share(combined.workspace(), &fixture.dcc_writers, SharingGrant::owner())
        .await;
    let audit = CombinedWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &combined, &fixture.dcc_writers).await;

    assert_eq!(classified.bucket, AuditBucket::Error);
    assert_eq!(classified.result.action(), SharingAuditAction::StopSharing);
    assert_eq!(
        classified.result.note(),
        CombinedWorkspaceSharingNote::DccWritersAfterComplete
    );
}

#[tokio::test]
async fn dcc_groups_leave_auth_domain_after_complete() {
    let fixture = Fixture::new().await;
    let (combined, auth_domain) = fixture
        .combined_workspace(UploadCycleId::new(), Some(date(2025, 2, 1)))
        .await;
    fixture
        .add_member(&auth_domain, &fixture.dcc_writers, GroupRole::Member)
        .await;
    let audit = CombinedWorkspaceAuthDomainAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &combined, &fixture.dcc_writers).await;
    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), MembershipAuditAction::Remove);
    assert_eq!(
        classified.result.note(),
        CombinedWorkspaceAuthDomainNote::DccAfterComplete
    );

    let classified = classify(&audit, &combined, &fixture.gregor_all).await;
    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), MembershipAuditAction::AddMember);
    assert_eq!(
        classified.result.note(),
        CombinedWorkspaceAuthDomainNote::GregorAllAfterComplete
    );
}

#[tokio::test]
async fn gregor_all_in_incomplete_auth_domain_is_an_error() {
    let fixture = Fixture::new().await;
    let (combined, auth_domain) = fixture.combined_workspace(UploadCycleId::new(), None).await;
    fixture
        .add_member(&auth_domain, &fixture.gregor_all, GroupRole::Member)
        .await;
    fixture
        .add_member(&auth_domain, &fixture.dcc_admins, GroupRole::Admin)
        .await;
    let audit = CombinedWorkspaceAuthDomainAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &combined, &fixture.gregor_all).await;
    assert_eq!(classified.bucket, AuditBucket::Error);
    assert_eq!(classified.result.action(), MembershipAuditAction::Remove);

    let classified = classify(&audit, &combined, &fixture.dcc_admins).await;
    assert_eq!(classified.bucket, AuditBucket::Verified);
    assert_eq!(classified.result.action(), MembershipAuditAction::VerifiedAdmin);
    assert_eq!(classified.result.note(), CombinedWorkspaceAuthDomainNote::DccAdmins);
}
