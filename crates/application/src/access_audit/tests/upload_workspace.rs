use gregor_access_domain::{GroupRole, SharingGrant};

use super::{Fixture, classify, current_cycle, date, future_cycle, past_cycle};
use crate::{
    AuditBucket, MembershipAuditAction, SharingAuditAction, UploadWorkspaceAuthDomainAudit,
    UploadWorkspaceAuthDomainNote, UploadWorkspaceSharingAudit, UploadWorkspaceSharingNote,
};

#[tokio::test]
async fn unshared_auth_domain_needs_reader_grant() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", future_cycle(), None).await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &setup.auth_domain).await;

    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::ShareAsReader);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::AuthDomainAsReader
    );
}

#[tokio::test]
async fn auth_domain_shared_as_owner_is_downgraded_to_reader() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", future_cycle(), None).await;
    fixture
        .share(setup.workspace(), &setup.auth_domain, SharingGrant::owner())
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &setup.auth_domain).await;

    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::ShareAsReader);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::AuthDomainAsReader
    );
}

#[tokio::test]
async fn dcc_writers_with_compute_in_current_cycle_are_verified() {
    let fixture = Fixture::new().await;
    let setup = fixture
        .upload_workspace("RC1", current_cycle(Some(date(2025, 2, 1))), None)
        .await;
    fixture
        .share(setup.workspace(), &fixture.dcc_writers, SharingGrant::writer_with_compute())
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &fixture.dcc_writers).await;

    assert_eq!(classified.bucket, AuditBucket::Verified);
    assert_eq!(classified.result.action(), SharingAuditAction::VerifiedShared);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::DccWritersCurrentCycle
    );
}

#[tokio::test]
async fn uploaders_owning_future_workspace_is_an_error() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", future_cycle(), None).await;
    fixture
        .share(setup.workspace(), &setup.uploaders, SharingGrant::owner())
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &setup.uploaders).await;

    assert_eq!(classified.bucket, AuditBucket::Error);
    assert_eq!(classified.result.action(), SharingAuditAction::StopSharing);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::RcUploadersFutureCycle
    );
}

#[tokio::test]
async fn uploaders_writing_future_workspace_needs_action() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", future_cycle(), None).await;
    fixture
        .share(setup.workspace(), &setup.uploaders, SharingGrant::writer())
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &setup.uploaders).await;

    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::StopSharing);
}

#[tokio::test]
async fn uploaders_gain_compute_when_cycle_becomes_ready() {
    let fixture = Fixture::new().await;
    let before = fixture
        .upload_workspace("RC1", current_cycle(None), None)
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &before.upload, &before.uploaders).await;
    assert_eq!(classified.result.action(), SharingAuditAction::ShareAsWriter);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::RcUploadersCurrentCycleBeforeCompute
    );

    let after = fixture
        .upload_workspace("RC2", current_cycle(Some(date(2025, 3, 15))), None)
        .await;
    fixture
        .share(after.workspace(), &after.uploaders, SharingGrant::writer())
        .await;

    let classified = classify(&audit, &after.upload, &after.uploaders).await;
    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::ShareWithCompute);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::RcUploadersCurrentCycleAfterCompute
    );
}

#[tokio::test]
async fn dcc_admins_need_owner_with_compute() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", past_cycle(), None).await;
    fixture
        .share(setup.workspace(), &fixture.dcc_admins, SharingGrant::writer())
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &fixture.dcc_admins).await;

    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::ShareAsOwner);
    assert_eq!(classified.result.note(), UploadWorkspaceSharingNote::DccAdminAsOwner);
}

#[tokio::test]
async fn dcc_writers_lose_access_once_combined_workspace_is_ready() {
    let fixture = Fixture::new().await;
    let cycle = past_cycle();
    let setup = fixture
        .upload_workspace("RC1", cycle.clone(), Some(date(2024, 12, 15)))
        .await;
    fixture
        .combined_workspace(cycle.id(), Some(date(2025, 1, 10)))
        .await;
    fixture
        .share(setup.workspace(), &fixture.dcc_writers, SharingGrant::writer_with_compute())
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &fixture.dcc_writers).await;

    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), SharingAuditAction::StopSharing);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::DccWritersPastCycleCombinedWorkspaceReady
    );
}

#[tokio::test]
async fn incomplete_combined_workspace_keeps_writers() {
    let fixture = Fixture::new().await;
    let cycle = past_cycle();
    let setup = fixture
        .upload_workspace("RC1", cycle.clone(), Some(date(2024, 12, 15)))
        .await;
    fixture.combined_workspace(cycle.id(), None).await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &fixture.dcc_writers).await;

    assert_eq!(classified.result.action(), SharingAuditAction::ShareWithCompute);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceSharingNote::DccWritersPastCycleAfterQcComplete
    );
}

#[tokio::test]
async fn any_grant_to_other_groups_is_an_error() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", past_cycle(), None).await;
    let outsider = fixture.group("SOMEONE_ELSE").await;
    fixture
        .share(setup.workspace(), &outsider, SharingGrant::reader())
        .await;
    fixture
        .share(setup.workspace(), &setup.members, SharingGrant::reader())
        .await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    for group in [&outsider, &setup.members] {
        let classified = classify(&audit, &setup.upload, group).await;
        assert_eq!(classified.bucket, AuditBucket::Error);
        assert_eq!(classified.result.action(), SharingAuditAction::StopSharing);
        assert_eq!(classified.result.note(), UploadWorkspaceSharingNote::OtherGroupNoAccess);
    }

    let classified = classify(&audit, &setup.upload, &fixture.gregor_all).await;
    assert_eq!(classified.bucket, AuditBucket::Verified);
    assert_eq!(classified.result.action(), SharingAuditAction::VerifiedNotShared);
}

#[tokio::test]
async fn reserved_groups_are_never_classified() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", past_cycle(), None).await;
    let reserved = fixture.group("anvil-admins").await;
    let audit = UploadWorkspaceSharingAudit::new(fixture.store(), fixture.config.clone());

    let classified = crate::AccessAudit::classify(&audit, &setup.upload, &reserved).await;

    assert!(matches!(classified, Ok(None)));
}

#[tokio::test]
async fn dcc_admins_are_auth_domain_admins() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", future_cycle(), None).await;
    fixture
        .add_member(&setup.auth_domain, &fixture.dcc_admins, GroupRole::Member)
        .await;
    let audit = UploadWorkspaceAuthDomainAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &fixture.dcc_admins).await;

    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), MembershipAuditAction::ChangeToAdmin);
    assert_eq!(classified.result.note(), UploadWorkspaceAuthDomainNote::DccAdmins);
    assert_eq!(classified.result.auth_domain().id(), setup.auth_domain.id());
}

#[tokio::test]
async fn uploaders_as_auth_domain_admins_is_an_error() {
    let fixture = Fixture::new().await;
    let setup = fixture
        .upload_workspace("RC1", current_cycle(None), None)
        .await;
    fixture
        .add_member(&setup.auth_domain, &setup.uploaders, GroupRole::Admin)
        .await;
    let audit = UploadWorkspaceAuthDomainAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &setup.uploaders).await;

    assert_eq!(classified.bucket, AuditBucket::Error);
    assert_eq!(classified.result.action(), MembershipAuditAction::ChangeToMember);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceAuthDomainNote::RcUploadersBeforeQc
    );
}

#[tokio::test]
async fn research_center_groups_stay_out_of_future_auth_domains() {
    let fixture = Fixture::new().await;
    let setup = fixture.upload_workspace("RC1", future_cycle(), None).await;
    fixture
        .add_member(&setup.auth_domain, &setup.members, GroupRole::Member)
        .await;
    let audit = UploadWorkspaceAuthDomainAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &setup.non_members).await;
    assert_eq!(classified.bucket, AuditBucket::Verified);
    assert_eq!(classified.result.action(), MembershipAuditAction::VerifiedNotMember);
    assert_eq!(classified.result.note(), UploadWorkspaceAuthDomainNote::RcFutureCycle);

    let classified = classify(&audit, &setup.upload, &setup.members).await;
    assert_eq!(classified.bucket, AuditBucket::NeedsAction);
    assert_eq!(classified.result.action(), MembershipAuditAction::Remove);
}

#[tokio::test]
async fn gregor_all_joins_auth_domain_only_after_combined_ready() {
    let fixture = Fixture::new().await;
    let cycle = past_cycle();
    let setup = fixture
        .upload_workspace("RC1", cycle.clone(), Some(date(2024, 12, 15)))
        .await;
    fixture
        .add_member(&setup.auth_domain, &fixture.gregor_all, GroupRole::Member)
        .await;
    let audit = UploadWorkspaceAuthDomainAudit::new(fixture.store(), fixture.config.clone());

    let classified = classify(&audit, &setup.upload, &fixture.gregor_all).await;
    assert_eq!(classified.bucket, AuditBucket::Error);
    assert_eq!(classified.result.action(), MembershipAuditAction::Remove);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceAuthDomainNote::GregorAllBeforeCombined
    );

    fixture
        .combined_workspace(cycle.id(), Some(date(2025, 1, 10)))
        .await;

    let classified = classify(&audit, &setup.upload, &fixture.gregor_all).await;
    assert_eq!(classified.bucket, AuditBucket::Verified);
    assert_eq!(classified.result.action(), MembershipAuditAction::VerifiedMember);
    assert_eq!(
        classified.result.note(),
        UploadWorkspaceAuthDomainNote::GregorAllAfterCombined
    );
}
