use chrono::NaiveDate;
use gregor_access_application::{AccessStore, AuditScope};
use gregor_access_core::{AppError, ManagedGroupId, UploadCycleId, WorkspaceId};
use gregor_access_domain::{AccessLevel, GroupRole, SharingGrant};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresAccessStore;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres access store tests: {error}");
    }

    Some(pool)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| unreachable!())
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

async fn insert_group(pool: &PgPool, name: &str) -> ManagedGroupId {
    let group_id = ManagedGroupId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO managed_groups (id, name, email)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(group_id.as_uuid())
    .bind(name)
    .bind(format!("{name}@firecloud.org"))
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    group_id
}

async fn insert_workspace(
    pool: &PgPool,
    name: &str,
    auth_domain_id: Option<ManagedGroupId>,
) -> WorkspaceId {
    let workspace_id = WorkspaceId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO workspaces (id, billing_project, name, auth_domain_id)
            VALUES ($1, 'test-bp', $2, $3)
            "#,
    )
    .bind(workspace_id.as_uuid())
    .bind(name)
    .bind(auth_domain_id.map(|id| id.as_uuid()))
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    workspace_id
}

async fn insert_upload_cycle(pool: &PgPool) -> UploadCycleId {
    let upload_cycle_id = UploadCycleId::new();
    let cycle = i32::try_from(Uuid::new_v4().as_u128() % 1_000_000_000)
        .unwrap_or_else(|_| unreachable!())
        + 1;
    let insert = sqlx::query(
        r#"
            INSERT INTO upload_cycles (id, cycle, start_date, end_date, date_ready_for_compute)
            VALUES ($1, $2, $3, $4, $5)
            "#,
    )
    .bind(upload_cycle_id.as_uuid())
    .bind(cycle)
    .bind(date(2025, 1, 1))
    .bind(date(2025, 5, 31))
    .bind(Some(date(2025, 2, 1)))
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    upload_cycle_id
}

async fn insert_upload_workspace(pool: &PgPool) -> WorkspaceId {
    let uploaders = insert_group(pool, &unique("UPLOADERS")).await;
    let members = insert_group(pool, &unique("MEMBERS")).await;
    let auth_domain = insert_group(pool, &unique("AUTH")).await;
    let research_center_id = Uuid::new_v4();
    let insert = sqlx::query(
        r#"
            INSERT INTO research_centers (id, short_name, uploader_group_id, member_group_id)
            VALUES ($1, $2, $3, $4)
            "#,
    )
    .bind(research_center_id)
    .bind(unique("RC"))
    .bind(uploaders.as_uuid())
    .bind(members.as_uuid())
    .execute(pool)
    .await;
    assert!(insert.is_ok());

    let upload_cycle_id = insert_upload_cycle(pool).await;
    let workspace_id = insert_workspace(pool, &unique("upload"), Some(auth_domain)).await;
    let insert = sqlx::query(
        r#"
            INSERT INTO upload_workspaces (workspace_id, upload_cycle_id, research_center_id)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(workspace_id.as_uuid())
    .bind(upload_cycle_id.as_uuid())
    .bind(research_center_id)
    .execute(pool)
    .await;
    assert!(insert.is_ok());

    workspace_id
}

async fn insert_combined_workspace(
    pool: &PgPool,
    upload_cycle_id: UploadCycleId,
    date_completed: Option<NaiveDate>,
) -> WorkspaceId {
    let workspace_id = insert_workspace(pool, &unique("combined"), None).await;
    let insert = sqlx::query(
        r#"
            INSERT INTO combined_consortium_data_workspaces
                (workspace_id, upload_cycle_id, date_completed)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(workspace_id.as_uuid())
    .bind(upload_cycle_id.as_uuid())
    .bind(date_completed)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    workspace_id
}

#[tokio::test]
async fn scoped_upload_listing_loads_cycle_and_research_center() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresAccessStore::new(pool.clone());
    let workspace_id = insert_upload_workspace(&pool).await;

    let listed = store
        .list_upload_workspaces(&AuditScope::Workspaces(vec![workspace_id]))
        .await;

    let Ok(listed) = listed else {
        panic!("scoped listing should succeed");
    };
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].workspace().id(), workspace_id);
    assert!(listed[0].workspace().auth_domain_id().is_some());
    assert!(listed[0].research_center().uploader_group_id().is_some());
    assert!(listed[0].research_center().non_member_group_id().is_none());
    assert!(listed[0].upload_cycle().is_ready_for_compute(date(2025, 3, 15)));
}

#[tokio::test]
async fn scope_with_other_kind_is_rejected() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresAccessStore::new(pool.clone());
    let upload_cycle_id = insert_upload_cycle(&pool).await;
    let combined_id = insert_combined_workspace(&pool, upload_cycle_id, None).await;

    let listed = store
        .list_upload_workspaces(&AuditScope::Workspaces(vec![combined_id]))
        .await;

    assert!(matches!(listed, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn only_completed_combined_workspace_is_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresAccessStore::new(pool.clone());
    let upload_cycle_id = insert_upload_cycle(&pool).await;
    insert_combined_workspace(&pool, upload_cycle_id, None).await;

    let pending = store.find_complete_combined_workspace(upload_cycle_id).await;
    assert!(matches!(pending, Ok(None)));

    let completed_id =
        insert_combined_workspace(&pool, upload_cycle_id, Some(date(2025, 3, 1))).await;
    let found = store.find_complete_combined_workspace(upload_cycle_id).await;

    let Ok(Some(found)) = found else {
        panic!("completed workspace should be found");
    };
    assert_eq!(found.workspace().id(), completed_id);
    assert!(found.is_complete());
}

#[tokio::test]
async fn sharing_upsert_keeps_created_and_tracks_changes() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresAccessStore::new(pool.clone());
    let group_id = insert_group(&pool, &unique("WRITERS")).await;
    let workspace_id = insert_workspace(&pool, &unique("shared"), None).await;

    let created = store
        .save_sharing(workspace_id, group_id, SharingGrant::reader())
        .await;
    let Ok(created) = created else {
        panic!("sharing should be created");
    };

    let unchanged = store
        .save_sharing(workspace_id, group_id, SharingGrant::reader())
        .await;
    let Ok(unchanged) = unchanged else {
        panic!("sharing should be saved");
    };
    assert_eq!(unchanged.modified_at(), created.modified_at());

    let updated = store
        .save_sharing(workspace_id, group_id, SharingGrant::writer_with_compute())
        .await;
    let Ok(updated) = updated else {
        panic!("sharing should be updated");
    };
    assert_eq!(updated.created_at(), created.created_at());
    assert!(updated.modified_at() >= created.modified_at());
    assert_eq!(updated.access(), AccessLevel::Writer);
    assert!(updated.can_compute());

    assert!(matches!(
        store.delete_sharing(workspace_id, group_id).await,
        Ok(true)
    ));
    assert!(matches!(
        store.delete_sharing(workspace_id, group_id).await,
        Ok(false)
    ));
    assert!(matches!(
        store.find_sharing(workspace_id, group_id).await,
        Ok(None)
    ));
}

#[tokio::test]
async fn membership_upsert_changes_role() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresAccessStore::new(pool.clone());
    let parent_id = insert_group(&pool, &unique("AUTH")).await;
    let child_id = insert_group(&pool, &unique("DCC_ADMINS")).await;

    let saved = store
        .save_membership(parent_id, child_id, GroupRole::Member)
        .await;
    assert!(saved.is_ok());
    let promoted = store
        .save_membership(parent_id, child_id, GroupRole::Admin)
        .await;
    let Ok(promoted) = promoted else {
        panic!("membership should be updated");
    };
    assert_eq!(promoted.role(), GroupRole::Admin);

    let found = store.find_membership(parent_id, child_id).await;
    let Ok(Some(found)) = found else {
        panic!("membership should exist");
    };
    assert_eq!(found.role(), GroupRole::Admin);

    assert!(matches!(
        store.save_membership(parent_id, parent_id, GroupRole::Member).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        store.delete_membership(parent_id, child_id).await,
        Ok(true)
    ));
}
