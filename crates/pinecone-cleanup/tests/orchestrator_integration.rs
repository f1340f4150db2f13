//! Outer retry orchestration tests
//!
//! Drive `delete_project` and `run_ci_cleanup` against a fake admin API and
//! an in-memory project with a paused clock.

use pinecone_cleanup::api::ApiError;
use pinecone_cleanup::config::OuterRetryPolicy;
use pinecone_cleanup::eraser::{EraseError, FailureReason};
use pinecone_cleanup::orchestrator::{
    CleanupError, CleanupPlan, DeleteProjectOptions, KEY_NAME_PREFIX, delete_project,
    erase_with_retries, run_ci_cleanup,
};
use pinecone_cleanup_common::ResourceKind;
use pinecone_cleanup_test_utils::{
    AdminCall, Call, Describe, FakeAdmin, FakeEntry, FakeProject, FakeResource, test_config,
    test_project_id,
};
use std::time::Duration;
use tokio::time::Instant;

fn library_options(plan: CleanupPlan) -> DeleteProjectOptions {
    DeleteProjectOptions {
        plan,
        eraser: test_config(),
        policy: OuterRetryPolicy::library(),
    }
}

fn populated_project() -> FakeProject {
    FakeProject::default()
        .with_indexes(FakeResource::new(ResourceKind::Index).with(FakeEntry::new("idx")))
        .with_collections(
            FakeResource::new(ResourceKind::Collection).with(FakeEntry::new("coll")),
        )
        .with_backups(FakeResource::new(ResourceKind::Backup).with(FakeEntry::new("bk-1")))
}

/// Collection that fails every describe in the first attempt, then is ready
fn flaky_collection_project() -> FakeProject {
    FakeProject::default().with_collections(FakeResource::new(ResourceKind::Collection).with(
        FakeEntry::new("flaky").describes([
            Describe::Error,
            Describe::Error,
            Describe::Error,
            Describe::state("Ready"),
        ]),
    ))
}

#[tokio::test(start_paused = true)]
async fn test_delete_project_empties_then_deletes() {
    let admin = FakeAdmin::new();
    let project = populated_project();
    let project_id = test_project_id();

    let report = delete_project(
        &admin,
        &project_id,
        &library_options(CleanupPlan::everything()),
        |_| Ok(&project),
    )
    .await
    .expect("cleanup succeeds");

    assert!(report.is_clean());
    assert_eq!(report.attempts, 1);
    assert_eq!(report.deleted(), 3);
    assert!(project.is_empty());

    let calls = admin.calls();
    assert_eq!(calls.len(), 3);
    match &calls[0] {
        AdminCall::CreateKey { project_id: id, name } => {
            assert_eq!(id, &project_id);
            assert!(name.starts_with(KEY_NAME_PREFIX));
        }
        other => panic!("expected key creation first, got {other:?}"),
    }
    assert_eq!(calls[1], AdminCall::DeleteKey("key-0".to_string()));
    assert_eq!(calls[2], AdminCall::DeleteProject(project_id));
}

#[tokio::test(start_paused = true)]
async fn test_delete_project_only_selected_kinds() {
    let admin = FakeAdmin::new();
    let project = populated_project();
    let plan = CleanupPlan {
        collections: true,
        ..Default::default()
    };

    delete_project(&admin, "proj", &library_options(plan), |_| Ok(&project))
        .await
        .unwrap();

    assert!(project.collections.remaining().is_empty());
    assert_eq!(project.indexes.remaining(), vec!["idx".to_string()]);
    assert_eq!(project.backups.list_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_delete_project_without_cascade_skips_key() {
    let admin = FakeAdmin::new();

    let report = delete_project(
        &admin,
        "proj",
        &library_options(CleanupPlan::default()),
        |_| -> Result<FakeProject, ApiError> { panic!("no project handle needed") },
    )
    .await
    .unwrap();

    assert_eq!(report.attempts, 0);
    assert_eq!(admin.calls(), vec![AdminCall::DeleteProject("proj".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_protection_conflict_revokes_key_and_keeps_project() {
    let admin = FakeAdmin::new();
    let project = FakeProject::default().with_indexes(
        FakeResource::new(ResourceKind::Index).with(FakeEntry::new("guarded").protected()),
    );
    let plan = CleanupPlan {
        indexes: true,
        ..Default::default()
    };

    let err = delete_project(&admin, "proj", &library_options(plan), |_| Ok(&project))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CleanupError::Erase(EraseError::DeletionProtectionEnabled { .. })
    ));
    assert_eq!(admin.revoked_keys(), vec!["key-0".to_string()]);
    assert!(!admin.project_deleted("proj"));
    // Protection conflicts are not retried
    assert_eq!(project.indexes.configure_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_library_policy_retries_given_up_resources() {
    let admin = FakeAdmin::new();
    let project = flaky_collection_project();
    let start = Instant::now();

    let report = delete_project(
        &admin,
        "proj",
        &library_options(CleanupPlan::everything()),
        |_| Ok(&project),
    )
    .await
    .unwrap();

    assert_eq!(report.attempts, 2);
    assert!(report.is_clean());
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert_eq!(project.collections.describe_count("flaky"), 4);
    assert!(project.collections.remaining().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_library_policy_stops_after_max_attempts() {
    let admin = FakeAdmin::new().failing_delete_project();
    let project = FakeProject::default().with_collections(
        FakeResource::new(ResourceKind::Collection)
            .with(FakeEntry::new("pending").in_state("Pending")),
    );

    let err = delete_project(
        &admin,
        "proj",
        &library_options(CleanupPlan::everything()),
        |_| Ok(&project),
    )
    .await
    .unwrap_err();

    let report = err.report().expect("project deletion error carries the report");
    assert_eq!(report.attempts, 5);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].reason, FailureReason::NeverDeletable);
    // Counters reset each attempt: three polls per attempt
    assert_eq!(project.collections.describe_count("pending"), 15);
    assert_eq!(admin.revoked_keys().len(), 1);
    assert!(admin.project_deleted("proj"));
}

#[tokio::test(start_paused = true)]
async fn test_revoke_failure_does_not_mask_result() {
    let admin = FakeAdmin::new().failing_delete_key();
    let project = populated_project();

    let report = delete_project(
        &admin,
        "proj",
        &library_options(CleanupPlan::everything()),
        |_| Ok(&project),
    )
    .await
    .unwrap();

    assert!(report.is_clean());
    assert_eq!(admin.revoked_keys(), vec!["key-0".to_string()]);
    assert!(admin.project_deleted("proj"));
}

#[tokio::test(start_paused = true)]
async fn test_mint_failure_stops_library_flow() {
    let admin = FakeAdmin::new().failing_create_key();

    let err = delete_project(
        &admin,
        "proj",
        &library_options(CleanupPlan::everything()),
        |_| -> Result<FakeProject, ApiError> { panic!("no key was minted") },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CleanupError::MintKey { .. }));
    assert!(admin.revoked_keys().is_empty());
    assert!(!admin.project_deleted("proj"));
}

#[tokio::test(start_paused = true)]
async fn test_connect_failure_still_revokes_key() {
    let admin = FakeAdmin::new();

    let err = delete_project(
        &admin,
        "proj",
        &library_options(CleanupPlan::everything()),
        |_| -> Result<FakeProject, ApiError> {
            Err(ApiError::Decode("bad key".to_string()))
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CleanupError::Connect { .. }));
    assert_eq!(admin.revoked_keys(), vec!["key-0".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_ci_cleanup_does_not_retry_on_failures() {
    let admin = FakeAdmin::new();
    let project = flaky_collection_project();

    let report = run_ci_cleanup(&admin, "proj", test_config(), |_| Ok(&project))
        .await
        .unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].reason, FailureReason::DescribeFailed);
    assert_eq!(admin.revoked_keys().len(), 1);
    assert!(admin.project_deleted("proj"));
}

#[tokio::test(start_paused = true)]
async fn test_ci_cleanup_retries_on_errors() {
    let admin = FakeAdmin::new();
    let project = FakeProject::default().with_collections(
        FakeResource::new(ResourceKind::Collection)
            .with(FakeEntry::new("coll"))
            .failing_lists(2),
    );
    let start = Instant::now();

    let report = run_ci_cleanup(&admin, "proj", test_config(), |_| Ok(&project))
        .await
        .unwrap();

    assert_eq!(report.attempts, 3);
    assert!(report.is_clean());
    assert!(start.elapsed() >= Duration::from_secs(20));
    assert!(project.collections.remaining().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_ci_cleanup_forces_protected_indexes() {
    let admin = FakeAdmin::new();
    let project = FakeProject::default().with_indexes(
        FakeResource::new(ResourceKind::Index).with(FakeEntry::new("guarded").protected()),
    );

    let report = run_ci_cleanup(&admin, "proj", test_config(), |_| Ok(&project))
        .await
        .unwrap();

    assert!(report.is_clean());
    assert!(project.indexes.remaining().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_ci_cleanup_deletes_project_even_when_key_creation_fails() {
    let admin = FakeAdmin::new().failing_create_key();

    let err = run_ci_cleanup(&admin, "proj", test_config(), |_| {
        Ok(FakeProject::default())
    })
    .await
    .unwrap_err();

    assert!(matches!(err, CleanupError::MintKey { .. }));
    assert!(admin.project_deleted("proj"));
}

#[tokio::test(start_paused = true)]
async fn test_errors_on_every_attempt_are_reported() {
    let project = FakeProject::default().with_backups(
        FakeResource::new(ResourceKind::Backup)
            .with(FakeEntry::new("bk"))
            .failing_lists(10),
    );

    let report = erase_with_retries(
        &project,
        &CleanupPlan::everything(),
        test_config(),
        OuterRetryPolicy::ci(),
    )
    .await
    .unwrap();

    assert_eq!(report.attempts, 5);
    assert!(!report.is_clean());
    let last_error = report.last_error.expect("last attempt errored");
    assert!(last_error.starts_with("Failed to list backups"));
    assert_eq!(project.backups.list_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credentials_are_not_retried() {
    let project = FakeProject::default().with_indexes(
        FakeResource::new(ResourceKind::Index)
            .with(FakeEntry::new("idx"))
            .rejecting_credentials(),
    );
    let start = Instant::now();

    let err = erase_with_retries(
        &project,
        &CleanupPlan::everything(),
        test_config(),
        OuterRetryPolicy::ci(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EraseError::List { kind: "indexes", .. }));
    assert_eq!(project.indexes.calls(), vec![Call::ListProtected]);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_retries_are_spaced_by_policy_delay() {
    let project = FakeProject::default().with_collections(
        FakeResource::new(ResourceKind::Collection)
            .with(FakeEntry::new("pending").in_state("Pending")),
    );
    let policy = OuterRetryPolicy {
        max_attempts: 3,
        ..OuterRetryPolicy::library()
    };
    let start = Instant::now();

    let report = erase_with_retries(&project, &CleanupPlan::everything(), test_config(), policy)
        .await
        .unwrap();

    assert_eq!(report.attempts, 3);
    assert_eq!(report.failures.len(), 1);
    assert!(report.last_error.is_none());
    // Two 30s gaps between three attempts
    assert!(start.elapsed() >= Duration::from_secs(60));
    assert!(start.elapsed() < Duration::from_secs(90));
}
