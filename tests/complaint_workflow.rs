//! Complaint submission and resolution: duplicate guarding, the point
//! override on approval, and terminal-state behavior.

mod common;

use activityhub::database::participation_repo;
use activityhub::models::UserRole;
use activityhub::services::error::ServiceError;
use activityhub::services::{activity_service, complaint_service, participation_service};
use common::*;
use sqlx::SqlitePool;

/// Takes one student through register → approve → complete → present so a
/// point exists to dispute. Returns the participation id.
async fn present_participation(pool: &SqlitePool, organizer: &str, student: &str) -> String {
    let activity_id = seed_published_activity(pool, organizer, "volunteer", None).await;
    let p = register_pending(pool, student, &activity_id).await;
    participation_service::bulk_review(
        pool,
        organizer,
        UserRole::Organizer,
        &activity_id,
        &[p.clone()],
        "approve",
    )
    .await
    .unwrap();
    activity_service::complete_activity(pool, organizer, &activity_id)
        .await
        .unwrap();
    participation_service::confirm_attendance(
        pool,
        organizer,
        UserRole::Organizer,
        &activity_id,
        &[p.clone()],
        "present",
    )
    .await
    .unwrap();
    p
}

#[tokio::test]
async fn complaint_requires_a_description() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;

    let err = complaint_service::submit_complaint(&pool, "stu-1", UserRole::Student, &p, "   ")
        .await
        .unwrap_err();
    match err {
        ServiceError::Validation(msg) => assert!(msg.contains("description"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn complaint_only_by_the_owning_student() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    seed_user(&pool, "stu-2", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;

    let err = complaint_service::submit_complaint(
        &pool,
        "stu-2",
        UserRole::Student,
        &p,
        "points look wrong",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Authorization(_)));
}

#[tokio::test]
async fn identical_pending_complaint_is_a_conflict() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;

    complaint_service::submit_complaint(
        &pool,
        "stu-1",
        UserRole::Student,
        &p,
        "I was there the whole day",
    )
    .await
    .expect("first complaint accepted");

    let err = complaint_service::submit_complaint(
        &pool,
        "stu-1",
        UserRole::Student,
        &p,
        "I was there the whole day",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(_)));
}

#[tokio::test]
async fn approving_a_complaint_overrides_the_point() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;
    let before = participation_repo::load_participation_by_id(&pool, &p)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.training_point, 10);

    let complaint = complaint_service::submit_complaint(
        &pool,
        "stu-1",
        UserRole::Student,
        &p,
        "organized the supply run too",
    )
    .await
    .unwrap();

    let resolved = complaint_service::resolve_complaint(
        &pool,
        "org-1",
        UserRole::Organizer,
        &complaint.complaint_id,
        "approved",
        "corrected per attendance log",
        Some(15),
    )
    .await
    .unwrap();
    assert_eq!(resolved.status, "approved");
    assert_eq!(resolved.response.as_deref(), Some("corrected per attendance log"));
    assert!(resolved.resolved_at.is_some());

    let after = participation_repo::load_participation_by_id(&pool, &p)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.training_point, 15);
}

#[tokio::test]
async fn rejecting_a_complaint_leaves_the_point_alone() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;

    let complaint = complaint_service::submit_complaint(
        &pool,
        "stu-1",
        UserRole::Student,
        &p,
        "should be double",
    )
    .await
    .unwrap();

    let resolved = complaint_service::resolve_complaint(
        &pool,
        "org-1",
        UserRole::Organizer,
        &complaint.complaint_id,
        "rejected",
        "attendance log shows a half day",
        None,
    )
    .await
    .unwrap();
    assert_eq!(resolved.status, "rejected");

    let after = participation_repo::load_participation_by_id(&pool, &p)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.training_point, 10);
}

#[tokio::test]
async fn resolution_input_is_validated() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;
    let complaint = complaint_service::submit_complaint(
        &pool,
        "stu-1",
        UserRole::Student,
        &p,
        "recount please",
    )
    .await
    .unwrap();
    let id = complaint.complaint_id;

    // Unknown verdict.
    let err = complaint_service::resolve_complaint(
        &pool,
        "org-1",
        UserRole::Organizer,
        &id,
        "escalated",
        "text",
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // Empty response.
    let err = complaint_service::resolve_complaint(
        &pool,
        "org-1",
        UserRole::Organizer,
        &id,
        "approved",
        "  ",
        Some(12),
    )
    .await
    .unwrap_err();
    match err {
        ServiceError::Validation(msg) => assert!(msg.contains("response"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }

    // Approval without a replacement point.
    let err = complaint_service::resolve_complaint(
        &pool,
        "org-1",
        UserRole::Organizer,
        &id,
        "approved",
        "ok",
        None,
    )
    .await
    .unwrap_err();
    match err {
        ServiceError::Validation(msg) => assert!(msg.contains("new_point"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }

    // Replacement point out of range.
    for bad_point in [-1, 101] {
        let err = complaint_service::resolve_complaint(
            &pool,
            "org-1",
            UserRole::Organizer,
            &id,
            "approved",
            "ok",
            Some(bad_point),
        )
        .await
        .unwrap_err();
        match err {
            ServiceError::Validation(msg) => assert!(msg.contains("new_point"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // Everything rejected above left the complaint untouched.
    let row = participation_repo::load_participation_by_id(&pool, &p)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.training_point, 10);
}

#[tokio::test]
async fn only_the_owning_organizer_may_resolve() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "org-2", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;
    let complaint =
        complaint_service::submit_complaint(&pool, "stu-1", UserRole::Student, &p, "recount")
            .await
            .unwrap();

    let err = complaint_service::resolve_complaint(
        &pool,
        "org-2",
        UserRole::Organizer,
        &complaint.complaint_id,
        "approved",
        "fine",
        Some(20),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Authorization(_)));

    // A student can never resolve, not even their own.
    let err = complaint_service::resolve_complaint(
        &pool,
        "stu-1",
        UserRole::Student,
        &complaint.complaint_id,
        "approved",
        "fine",
        Some(20),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Authorization(_)));
}

#[tokio::test]
async fn resolved_complaints_are_terminal_but_new_ones_may_follow() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;
    let complaint =
        complaint_service::submit_complaint(&pool, "stu-1", UserRole::Student, &p, "recount")
            .await
            .unwrap();

    complaint_service::resolve_complaint(
        &pool,
        "org-1",
        UserRole::Organizer,
        &complaint.complaint_id,
        "rejected",
        "log is correct",
        None,
    )
    .await
    .unwrap();

    let err = complaint_service::resolve_complaint(
        &pool,
        "org-1",
        UserRole::Organizer,
        &complaint.complaint_id,
        "approved",
        "changed my mind",
        Some(30),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    // The duplicate guard only blocks pending complaints; after resolution
    // the student may dispute again with the same wording.
    complaint_service::submit_complaint(&pool, "stu-1", UserRole::Student, &p, "recount")
        .await
        .expect("fresh complaint after resolution");
}

#[tokio::test]
async fn listings_are_scoped_to_owner_and_student() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "org-2", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let p = present_participation(&pool, "org-1", "stu-1").await;
    complaint_service::submit_complaint(&pool, "stu-1", UserRole::Student, &p, "recount")
        .await
        .unwrap();
    let activity_id = participation_repo::load_participation_by_id(&pool, &p)
        .await
        .unwrap()
        .unwrap()
        .activity_id;

    let mine = complaint_service::list_mine(&pool, "stu-1").await.unwrap();
    assert_eq!(mine.len(), 1);

    let for_activity = complaint_service::list_for_activity(&pool, "org-1", &activity_id)
        .await
        .unwrap();
    assert_eq!(for_activity.len(), 1);

    let err = complaint_service::list_for_activity(&pool, "org-2", &activity_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Authorization(_)));
}
