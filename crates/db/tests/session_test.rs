//! Session repository integration tests.
//!
//! Covers scope enforcement on listing and lookup, the filter-narrowing
//! rule, and the forward-only status flow against real rows.

#![allow(clippy::uninlined_format_args)]

mod common;

use catalyst_db::{RelationshipScope, SessionRepository};
use catalyst_db::entities::sea_orm_active_enums::SessionStatus;
use catalyst_db::repositories::session::{
    CreateSessionInput, SessionError, SessionFilter, UpdateSessionInput,
};
use catalyst_shared::CapabilitySet;
use chrono::NaiveDate;

#[tokio::test]
async fn test_list_respects_scope() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let other_a = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let other_b = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;

    let own = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let foreign = common::insert_relationship(&db, tenant, other_a, other_b).await;
    let own_session = common::insert_session(&db, own, mentor, SessionStatus::Scheduled).await;
    let foreign_session =
        common::insert_session(&db, foreign, other_a, SessionStatus::Scheduled).await;

    let repo = SessionRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![own]);

    let listed = repo
        .list(tenant, &scope, SessionFilter::default())
        .await
        .expect("list");
    assert!(listed.iter().any(|s| s.id == own_session));
    assert!(!listed.iter().any(|s| s.id == foreign_session));
}

#[tokio::test]
async fn test_relationship_filter_narrows_but_never_widens() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let other_a = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let other_b = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;

    let own = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let foreign = common::insert_relationship(&db, tenant, other_a, other_b).await;
    common::insert_session(&db, foreign, other_a, SessionStatus::Scheduled).await;

    let repo = SessionRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![own]);

    // Asking for a foreign relationship inside a restricted scope yields
    // nothing: the filter is ANDed with the scope.
    let listed = repo
        .list(
            tenant,
            &scope,
            SessionFilter {
                relationship_id: Some(foreign),
                status: None,
            },
        )
        .await
        .expect("list");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_status_filter_narrows_scoped_listing() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;

    let scheduled =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;
    let completed =
        common::insert_session(&db, relationship, mentor, SessionStatus::Completed).await;

    let repo = SessionRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);

    let listed = repo
        .list(
            tenant,
            &scope,
            SessionFilter {
                relationship_id: None,
                status: Some(SessionStatus::Completed),
            },
        )
        .await
        .expect("list");
    assert!(listed.iter().any(|s| s.id == completed));
    assert!(!listed.iter().any(|s| s.id == scheduled));
}

#[tokio::test]
async fn test_find_scoped_hides_cross_tenant_sessions() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let other_tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = SessionRepository::new(db.clone());

    let found = repo
        .find_scoped(tenant, &RelationshipScope::All, session)
        .await
        .expect("find");
    assert!(found.is_some());

    // Same id through the wrong tenant resolves like a nonexistent one.
    let found = repo
        .find_scoped(other_tenant, &RelationshipScope::All, session)
        .await
        .expect("find");
    assert!(found.is_none());

    // Out of scope behaves the same.
    let found = repo
        .find_scoped(tenant, &RelationshipScope::empty(), session)
        .await
        .expect("find");
    assert!(found.is_none());
}

#[tokio::test]
async fn test_create_requires_scope_on_relationship() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;

    let repo = SessionRepository::new(db.clone());
    let input = CreateSessionInput {
        relationship_id: relationship,
        scheduled_date: NaiveDate::from_ymd_opt(2026, 10, 1).expect("valid date"),
        scheduled_time: None,
        duration_minutes: 45,
        created_by: mentor,
    };

    let denied = repo
        .create(tenant, &RelationshipScope::empty(), input.clone())
        .await;
    assert!(matches!(
        denied,
        Err(SessionError::RelationshipNotFound(_))
    ));

    let session = repo
        .create(tenant, &RelationshipScope::Ids(vec![relationship]), input)
        .await
        .expect("create");
    assert_eq!(session.status, SessionStatus::Scheduled);
    assert_eq!(session.duration_minutes, 45);
}

#[tokio::test]
async fn test_status_flow_is_forward_only() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::InProgress).await;

    let repo = SessionRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);

    // Backward move rejected.
    let back = repo
        .update(
            tenant,
            &scope,
            session,
            UpdateSessionInput {
                status: Some(SessionStatus::Scheduled),
                ..UpdateSessionInput::default()
            },
        )
        .await;
    assert!(matches!(back, Err(SessionError::InvalidTransition { .. })));

    // Forward move accepted.
    let completed = repo
        .update(
            tenant,
            &scope,
            session,
            UpdateSessionInput {
                status: Some(SessionStatus::Completed),
                ..UpdateSessionInput::default()
            },
        )
        .await
        .expect("complete");
    assert_eq!(completed.status, SessionStatus::Completed);

    // Terminal states are immutable, cancellation included.
    let cancel = repo.cancel(tenant, &scope, session).await;
    assert!(matches!(
        cancel,
        Err(SessionError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_cancel_from_live_state() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session = common::insert_session(&db, relationship, mentor, SessionStatus::Ready).await;

    let repo = SessionRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);

    let cancelled = repo.cancel(tenant, &scope, session).await.expect("cancel");
    assert_eq!(cancelled.status, SessionStatus::Cancelled);
}
