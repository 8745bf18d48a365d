//! Session prep integration tests.
//!
//! Covers the one-prep-per-session guarantee (including the concurrent
//! submission race), the mentee-or-admin guard, the closed-session freeze,
//! and the ready side effect on the parent session.

#![allow(clippy::uninlined_format_args)]

mod common;

use futures::join;
use sea_orm::EntityTrait;

use catalyst_db::{PrepRepository, RelationshipScope, ScopeUser};
use catalyst_db::entities::{mentoring_sessions, sea_orm_active_enums::SessionStatus};
use catalyst_db::repositories::prep::{PrepError, PrepInput};
use catalyst_shared::CapabilitySet;

fn sample_input() -> PrepInput {
    PrepInput {
        wins: Some("Shipped the onboarding flow".to_string()),
        challenges: Some("Estimating remains hard".to_string()),
        topics_to_discuss: Some("Career ladder".to_string()),
        questions_for_mentor: None,
    }
}

#[tokio::test]
async fn test_prep_creation_advances_session_to_ready() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);
    let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

    let prep = repo
        .create(tenant, &scope, &caller, session, sample_input())
        .await
        .expect("create prep");
    assert_eq!(prep.session_id, session);
    assert_eq!(prep.user_id, mentee);

    let stored = mentoring_sessions::Entity::find_by_id(session)
        .one(&db)
        .await
        .expect("query session")
        .expect("session exists");
    assert_eq!(stored.status, SessionStatus::Ready);
}

#[tokio::test]
async fn test_prep_creation_never_moves_session_backward() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);
    let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

    // A running session and a no-show both accept prep, but their status
    // must not regress to ready.
    for status in [SessionStatus::InProgress, SessionStatus::NoShow] {
        let session = common::insert_session(&db, relationship, mentor, status.clone()).await;

        repo.create(tenant, &scope, &caller, session, sample_input())
            .await
            .expect("create prep");

        let stored = mentoring_sessions::Entity::find_by_id(session)
            .one(&db)
            .await
            .expect("query session")
            .expect("session exists");
        assert_eq!(stored.status, status);
    }
}

#[tokio::test]
async fn test_second_prep_rejected() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);
    let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

    repo.create(tenant, &scope, &caller, session, sample_input())
        .await
        .expect("first create");

    let second = repo
        .create(tenant, &scope, &caller, session, PrepInput::default())
        .await;
    assert!(matches!(second, Err(PrepError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_concurrent_prep_creates_resolve_to_one_row() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);
    let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

    let (a, b) = join!(
        repo.create(tenant, &scope, &caller, session, sample_input()),
        repo.create(tenant, &scope, &caller, session, sample_input()),
    );

    // Exactly one submission wins; the unique constraint decides the race.
    let successes = usize::from(a.is_ok()) + usize::from(b.is_ok());
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(e) = result {
            assert!(matches!(e, PrepError::AlreadyExists(_)));
        }
    }

    let prep = repo
        .get(tenant, &scope, session)
        .await
        .expect("get prep")
        .expect("prep exists");
    assert_eq!(prep.session_id, session);
}

#[tokio::test]
async fn test_non_mentee_cannot_submit_prep() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);

    // The mentor participates in the relationship but is not the mentee.
    let caller = ScopeUser::new(mentor, 30, CapabilitySet::EMPTY);
    let result = repo
        .create(tenant, &scope, &caller, session, sample_input())
        .await;
    assert!(matches!(result, Err(PrepError::NotMentee)));
}

#[tokio::test]
async fn test_admin_override_may_submit_on_behalf() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let admin = common::insert_user(&db, tenant, 70, CapabilitySet::EMPTY).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::All;
    let caller = ScopeUser::new(admin, 70, CapabilitySet::EMPTY);

    let prep = repo
        .create(tenant, &scope, &caller, session, sample_input())
        .await
        .expect("admin create");
    assert_eq!(prep.user_id, admin);
}

#[tokio::test]
async fn test_closed_session_freezes_prep() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);
    let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

    for status in [SessionStatus::Completed, SessionStatus::Cancelled] {
        let session = common::insert_session(&db, relationship, mentor, status).await;

        let create = repo
            .create(tenant, &scope, &caller, session, sample_input())
            .await;
        assert!(matches!(create, Err(PrepError::SessionClosed)));

        let update = repo
            .update(tenant, &scope, &caller, session, sample_input())
            .await;
        assert!(matches!(update, Err(PrepError::SessionClosed)));
    }
}

#[tokio::test]
async fn test_out_of_scope_session_reads_as_missing() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = PrepRepository::new(db.clone());
    let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

    // Empty scope: existence is not revealed.
    let result = repo
        .create(
            tenant,
            &RelationshipScope::empty(),
            &caller,
            session,
            sample_input(),
        )
        .await;
    assert!(matches!(result, Err(PrepError::SessionNotFound(_))));

    // Wrong tenant behaves identically.
    let other_tenant = common::insert_tenant(&db, None).await;
    let result = repo
        .get(other_tenant, &RelationshipScope::All, session)
        .await;
    assert!(matches!(result, Err(PrepError::SessionNotFound(_))));
}

#[tokio::test]
async fn test_prep_update_replaces_content_without_status_side_effect() {
    let Some(db) = common::try_connect().await else {
        return;
    };

    let tenant = common::insert_tenant(&db, None).await;
    let mentor = common::insert_user(&db, tenant, 30, CapabilitySet::EMPTY).await;
    let mentee = common::insert_user(&db, tenant, 20, CapabilitySet::EMPTY).await;
    let relationship = common::insert_relationship(&db, tenant, mentor, mentee).await;
    let session =
        common::insert_session(&db, relationship, mentor, SessionStatus::Scheduled).await;

    let repo = PrepRepository::new(db.clone());
    let scope = RelationshipScope::Ids(vec![relationship]);
    let caller = ScopeUser::new(mentee, 20, CapabilitySet::EMPTY);

    repo.create(tenant, &scope, &caller, session, sample_input())
        .await
        .expect("create prep");

    let updated = repo
        .update(
            tenant,
            &scope,
            &caller,
            session,
            PrepInput {
                wins: Some("Revised wins".to_string()),
                ..PrepInput::default()
            },
        )
        .await
        .expect("update prep");
    assert_eq!(updated.wins.as_deref(), Some("Revised wins"));
    assert_eq!(updated.challenges, None);

    // Update does not move the session status again.
    let stored = mentoring_sessions::Entity::find_by_id(session)
        .one(&db)
        .await
        .expect("query session")
        .expect("session exists");
    assert_eq!(stored.status, SessionStatus::Ready);
}
