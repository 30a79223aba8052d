//! Integration tests for users, roles and sessions.

mod common;

use chrono::{Duration, Utc};
use kontor_core::auth::{ADMIN_ROLE, DEFAULT_ROLE, DEFAULT_ROLES, NewUser, UserChanges};
use kontor_db::repositories::UserError;
use kontor_db::{RoleRepository, SessionRepository, UserRepository};
use kontor_shared::types::PageRequest;

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: Some(email.into()),
        password: Some("secret123".into()),
        name: Some("Someone".into()),
        role_id: None,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_registration_uses_default_role_and_lowercases_email() {
    let t = common::setup().await;
    let users = UserRepository::new(t.db.clone());

    let created = users
        .create(new_user("Mixed.Case@Example.com").validate().unwrap())
        .await
        .unwrap();

    assert_eq!(created.user.email, "mixed.case@example.com");
    assert_eq!(created.role.name, DEFAULT_ROLE);
    assert_ne!(created.user.password_hash, "secret123");
    assert!(users.email_exists("MIXED.CASE@example.com").await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_email_rejected() {
    let t = common::setup().await;
    let users = UserRepository::new(t.db.clone());

    let err = users
        .create(new_user("tester@example.com").validate().unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::DuplicateEmail(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_registrations_yield_one_winner() {
    let t = common::setup().await;
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..6 {
        let users = UserRepository::new(t.db.clone());
        let input = new_user("race@example.com").validate().unwrap();
        tasks.spawn(async move { users.create(input).await });
    }

    let results = tasks.join_all().await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(UserError::DuplicateEmail(_))))
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_cannot_deactivate_self() {
    let t = common::setup().await;
    let users = UserRepository::new(t.db.clone());

    let err = users.deactivate(t.user_id, t.user_id).await.unwrap_err();
    assert!(matches!(err, UserError::SelfDeactivation));

    let other = users
        .create(new_user("other@example.com").validate().unwrap())
        .await
        .unwrap();
    users.deactivate(other.user.id, t.user_id).await.unwrap();

    let page = users.list(PageRequest::default(), None).await.unwrap();
    assert!(page.items.iter().all(|u| u.user.id != other.user.id));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_profile_update_keeps_role() {
    let t = common::setup().await;
    let roles = RoleRepository::new(t.db.clone());
    let admin = roles.find_by_name(ADMIN_ROLE).await.unwrap().unwrap();

    let updated = UserRepository::new(t.db.clone())
        .update_profile(
            t.user_id,
            UserChanges {
                name: Some("Renamed".into()),
                role_id: Some(admin.id),
                ..UserChanges::default()
            }
            .validate()
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(updated.user.name, "Renamed");
    assert_eq!(updated.role.name, DEFAULT_ROLE);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_role_seeding_is_idempotent_and_admin_hidden() {
    let t = common::setup().await;
    let roles = RoleRepository::new(t.db.clone());

    assert_eq!(roles.ensure(&DEFAULT_ROLES).await.unwrap(), 0);
    let assignable = roles.list_assignable().await.unwrap();
    assert_eq!(assignable.len(), DEFAULT_ROLES.len() - 1);
    assert!(assignable.iter().all(|r| r.name != ADMIN_ROLE));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_session_lifecycle() {
    let t = common::setup().await;
    let sessions = SessionRepository::new(t.db.clone());

    sessions
        .create(t.user_id, "live-token", Utc::now() + Duration::hours(24))
        .await
        .unwrap();
    sessions
        .create(t.user_id, "stale-token", Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    assert!(sessions.find_active("live-token").await.unwrap().is_some());
    assert!(sessions.find_active("stale-token").await.unwrap().is_none());

    assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    assert_eq!(sessions.delete_by_token("live-token").await.unwrap(), 1);
    assert!(sessions.find_active("live-token").await.unwrap().is_none());
}
