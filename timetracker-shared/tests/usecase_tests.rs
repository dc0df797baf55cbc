/// Usecase tests against the in-process repository
///
/// Run with: cargo test --test usecase_tests

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use timetracker_shared::auth::acl::{require_friends_or_admin, Principal};
use timetracker_shared::error::ErrorKind;
use timetracker_shared::models::{
    entry::EntryInput,
    friend::FriendRelation,
    project::ProjectInput,
    tag::TagInput,
    user::{CreateUser, Role, User},
};
use timetracker_shared::repository::{memory::MemoryRepository, UserRepository};
use timetracker_shared::usecase::{
    auth::SignUp, user::ProfileUpdate, AuthSettings, Repositories, Usecases,
};

fn setup() -> (Arc<MemoryRepository>, Usecases) {
    let repo = Arc::new(MemoryRepository::new());
    let usecases = Usecases::new(Repositories::memory(repo.clone()), AuthSettings::default());
    (repo, usecases)
}

async fn seed_user(repo: &MemoryRepository, name: &str, role: Role) -> User {
    repo.create_user(CreateUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        about: String::new(),
        role,
        password: String::new(),
    })
    .await
    .expect("seed user")
}

fn entry_input(start: DateTime<Utc>, hours: i64, tag_ids: Vec<i64>) -> EntryInput {
    EntryInput {
        project_id: None,
        description: "entry".to_string(),
        tag_ids,
        time_start: start,
        time_end: start + Duration::hours(hours),
    }
}

fn sign_up(name: &str, role: Role, admin_token: Option<&str>) -> SignUp {
    SignUp {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        about: "about".to_string(),
        role,
        password: "correct horse".to_string(),
        admin_token: admin_token.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Friends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_subscribe_adds_only_the_forward_edge() {
    let (repo, uc) = setup();
    let a = seed_user(&repo, "Alice", Role::User).await;
    let b = seed_user(&repo, "Bob", Role::User).await;

    uc.friends
        .create_friend_relation(FriendRelation::new(a.id, b.id))
        .await
        .unwrap();

    assert_eq!(uc.friends.get_user_subs(b.id).await.unwrap()[0].id, a.id);
    assert!(uc.friends.get_user_subs(a.id).await.unwrap().is_empty());
    assert!(!uc.friends.check_is_friends(a.id, b.id).await.unwrap());
}

#[tokio::test]
async fn test_subscribe_twice_conflicts_without_duplicating() {
    let (repo, uc) = setup();
    let a = seed_user(&repo, "Alice", Role::User).await;
    let b = seed_user(&repo, "Bob", Role::User).await;
    let rel = FriendRelation::new(a.id, b.id);

    uc.friends.create_friend_relation(rel).await.unwrap();
    let writes = repo.writes();

    let err = uc.friends.create_friend_relation(rel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(repo.writes(), writes);
    assert_eq!(uc.friends.get_user_subs(b.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsubscribe_missing_edge_is_not_found() {
    let (repo, uc) = setup();
    let a = seed_user(&repo, "Alice", Role::User).await;
    let b = seed_user(&repo, "Bob", Role::User).await;
    let writes = repo.writes();

    let err = uc
        .friends
        .delete_friend_relation(FriendRelation::new(a.id, b.id))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(repo.writes(), writes);
}

#[tokio::test]
async fn test_self_relation_is_rejected_before_any_lookup() {
    let (repo, uc) = setup();
    let a = seed_user(&repo, "Alice", Role::User).await;
    let writes = repo.writes();

    let rel = FriendRelation::new(a.id, a.id);
    let subscribe = uc.friends.create_friend_relation(rel).await.unwrap_err();
    let unsubscribe = uc.friends.delete_friend_relation(rel).await.unwrap_err();
    let check = uc.friends.check_is_friends(a.id, a.id).await.unwrap_err();

    assert_eq!(subscribe.kind(), ErrorKind::BadRequest);
    assert_eq!(unsubscribe.kind(), ErrorKind::BadRequest);
    assert_eq!(check.kind(), ErrorKind::BadRequest);
    assert_eq!(repo.writes(), writes);
    assert_eq!(repo.friend_checks(), 0);
}

#[tokio::test]
async fn test_friendship_is_symmetric_and_checks_both_edges() {
    let (repo, uc) = setup();
    let a = seed_user(&repo, "Alice", Role::User).await;
    let b = seed_user(&repo, "Bob", Role::User).await;

    let before = repo.friend_checks();
    assert!(!uc.friends.check_is_friends(a.id, b.id).await.unwrap());
    assert_eq!(repo.friend_checks() - before, 2);

    uc.friends
        .create_friend_relation(FriendRelation::new(a.id, b.id))
        .await
        .unwrap();
    assert!(!uc.friends.check_is_friends(a.id, b.id).await.unwrap());
    assert!(!uc.friends.check_is_friends(b.id, a.id).await.unwrap());

    uc.friends
        .create_friend_relation(FriendRelation::new(b.id, a.id))
        .await
        .unwrap();
    assert!(uc.friends.check_is_friends(a.id, b.id).await.unwrap());
    assert!(uc.friends.check_is_friends(b.id, a.id).await.unwrap());

    let friends = uc.friends.get_user_friends(a.id).await.unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].id, b.id);
    assert!(uc.friends.get_user_subs(a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscribe_to_unknown_user_is_not_found() {
    let (repo, uc) = setup();
    let a = seed_user(&repo, "Alice", Role::User).await;

    let err = uc
        .friends
        .create_friend_relation(FriendRelation::new(a.id, 999))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_friends_or_admin_rule() {
    let (repo, uc) = setup();
    let a = seed_user(&repo, "Alice", Role::User).await;
    let b = seed_user(&repo, "Bob", Role::User).await;
    let admin = seed_user(&repo, "Root", Role::Admin).await;

    let alice = Principal::from(&a);
    let err = require_friends_or_admin(&alice, b.id, &uc.friends).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = require_friends_or_admin(&alice, a.id, &uc.friends).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let before = repo.friend_checks();
    require_friends_or_admin(&Principal::from(&admin), b.id, &uc.friends)
        .await
        .unwrap();
    assert_eq!(repo.friend_checks(), before);

    uc.friends
        .create_friend_relation(FriendRelation::new(a.id, b.id))
        .await
        .unwrap();
    uc.friends
        .create_friend_relation(FriendRelation::new(b.id, a.id))
        .await
        .unwrap();
    require_friends_or_admin(&alice, b.id, &uc.friends).await.unwrap();
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_entry_scenario_two_hours_no_tags() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let start = DateTime::parse_from_rfc3339("2021-08-15T14:30:45-07:00")
        .unwrap()
        .with_timezone(&Utc);

    let created = uc
        .entries
        .create_entry(&owner, entry_input(start, 2, vec![]))
        .await
        .unwrap();

    let entry = uc.entries.get_entry(&owner, created.id).await.unwrap();
    assert_eq!(entry.duration(), "2h0m0s");
    assert!(entry.tag_list.is_empty());
    assert_eq!(entry.user_id, owner.id);
}

#[tokio::test]
async fn test_entry_read_back_resolves_its_tags() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);

    let mut tag_ids = Vec::new();
    for name in ["work", "deep"] {
        let tag = uc
            .tags
            .create_tag(
                &owner,
                TagInput {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        tag_ids.push(tag.id);
    }

    let created = uc
        .entries
        .create_entry(&owner, entry_input(Utc::now(), 1, tag_ids.clone()))
        .await
        .unwrap();

    let entry = uc.entries.get_entry(&owner, created.id).await.unwrap();
    let mut got: Vec<i64> = entry.tag_list.iter().map(|t| t.id).collect();
    got.sort_unstable();
    assert_eq!(got, tag_ids);
}

#[tokio::test]
async fn test_entry_with_dangling_tag_fails_whole_read() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);

    let created = uc
        .entries
        .create_entry(&owner, entry_input(Utc::now(), 1, vec![404]))
        .await
        .unwrap_err();
    assert_eq!(created.kind(), ErrorKind::NotFound);

    let listed = uc.entries.get_user_entries(owner.id, None).await.unwrap_err();
    assert_eq!(listed.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_non_owner_cannot_touch_entry() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let stranger = Principal::from(&seed_user(&repo, "Mallory", Role::User).await);

    let entry = uc
        .entries
        .create_entry(&owner, entry_input(Utc::now(), 1, vec![]))
        .await
        .unwrap();
    let writes = repo.writes();

    let get = uc.entries.get_entry(&stranger, entry.id).await.unwrap_err();
    let mut changed = entry_input(Utc::now(), 3, vec![]);
    changed.description = "hijacked".to_string();
    let update = uc
        .entries
        .update_entry(&stranger, entry.id, changed)
        .await
        .unwrap_err();
    let delete = uc.entries.delete_entry(&stranger, entry.id).await.unwrap_err();

    assert_eq!(get.kind(), ErrorKind::PermissionDenied);
    assert_eq!(update.kind(), ErrorKind::PermissionDenied);
    assert_eq!(delete.kind(), ErrorKind::PermissionDenied);
    assert_eq!(repo.writes(), writes);

    let stored = uc.entries.get_entry(&owner, entry.id).await.unwrap();
    assert_eq!(stored.description, "entry");
}

#[tokio::test]
async fn test_admin_update_keeps_the_owner() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let admin = Principal::from(&seed_user(&repo, "Root", Role::Admin).await);

    let entry = uc
        .entries
        .create_entry(&owner, entry_input(Utc::now(), 1, vec![]))
        .await
        .unwrap();

    let mut changed = entry_input(entry.time_start, 4, vec![]);
    changed.description = "reviewed".to_string();
    let updated = uc.entries.update_entry(&admin, entry.id, changed).await.unwrap();

    assert_eq!(updated.user_id, owner.id);
    assert_eq!(updated.description, "reviewed");
    assert_eq!(updated.duration(), "4h0m0s");
}

#[tokio::test]
async fn test_update_replaces_tags_only_when_given() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let first = uc.tags.create_tag(&owner, TagInput::default()).await.unwrap();
    let second = uc.tags.create_tag(&owner, TagInput::default()).await.unwrap();

    let entry = uc
        .entries
        .create_entry(&owner, entry_input(Utc::now(), 1, vec![first.id]))
        .await
        .unwrap();

    let kept = uc
        .entries
        .update_entry(&owner, entry.id, entry_input(entry.time_start, 1, vec![]))
        .await
        .unwrap();
    assert_eq!(kept.tag_list, vec![first.clone()]);

    let replaced = uc
        .entries
        .update_entry(&owner, entry.id, entry_input(entry.time_start, 1, vec![second.id]))
        .await
        .unwrap();
    assert_eq!(replaced.tag_list, vec![second]);
}

#[tokio::test]
async fn test_delete_entry_drops_tag_links() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let tag = uc.tags.create_tag(&owner, TagInput::default()).await.unwrap();

    let entry = uc
        .entries
        .create_entry(&owner, entry_input(Utc::now(), 1, vec![tag.id]))
        .await
        .unwrap();
    uc.entries.delete_entry(&owner, entry.id).await.unwrap();

    let err = uc.entries.get_entry(&owner, entry.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    use timetracker_shared::repository::TagRepository;
    assert!(repo.get_entry_tag_ids(entry.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_a_tag_keeps_its_entries_readable() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let kept = uc.tags.create_tag(&owner, TagInput::default()).await.unwrap();
    let dropped = uc.tags.create_tag(&owner, TagInput::default()).await.unwrap();

    let entry = uc
        .entries
        .create_entry(&owner, entry_input(Utc::now(), 1, vec![kept.id, dropped.id]))
        .await
        .unwrap();

    uc.tags.delete_tag(&owner, dropped.id).await.unwrap();

    let read = uc.entries.get_entry(&owner, entry.id).await.unwrap();
    assert_eq!(read.tag_list, vec![kept.clone()]);

    let listed = uc.entries.get_user_entries(owner.id, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].tag_list, vec![kept]);
}

#[tokio::test]
async fn test_day_filter_keeps_entries_starting_that_day() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);

    let early = Utc.with_ymd_and_hms(2021, 8, 15, 0, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2021, 8, 15, 23, 59, 59).unwrap();
    let next_day = Utc.with_ymd_and_hms(2021, 8, 16, 0, 0, 0).unwrap();

    for start in [late, next_day, early] {
        uc.entries
            .create_entry(&owner, entry_input(start, 1, vec![]))
            .await
            .unwrap();
    }

    let day = NaiveDate::from_ymd_opt(2021, 8, 15).unwrap();
    let filtered = uc.entries.get_user_entries(owner.id, Some(day)).await.unwrap();
    let starts: Vec<_> = filtered.iter().map(|e| e.time_start).collect();
    assert_eq!(starts, vec![early, late]);

    let all = uc.entries.get_user_entries(owner.id, None).await.unwrap();
    assert_eq!(all.len(), 3);
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_admin_sign_up_with_wrong_token_creates_nobody() {
    let (repo, uc) = setup();

    let err = uc
        .auth
        .sign_up(sign_up("Eve", Role::Admin, Some("guess")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(repo.writes(), 0);
    assert!(uc.users.get_all_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_sign_up_with_token() {
    let (_repo, uc) = setup();

    let (user, session) = uc
        .auth
        .sign_up(sign_up("Root", Role::Admin, Some("secret_token")))
        .await
        .unwrap();

    assert_eq!(user.role, Role::Admin);
    assert!(user.password.is_empty());
    assert_eq!(session.user_id, user.id);
    assert_eq!(session.max_age, Duration::days(365));
}

#[tokio::test]
async fn test_sign_up_rejects_taken_email() {
    let (_repo, uc) = setup();

    uc.auth.sign_up(sign_up("Alice", Role::User, None)).await.unwrap();
    let err = uc
        .auth
        .sign_up(sign_up("Alice", Role::User, None))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_sign_in_distinguishes_wrong_password_from_unknown_email() {
    let (_repo, uc) = setup();
    uc.auth.sign_up(sign_up("Alice", Role::User, None)).await.unwrap();

    let wrong = uc
        .auth
        .sign_in("alice@example.com", "battery staple")
        .await
        .unwrap_err();
    assert_eq!(wrong.kind(), ErrorKind::InvalidPassword);

    let unknown = uc
        .auth
        .sign_in("nobody@example.com", "correct horse")
        .await
        .unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::NotFound);

    let (user, session) = uc
        .auth
        .sign_in("alice@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(session.user_id, user.id);
}

#[tokio::test]
async fn test_token_resolves_until_logout() {
    let (_repo, uc) = setup();
    let (user, session) = uc.auth.sign_up(sign_up("Alice", Role::User, None)).await.unwrap();

    let resolved = uc.auth.auth(&session.token).await.unwrap();
    assert_eq!(resolved.id, user.id);
    assert!(resolved.password.is_empty());

    uc.auth.logout(&session.token).await.unwrap();

    assert_eq!(uc.auth.auth(&session.token).await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(uc.auth.logout(&session.token).await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_expired_session_is_dropped_on_read() {
    use timetracker_shared::models::session::Session;
    use timetracker_shared::repository::SessionRepository;

    let (repo, uc) = setup();
    let user = seed_user(&repo, "Alice", Role::User).await;

    let expired = Session::new(user.id, Duration::seconds(-1));
    repo.create_session(&expired).await.unwrap();
    assert!(repo.has_session(&expired.token));

    let err = uc.auth.auth(&expired.token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!repo.has_session(&expired.token));

    let live = Session::new(user.id, Duration::hours(1));
    repo.create_session(&live).await.unwrap();
    assert_eq!(uc.auth.auth(&live.token).await.unwrap().id, user.id);
}

// ---------------------------------------------------------------------------
// Users, projects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_profile_update_rehashes_password() {
    let (_repo, uc) = setup();
    let (user, _) = uc.auth.sign_up(sign_up("Alice", Role::User, None)).await.unwrap();

    let updated = uc
        .users
        .update_user(
            user.id,
            ProfileUpdate {
                name: Some("Alicia".to_string()),
                password: Some("new secret".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Alicia");
    assert!(updated.password.is_empty());

    uc.auth.sign_in("alice@example.com", "new secret").await.unwrap();
    let old = uc
        .auth
        .sign_in("alice@example.com", "correct horse")
        .await
        .unwrap_err();
    assert_eq!(old.kind(), ErrorKind::InvalidPassword);

    let empty = uc
        .users
        .update_user(user.id, ProfileUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_project_listing_is_cached_and_evicted_on_write() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let key = owner.id.to_string();

    uc.projects
        .create_project(
            &owner,
            ProjectInput {
                name: "first".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(repo.cached(&key).is_none());

    let listed = uc.projects.get_user_projects_with_cache(owner.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(repo.cached(&key).is_some());

    let second = uc
        .projects
        .create_project(&owner, ProjectInput::default())
        .await
        .unwrap();
    assert!(repo.cached(&key).is_none());

    assert_eq!(uc.projects.get_user_projects_with_cache(owner.id).await.unwrap().len(), 2);

    uc.projects.delete_project(&owner, second.id).await.unwrap();
    assert!(repo.cached(&key).is_none());
}

#[tokio::test]
async fn test_tag_owner_rule() {
    let (repo, uc) = setup();
    let owner = Principal::from(&seed_user(&repo, "Alice", Role::User).await);
    let stranger = Principal::from(&seed_user(&repo, "Mallory", Role::User).await);
    let admin = Principal::from(&seed_user(&repo, "Root", Role::Admin).await);

    let tag = uc.tags.create_tag(&owner, TagInput::default()).await.unwrap();
    assert_eq!(tag.user_id, owner.id);

    let err = uc.tags.delete_tag(&stranger, tag.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    uc.tags.get_tag(&admin, tag.id).await.unwrap();
    uc.tags.delete_tag(&owner, tag.id).await.unwrap();
    assert!(uc.tags.get_user_tags(owner.id).await.unwrap().is_empty());
}
