use std::sync::Arc;

use roster::credentials::CredentialVerifier;
use roster::models::UserRecord;
use roster::policy::{PasswordPolicy, PolicyViolation};
use roster::store::{json::JsonFileStore, memory::MemoryStore, UserStore};
use roster::{AccountError, AccountService};

/// Fresh service over a JSON document inside its own temp dir.
fn file_service() -> (AccountService, Arc<JsonFileStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("users.json")));
    (AccountService::new(store.clone()), store, dir)
}

#[test]
fn alice_scenario() {
    let (svc, store, _dir) = file_service();

    let ok = svc.register("alice", "Secret1!").unwrap();
    assert_eq!(ok.message, "user registered successfully");
    assert_eq!(store.load_all().unwrap(), vec![UserRecord::new("alice", "Secret1!")]);

    let user = svc.authenticate("alice", "Secret1!").unwrap();
    assert_eq!(user, Some(UserRecord::new("alice", "Secret1!")));

    let err = svc.register("alice", "Other2@").unwrap_err();
    assert!(matches!(err, AccountError::Conflict { ref username } if username == "alice"));
    assert!(err.user_exists());
    assert!(err.to_string().contains("already exists"));
    // store untouched by the rejected registration
    assert_eq!(store.load_all().unwrap().len(), 1);

    assert_eq!(svc.authenticate("alice", "wrong").unwrap(), None);
}

#[test]
fn missing_fields_are_validation_errors() {
    let svc = AccountService::new(Arc::new(MemoryStore::new()));
    for (u, p) in [("", "x"), ("x", ""), ("", "")] {
        let err = svc.register(u, p).unwrap_err();
        assert!(matches!(err, AccountError::MissingFields), "({u:?}, {p:?})");
        assert!(!err.user_exists());
        assert_eq!(err.to_string(), "username and password are required");
    }
    assert_eq!(svc.user_count().unwrap(), 0);
}

#[test]
fn failed_logins_look_the_same() {
    let svc = AccountService::new(Arc::new(MemoryStore::new()));
    svc.register("bob", "hunter2").unwrap();
    let wrong_password = svc.authenticate("bob", "hunter3").unwrap();
    let unknown_user = svc.authenticate("nobody", "hunter2").unwrap();
    assert_eq!(wrong_password, None);
    assert_eq!(unknown_user, None);
}

#[test]
fn usernames_are_case_sensitive() {
    let svc = AccountService::new(Arc::new(MemoryStore::new()));
    svc.register("Carol", "pw").unwrap();
    svc.register("carol", "pw").unwrap();
    assert_eq!(svc.user_count().unwrap(), 2);
    assert_eq!(svc.authenticate("CAROL", "pw").unwrap(), None);
}

#[test]
fn registrations_append_in_order() {
    let (svc, store, _dir) = file_service();
    for name in ["u1", "u2", "u3"] {
        svc.register(name, "pw").unwrap();
    }
    let names: Vec<_> = store.load_all().unwrap().into_iter().map(|u| u.username).collect();
    assert_eq!(names, ["u1", "u2", "u3"]);
}

#[test]
fn first_matching_record_wins() {
    // a document edited by hand may already contain duplicates
    let store = MemoryStore::with_records(vec![
        UserRecord::new("dup", "first"),
        UserRecord::new("dup", "second"),
    ]);
    let svc = AccountService::new(Arc::new(store));
    assert_eq!(svc.authenticate("dup", "second").unwrap(), Some(UserRecord::new("dup", "second")));
    assert!(svc.register("dup", "third").unwrap_err().user_exists());
}

#[test]
fn malformed_document_surfaces_as_storage_error() {
    let (svc, store, _dir) = file_service();
    std::fs::write(store.path(), "not json").unwrap();
    assert!(matches!(svc.authenticate("a", "b").unwrap_err(), AccountError::Storage(_)));
    assert!(matches!(svc.register("a", "b").unwrap_err(), AccountError::Storage(_)));
}

#[test]
fn password_policy_is_opt_in() {
    let lax = AccountService::new(Arc::new(MemoryStore::new()));
    lax.register("dave", "short").unwrap();

    let strict = AccountService::new(Arc::new(MemoryStore::new()))
        .with_password_policy(PasswordPolicy::default());
    let err = strict.register("dave", "short").unwrap_err();
    assert!(matches!(err, AccountError::WeakPassword(PolicyViolation::TooShort(8))));
    assert!(!err.user_exists());
    strict.register("dave", "Secret1!").unwrap();
}

struct Reversed;

impl CredentialVerifier for Reversed {
    fn seal(&self, password: &str) -> String {
        password.chars().rev().collect()
    }

    fn verify(&self, stored: &str, supplied: &str) -> bool {
        stored == self.seal(supplied)
    }
}

#[test]
fn verifier_controls_what_is_stored() {
    let store = Arc::new(MemoryStore::new());
    let svc = AccountService::new(store.clone()).with_verifier(Arc::new(Reversed));
    svc.register("erin", "abc123").unwrap();
    assert_eq!(store.load_all().unwrap(), vec![UserRecord::new("erin", "321cba")]);
    assert!(svc.authenticate("erin", "abc123").unwrap().is_some());
    assert!(svc.authenticate("erin", "321cba").unwrap().is_none());
}

#[test]
fn serialized_writes_keep_every_user() {
    let (svc, store, _dir) = file_service();
    let svc = svc.serialized();
    assert!(svc.is_serialized());

    std::thread::scope(|s| {
        for i in 0..16 {
            let svc = &svc;
            s.spawn(move || svc.register(&format!("user{i}"), "pw").unwrap());
        }
    });

    let users = store.load_all().unwrap();
    assert_eq!(users.len(), 16);
    for i in 0..16 {
        assert!(users.iter().any(|u| u.username == format!("user{i}")));
    }
}

#[test]
fn serialized_writes_admit_one_of_many_duplicates() {
    let (svc, store, _dir) = file_service();
    let svc = svc.serialized();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = &svc;
                s.spawn(move || svc.register("frank", &format!("pw{i}")))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(AccountError::user_exists));
    assert_eq!(store.load_all().unwrap().len(), 1);
}

#[test]
fn logins_succeed_while_registrations_rewrite_the_document() {
    let (svc, store, _dir) = file_service();
    let seed: Vec<_> = (0..300).map(|i| UserRecord::new(format!("seed{i}"), "pw")).collect();
    store.save_all(&seed).unwrap();
    let svc = svc.serialized();
    let done = std::sync::atomic::AtomicBool::new(false);

    let logins: Vec<usize> = std::thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let (svc, done) = (&svc, &done);
                s.spawn(move || {
                    let mut ok = 0;
                    loop {
                        let user = svc.authenticate("seed150", "pw").unwrap();
                        assert_eq!(user, Some(UserRecord::new("seed150", "pw")));
                        ok += 1;
                        if done.load(std::sync::atomic::Ordering::Relaxed) {
                            break ok;
                        }
                    }
                })
            })
            .collect();
        for i in 0..100 {
            svc.register(&format!("late{i}"), "pw").unwrap();
        }
        done.store(true, std::sync::atomic::Ordering::Relaxed);
        readers.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(logins.iter().all(|&n| n > 0));
    assert_eq!(svc.user_count().unwrap(), 400);
}
