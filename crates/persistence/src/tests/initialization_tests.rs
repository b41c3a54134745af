// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.

use super::create_user;
use crate::{Persistence, PersistenceError};
use presta::GamificationStore;

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    persistence.verify_foreign_key_enforcement().unwrap();

    // No account 999 exists.
    let result = persistence.set_credit_balance(999, 10, super::CREATED_AT);
    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = Persistence::new_in_memory().unwrap();
    let mut db2 = Persistence::new_in_memory().unwrap();

    create_user(&mut db1, "alice");

    assert_eq!(db1.count_accounts_with_role("client").unwrap(), 1);
    assert_eq!(db2.count_accounts_with_role("client").unwrap(), 0);
}

#[test]
fn test_reference_data_is_seeded() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let achievements = persistence.list_achievements().unwrap();
    let codes: Vec<&str> = achievements.iter().map(|a| a.code.as_str()).collect();

    assert_eq!(
        codes,
        vec![
            "first_job",
            "first_three_jobs",
            "ten_jobs",
            "first_review",
            "well_rated",
            "level_five"
        ]
    );
    assert!(!persistence.list_categories(false).unwrap().is_empty());
}

#[test]
fn test_file_database_persists_across_reopen() {
    let path = std::env::temp_dir().join(format!(
        "presta-persistence-test-{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        create_user(&mut persistence, "alice");
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    assert!(reopened.get_account_by_login("alice").unwrap().is_some());

    drop(reopened);
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}
