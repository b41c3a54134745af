// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for registration, login and sessions.

use crate::handlers::{ensure_admin_account, login, logout, register, whoami};
use crate::request_response::LoginRequest;
use crate::tests::helpers::{TEST_PASSWORD, create_admin, create_client, register_request, setup};
use crate::{ApiError, AuthenticationService, Role};

fn login_request(login_name: &str, password: &str) -> LoginRequest {
    LoginRequest {
        login_name: String::from(login_name),
        password: String::from(password),
    }
}

#[test]
fn test_register_client_and_provider() {
    let mut persistence = setup();

    let client = register(&mut persistence, &register_request("Alice", "client")).unwrap();
    let provider = register(&mut persistence, &register_request("bob", "provider")).unwrap();

    assert_eq!(client.login_name, "alice");
    assert_eq!(client.role, "client");
    assert_eq!(provider.role, "provider");
    assert_ne!(client.account_id, provider.account_id);
}

#[test]
fn test_register_admin_is_rejected() {
    let mut persistence = setup();

    let result = register(&mut persistence, &register_request("mallory", "admin"));

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "role"
    ));
}

#[test]
fn test_register_duplicate_login_conflicts() {
    let mut persistence = setup();
    register(&mut persistence, &register_request("alice", "client")).unwrap();

    let result = register(&mut persistence, &register_request("ALICE", "provider"));

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_register_enforces_password_policy() {
    let mut persistence = setup();
    let mut request = register_request("alice", "client");
    request.password = String::from("short1");

    let result = register(&mut persistence, &request);

    assert!(matches!(
        result,
        Err(ApiError::PasswordPolicyViolation { .. })
    ));
}

#[test]
fn test_register_rejects_blank_login() {
    let mut persistence = setup();

    let result = register(&mut persistence, &register_request("   ", "client"));

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "login_name"
    ));
}

#[test]
fn test_login_returns_session_usable_for_whoami() {
    let mut persistence = setup();
    let client = create_client(&mut persistence, "alice");

    let response = login(&mut persistence, &login_request("Alice", TEST_PASSWORD)).unwrap();
    assert_eq!(response.account_id, client.account_id);
    assert_eq!(response.role, "client");
    assert_eq!(response.session_token.len(), 64);

    let user =
        AuthenticationService::validate_session(&mut persistence, &response.session_token)
            .unwrap();
    let me = whoami(&user);
    assert_eq!(me.account_id, client.account_id);
    assert_eq!(me.login_name, "alice");
}

#[test]
fn test_login_failures_share_one_message() {
    let mut persistence = setup();
    create_client(&mut persistence, "alice");

    let wrong_password = login(&mut persistence, &login_request("alice", "nope-nope-1"));
    let unknown = login(&mut persistence, &login_request("nobody", TEST_PASSWORD));

    let Err(ApiError::AuthenticationFailed { reason: first }) = wrong_password else {
        panic!("expected authentication failure");
    };
    let Err(ApiError::AuthenticationFailed { reason: second }) = unknown else {
        panic!("expected authentication failure");
    };
    assert_eq!(first, second);
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence = setup();
    create_client(&mut persistence, "alice");
    let response = login(&mut persistence, &login_request("alice", TEST_PASSWORD)).unwrap();

    logout(&mut persistence, &response.session_token).unwrap();

    let result =
        AuthenticationService::validate_session(&mut persistence, &response.session_token);
    assert!(result.is_err());
}

#[test]
fn test_unknown_session_token_is_rejected() {
    let mut persistence = setup();

    let result = AuthenticationService::validate_session(&mut persistence, "not-a-token");

    assert!(result.is_err());
}

#[test]
fn test_expired_session_is_rejected_and_removed() {
    let mut persistence = setup();
    let client = create_client(&mut persistence, "alice");
    persistence
        .create_session(
            "stale-token",
            client.account_id,
            "2025-01-01T00:00:00Z",
            "2025-01-31T00:00:00Z",
        )
        .unwrap();

    let result = AuthenticationService::validate_session(&mut persistence, "stale-token");

    assert!(result.is_err());
    assert!(
        persistence
            .get_session_by_token("stale-token")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_purge_expired_sessions_keeps_live_ones() {
    let mut persistence = setup();
    let client = create_client(&mut persistence, "alice");
    persistence
        .create_session(
            "stale-token",
            client.account_id,
            "2025-01-01T00:00:00Z",
            "2025-01-31T00:00:00Z",
        )
        .unwrap();
    let live = login(&mut persistence, &login_request("alice", TEST_PASSWORD)).unwrap();

    let removed = AuthenticationService::purge_expired_sessions(&mut persistence).unwrap();

    assert_eq!(removed, 1);
    assert!(
        AuthenticationService::validate_session(&mut persistence, &live.session_token).is_ok()
    );
}

#[test]
fn test_ensure_admin_account_runs_once() {
    let mut persistence = setup();
    let admin = create_admin(&mut persistence);
    assert_eq!(admin.role, Role::Admin);

    let second = ensure_admin_account(&mut persistence, "other-admin", "Admin-2026").unwrap();

    assert_eq!(second, None);
    assert_eq!(persistence.count_accounts_with_role("admin").unwrap(), 1);
}

#[test]
fn test_ensure_admin_account_enforces_password_policy() {
    let mut persistence = setup();

    let result = ensure_admin_account(&mut persistence, "admin", "admin");

    assert!(matches!(
        result,
        Err(ApiError::PasswordPolicyViolation { .. })
    ));
}
