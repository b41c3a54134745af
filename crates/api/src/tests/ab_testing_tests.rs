// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the A/B testing handlers.

use presta_persistence::Persistence;

use crate::handlers::{
    create_test, end_test, get_test_results, get_variant, list_tests, track_conversion,
};
use crate::request_response::{CreateTestRequest, TestResponse, TrackConversionRequest};
use crate::tests::helpers::{create_admin, create_client, setup};
use crate::{ApiError, AuthenticatedUser};

fn checkout_request() -> CreateTestRequest {
    CreateTestRequest {
        name: String::from("Checkout button"),
        key: String::from("checkout_button"),
        description: Some(String::from("Button colour on the checkout page")),
        variants: vec![String::from("red"), String::from("blue")],
    }
}

fn conversion(session_id: Option<&str>, conversion_type: &str) -> TrackConversionRequest {
    TrackConversionRequest {
        session_id: session_id.map(String::from),
        conversion_type: String::from(conversion_type),
        conversion_data: None,
    }
}

fn create_checkout_test(persistence: &mut Persistence) -> (AuthenticatedUser, TestResponse) {
    let admin = create_admin(persistence);
    let test = create_test(persistence, &admin, checkout_request()).unwrap();
    (admin, test)
}

#[test]
fn test_create_test_returns_running_test() {
    let mut persistence = setup();

    let (_, test) = create_checkout_test(&mut persistence);

    assert_eq!(test.key, "checkout_button");
    assert_eq!(test.status, "running");
    assert_eq!(test.variants, vec!["red", "blue"]);
    assert!(test.ended_at.is_none());
}

#[test]
fn test_create_test_requires_admin() {
    let mut persistence = setup();
    let client = create_client(&mut persistence, "alice");

    let result = create_test(&mut persistence, &client, checkout_request());

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_create_test_duplicate_key_conflicts() {
    let mut persistence = setup();
    let (admin, _) = create_checkout_test(&mut persistence);

    let result = create_test(&mut persistence, &admin, checkout_request());

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_create_test_validates_variants() {
    let mut persistence = setup();
    let admin = create_admin(&mut persistence);
    let mut request = checkout_request();
    request.variants = vec![String::from("only")];

    let result = create_test(&mut persistence, &admin, request);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "variants"
    ));
}

#[test]
fn test_variant_is_deterministic_for_session() {
    let mut persistence = setup();
    create_checkout_test(&mut persistence);

    let first = get_variant(&mut persistence, "checkout_button", None, Some("sess-1")).unwrap();
    let second = get_variant(&mut persistence, "checkout_button", None, Some("sess-1")).unwrap();

    assert_eq!(first.variant, "blue");
    assert_eq!(first, second);
}

#[test]
fn test_variant_without_subject_is_rejected() {
    let mut persistence = setup();
    create_checkout_test(&mut persistence);

    let result = get_variant(&mut persistence, "checkout_button", None, None);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "session_id"
    ));
}

#[test]
fn test_variant_for_unknown_test_is_rule_violation() {
    let mut persistence = setup();

    let result = get_variant(&mut persistence, "missing", None, Some("sess-1"));

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "test_running"
    ));
}

#[test]
fn test_conversion_requires_assignment() {
    let mut persistence = setup();
    create_checkout_test(&mut persistence);

    let result = track_conversion(
        &mut persistence,
        "checkout_button",
        None,
        &conversion(Some("sess-9"), "purchase"),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "assignment_required"
    ));
}

#[test]
fn test_results_count_assignments_and_conversions() {
    let mut persistence = setup();
    let (admin, test) = create_checkout_test(&mut persistence);
    let client = create_client(&mut persistence, "alice");

    get_variant(&mut persistence, "checkout_button", None, Some("sess-1")).unwrap();
    let user_variant =
        get_variant(&mut persistence, "checkout_button", Some(&client), None).unwrap();

    let mut request = conversion(Some("sess-1"), "purchase");
    request.conversion_data = Some(serde_json::json!({ "amount_cents": 4500 }));
    track_conversion(&mut persistence, "checkout_button", None, &request).unwrap();
    track_conversion(
        &mut persistence,
        "checkout_button",
        None,
        &conversion(Some("sess-1"), "click"),
    )
    .unwrap();

    let results = get_test_results(&mut persistence, &admin, test.id).unwrap();
    let total_assignments: i64 = results.variants.iter().map(|v| v.assignments).sum();
    assert_eq!(total_assignments, 2);

    let blue = results
        .variants
        .iter()
        .find(|v| v.variant == "blue")
        .unwrap();
    assert_eq!(blue.total_conversions, 2);
    assert_eq!(blue.conversions.get("purchase"), Some(&1));
    assert_eq!(blue.conversions.get("click"), Some(&1));
    assert!(blue.assignments >= 1);
    assert!(results.variants.iter().any(|v| v.variant == user_variant.variant));
}

#[test]
fn test_list_tests_requires_admin() {
    let mut persistence = setup();
    let (admin, _) = create_checkout_test(&mut persistence);
    let client = create_client(&mut persistence, "alice");

    assert!(matches!(
        list_tests(&mut persistence, &client),
        Err(ApiError::Unauthorized { .. })
    ));

    let tests = list_tests(&mut persistence, &admin).unwrap();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].variant_count, 2);
}

#[test]
fn test_end_test_stops_assignment_and_is_idempotent() {
    let mut persistence = setup();
    let (admin, test) = create_checkout_test(&mut persistence);

    let ended = end_test(&mut persistence, &admin, test.id).unwrap();
    assert_eq!(ended.status, "ended");
    assert!(ended.ended_at.is_some());

    let again = end_test(&mut persistence, &admin, test.id).unwrap();
    assert_eq!(again.ended_at, ended.ended_at);

    let result = get_variant(&mut persistence, "checkout_button", None, Some("sess-1"));
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_results_for_unknown_test_not_found() {
    let mut persistence = setup();
    let admin = create_admin(&mut persistence);

    let result = get_test_results(&mut persistence, &admin, 404);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
